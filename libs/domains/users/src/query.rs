//! Query construction for user search.
//!
//! A [`UserFilter`] is turned into a [`UserQuery`]: a disjunctive predicate
//! over the populated filter lists plus an optional offset/limit window.
//! Both repositories evaluate the same `UserQuery`, so `count` and `data`
//! of a search always come from one predicate.

use crate::models::{User, UserFilter};

/// One "field is a member of the set" clause
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserClause {
    Ids(Vec<i32>),
    Emails(Vec<String>),
    FirstNames(Vec<String>),
    LastNames(Vec<String>),
}

impl UserClause {
    pub fn matches(&self, user: &User) -> bool {
        match self {
            UserClause::Ids(ids) => ids.contains(&user.id),
            UserClause::Emails(emails) => emails.contains(&user.email),
            UserClause::FirstNames(names) => names.contains(&user.first_name),
            UserClause::LastNames(names) => names.contains(&user.last_name),
        }
    }
}

/// OR of clauses. No clauses means "match every user", never "match none".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPredicate {
    clauses: Vec<UserClause>,
}

impl UserPredicate {
    pub fn match_all() -> Self {
        Self::default()
    }

    /// Builds the disjunction from the non-empty lists of `filter`
    pub fn from_filter(filter: &UserFilter) -> Self {
        let mut clauses = Vec::new();

        if !filter.ids.is_empty() {
            clauses.push(UserClause::Ids(filter.ids.clone()));
        }
        if !filter.emails.is_empty() {
            clauses.push(UserClause::Emails(filter.emails.clone()));
        }
        if !filter.first_names.is_empty() {
            clauses.push(UserClause::FirstNames(filter.first_names.clone()));
        }
        if !filter.last_names.is_empty() {
            clauses.push(UserClause::LastNames(filter.last_names.clone()));
        }

        Self { clauses }
    }

    pub fn clauses(&self) -> &[UserClause] {
        &self.clauses
    }

    pub fn is_match_all(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn matches(&self, user: &User) -> bool {
        self.is_match_all() || self.clauses.iter().any(|clause| clause.matches(user))
    }
}

/// Offset/limit window derived from a 1-based page
///
/// Both fields stay within `i64::MAX`, the range Postgres binds as `BIGINT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Pagination {
    /// `offset = (page - 1) * limit`, only when both values are present and positive.
    /// An offset past `i64::MAX` is clamped to it.
    pub fn from_page(page: Option<i64>, limit: Option<i64>) -> Option<Self> {
        match (page, limit) {
            (Some(page), Some(limit)) if page > 0 && limit > 0 => {
                let offset = (page - 1).checked_mul(limit).unwrap_or(i64::MAX);
                Some(Self {
                    offset: offset.unsigned_abs(),
                    limit: limit.unsigned_abs(),
                })
            }
            _ => None,
        }
    }
}

/// Predicate plus optional window, evaluated by a repository
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserQuery {
    pub predicate: UserPredicate,
    pub pagination: Option<Pagination>,
}

impl From<&UserFilter> for UserQuery {
    fn from(filter: &UserFilter) -> Self {
        Self {
            predicate: UserPredicate::from_filter(filter),
            pagination: Pagination::from_page(filter.page, filter.limit),
        }
    }
}

impl From<UserFilter> for UserQuery {
    fn from(filter: UserFilter) -> Self {
        Self::from(&filter)
    }
}
