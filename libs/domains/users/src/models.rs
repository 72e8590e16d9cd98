use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// User record as stored and returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Store-assigned identifier, always positive
    pub id: i32,
    /// Unique e-mail address
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// DTO for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    #[validate(email)]
    #[schema(example = "jane.doe@example.com")]
    pub email: String,
    #[validate(length(min = 1, max = 100))]
    #[schema(example = "Jane")]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    #[schema(example = "Doe")]
    pub last_name: String,
}

/// DTO for a partial update
///
/// Absent fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub last_name: Option<String>,
}

impl UpdateUser {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.first_name.is_none() && self.last_name.is_none()
    }
}

/// Search filter for `GET /users/by`
///
/// List parameters are comma-separated (`?ids=1,2&lastNames=Doe`). Populated
/// lists are OR-ed together; `page` and `limit` only apply when both are positive.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct UserFilter {
    /// Comma-separated user ids
    #[serde(default, deserialize_with = "comma_separated")]
    #[param(value_type = Option<String>, example = "1,2")]
    pub ids: Vec<i32>,
    /// Comma-separated e-mail addresses
    #[serde(default, deserialize_with = "comma_separated")]
    #[param(value_type = Option<String>)]
    pub emails: Vec<String>,
    /// Comma-separated first names
    #[serde(default, deserialize_with = "comma_separated")]
    #[param(value_type = Option<String>)]
    pub first_names: Vec<String>,
    /// Comma-separated last names
    #[serde(default, deserialize_with = "comma_separated")]
    #[param(value_type = Option<String>)]
    pub last_names: Vec<String>,
    /// 1-based page number
    pub page: Option<i64>,
    /// Page size
    pub limit: Option<i64>,
}

/// Search response: total matches plus the requested page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct QueryResult<T> {
    /// Number of matching records, ignoring pagination
    pub count: u64,
    pub data: Vec<T>,
}

impl<T> QueryResult<T> {
    pub fn empty() -> Self {
        Self {
            count: 0,
            data: Vec::new(),
        }
    }
}

impl User {
    /// Apply updates from UpdateUser DTO
    pub fn apply_update(&mut self, update: UpdateUser) {
        if let Some(email) = update.email {
            self.email = email;
        }
        if let Some(first_name) = update.first_name {
            self.first_name = first_name;
        }
        if let Some(last_name) = update.last_name {
            self.last_name = last_name;
        }
        self.updated_at = Utc::now();
    }
}

fn comma_separated<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = Option::<String>::deserialize(deserializer)?;

    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| item.parse::<T>().map_err(serde::de::Error::custom))
        .collect()
}
