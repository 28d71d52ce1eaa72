use std::str::FromStr;

use serde::{Deserialize, Deserializer};

use crate::error::{AppError, AppResult};

// Form body for creating or updating a task
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TaskForm {
    pub title: String,
    pub description: String,
    pub category: String,
    pub contact: String,
    pub status: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub due: Option<String>,
}

// Form body for registration and login
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct UserForm {
    pub username: String,
}

/// Columns the task listing may be ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    Id,
    Title,
    Description,
    Category,
    Contact,
    Status,
    #[default]
    Due,
}

impl SortKey {
    /// Column name for ORDER BY. Only ever one of these literals reaches SQL.
    pub fn column(self) -> &'static str {
        match self {
            SortKey::Id => "id",
            SortKey::Title => "title",
            SortKey::Description => "description",
            SortKey::Category => "category",
            SortKey::Contact => "contact",
            SortKey::Status => "status",
            SortKey::Due => "due",
        }
    }
}

impl FromStr for SortKey {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "id" => Ok(SortKey::Id),
            "title" => Ok(SortKey::Title),
            "description" => Ok(SortKey::Description),
            "category" => Ok(SortKey::Category),
            "contact" => Ok(SortKey::Contact),
            "status" => Ok(SortKey::Status),
            "due" => Ok(SortKey::Due),
            _ => Err(AppError::Validation(format!("unknown sort column `{raw}`"))),
        }
    }
}

// Query string for the task listing
#[derive(Debug, Default, serde::Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub sort: Option<String>,
}

impl ListQuery {
    /// Resolves the requested sort key, rejecting anything outside [`SortKey`].
    pub fn sort_key(&self) -> AppResult<SortKey> {
        match self.sort.as_deref() {
            None | Some("") => Ok(SortKey::default()),
            Some(raw) => raw.parse(),
        }
    }
}

// `_method` carried by HTML forms that cannot send PUT/DELETE
#[derive(Debug, Default, serde::Deserialize)]
pub struct MethodOverride {
    #[serde(rename = "_method")]
    pub method: Option<String>,
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|v| !v.trim().is_empty()))
}
