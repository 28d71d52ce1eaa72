use serde::{Deserialize, Serialize};

// Data model representing a registered user
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
}

// Data model representing a task owned by a user
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub category: String,
    pub contact: String,
    pub status: String,
    pub due: Option<String>,
    pub user_id: i64,
}

/// The requester, as resolved from the identity cookie.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Identity {
    #[default]
    Anonymous,
    User(User),
}

impl Identity {
    /// Returns the owning user id, if any.
    pub fn user_id(&self) -> Option<i64> {
        match self {
            Identity::Anonymous => None,
            Identity::User(user) => Some(user.id),
        }
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            Identity::Anonymous => None,
            Identity::User(user) => Some(user),
        }
    }
}
