//! JSON "views" standing in for rendered pages.
//!
//! Every view carries its name and the resolved identity so a client-side
//! template can branch on login state.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::model::Identity;

/// Status and message of an error view, kept on the response so the identity
/// layer can render it again for the resolved requester.
#[derive(Debug, Clone)]
pub struct ErrorView {
    pub status: StatusCode,
    pub message: String,
}

#[derive(Debug)]
pub struct View {
    status: StatusCode,
    body: Map<String, Value>,
}

impl View {
    pub fn new(name: &str, identity: &Identity) -> Self {
        let mut body = Map::new();
        body.insert("view".to_string(), json!(name));
        body.insert("identity".to_string(), json!(identity.user()));
        Self {
            status: StatusCode::OK,
            body,
        }
    }

    pub fn error(status: StatusCode, message: String) -> Self {
        let mut body = Map::new();
        body.insert("view".to_string(), json!("error"));
        body.insert("identity".to_string(), Value::Null);
        body.insert("status".to_string(), json!(status.as_u16()));
        body.insert("message".to_string(), json!(message));
        Self { status, body }
    }

    pub fn with_identity(mut self, identity: &Identity) -> Self {
        self.body
            .insert("identity".to_string(), json!(identity.user()));
        self
    }

    /// Adds a field to the view context.
    pub fn with(mut self, key: &str, value: impl Serialize) -> Self {
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.body.insert(key.to_string(), value);
        self
    }
}

impl IntoResponse for View {
    fn into_response(self) -> Response {
        (self.status, Json(Value::Object(self.body))).into_response()
    }
}
