use thiserror::Error;

/// Unified error type for the Oreo authorization library.
#[derive(Error, Debug)]
pub enum OreoError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Can't support method: {0}")]
    UnsupportedMethod(String),

    #[error("Url: {uri} conflict with exist url: {existing}")]
    RouteConflict { uri: String, existing: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Sign key length limit {0}")]
    SignKeyLimit(usize),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Internal: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, OreoError>;

impl OreoError {
    /// Map to HTTP status code.
    pub fn status_code(&self) -> u16 {
        match self {
            OreoError::Validation(_) => 400,
            OreoError::UnsupportedMethod(_) => 400,
            OreoError::SignKeyLimit(_) => 400,
            OreoError::RouteConflict { .. } => 409,
            OreoError::AlreadyExists(_) => 409,
            OreoError::NotFound(_) => 404,
            _ => 500,
        }
    }

    /// JSON error body.
    pub fn to_json_body(&self) -> Vec<u8> {
        let status = self.status_code();
        let body = serde_json::json!({"error": self.to_string(), "status": status});
        body.to_string().into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(OreoError::Validation("x".into()).status_code(), 400);
        assert_eq!(OreoError::UnsupportedMethod("PATCH".into()).status_code(), 400);
        assert_eq!(OreoError::SignKeyLimit(50).status_code(), 400);
        assert_eq!(
            OreoError::RouteConflict {
                uri: "/a".into(),
                existing: "/:b".into()
            }
            .status_code(),
            409
        );
        assert_eq!(OreoError::AlreadyExists("x".into()).status_code(), 409);
        assert_eq!(OreoError::NotFound("role r1".into()).status_code(), 404);
        assert_eq!(OreoError::Store("down".into()).status_code(), 500);
        assert_eq!(OreoError::Internal("bug".into()).status_code(), 500);
    }

    #[test]
    fn test_conflict_message_names_existing_uri() {
        let err = OreoError::RouteConflict {
            uri: "/users/1".into(),
            existing: "/users/:id".into(),
        };
        assert!(err.to_string().contains("/users/:id"));
        assert!(err.to_string().contains("/users/1"));
    }

    #[test]
    fn test_json_body_is_valid_json() {
        let err = OreoError::NotFound("user u1".into());
        let parsed: serde_json::Value =
            serde_json::from_slice(&err.to_json_body()).expect("to_json_body must produce valid JSON");
        assert_eq!(parsed["status"], 404);
        assert!(parsed["error"].as_str().unwrap().contains("u1"));
    }
}
