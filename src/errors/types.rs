//! Transport-agnostic error taxonomy built on `thiserror`.
//!
//! Variants model the failures this backend actually produces; the HTTP
//! status and body for each live in `api::error`, not here.

/// Convenience alias used by storage and the services.
pub type Result<T> = std::result::Result<T, InnkeepError>;

#[derive(thiserror::Error, Debug)]
pub enum InnkeepError {
    /// Bad or incomplete runtime configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A query or connection failed; `context` names the operation.
    #[error("Database error: {context}")]
    Database {
        #[source]
        source: sqlx::Error,
        context: String,
    },

    /// Input rejected before it reached storage.
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Faults that must never surface to a client verbatim.
    #[error("Internal error: {0}")]
    Internal(String),

    /// A lookup by id came up empty.
    #[error("{resource_type} not found: {id}")]
    NotFound { resource_type: String, id: String },
}

impl InnkeepError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn database(source: sqlx::Error, context: impl Into<String>) -> Self {
        Self::Database { source, context: context.into() }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation { message: message.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn not_found(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound { resource_type: resource_type.into(), id: id.into() }
    }
}

impl From<validator::ValidationErrors> for InnkeepError {
    fn from(errors: validator::ValidationErrors) -> Self {
        // Sorted so the combined message is stable across runs.
        let mut parts: Vec<String> = errors
            .field_errors()
            .into_iter()
            .map(|(field, issues)| {
                let detail = issues
                    .iter()
                    .map(|issue| match &issue.message {
                        Some(message) => message.to_string(),
                        None => issue.code.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{}: {}", field, detail)
            })
            .collect();
        parts.sort();

        Self::validation(parts.join("; "))
    }
}
