use crate::types::RecordId;

/// Domain errors raised by the form, catalog and directory logic.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: RecordId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid course catalog: {0}")]
    InvalidCatalog(String),

    #[error("Export failed: {0}")]
    Export(String),
}

impl CoreError {
    /// The message shown to the admin, without the error-kind prefix.
    pub fn user_message(&self) -> String {
        match self {
            CoreError::Validation(msg)
            | CoreError::Conflict(msg)
            | CoreError::InvalidCatalog(msg)
            | CoreError::Export(msg) => msg.clone(),
            CoreError::NotFound { entity, id } => format!("{entity} {id} not found"),
        }
    }
}
