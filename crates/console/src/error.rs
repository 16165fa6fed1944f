use cadmin_client::error::BackendError;
use cadmin_client::session::SessionError;
use cadmin_core::error::CoreError;

/// Errors surfaced by console commands.
#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    /// Form, catalog or directory rule violated.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Backend call failed outside a workflow that words its own message.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// A workflow action failed; `message` is what the admin sees.
    #[error("{message}")]
    Action {
        message: String,
        #[source]
        source: Option<BackendError>,
    },

    #[error(transparent)]
    Session(#[from] SessionError),

    /// A command other than login/logout/catalog ran without a session.
    #[error("Not logged in. Run `cadmin login` first.")]
    NotLoggedIn,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConsoleError {
    pub(crate) fn action(message: &str, source: BackendError) -> Self {
        ConsoleError::Action {
            message: message.to_string(),
            source: Some(source),
        }
    }

    /// The message printed for the admin.
    pub fn user_message(&self) -> String {
        match self {
            ConsoleError::Core(e) => e.user_message(),
            ConsoleError::Backend(e) => e
                .backend_message()
                .map(str::to_string)
                .unwrap_or_else(|| e.to_string()),
            ConsoleError::Action { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// The backend error behind this failure, if any.
    pub fn backend_error(&self) -> Option<&BackendError> {
        match self {
            ConsoleError::Backend(e) => Some(e),
            ConsoleError::Action { source, .. } => source.as_ref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_drops_prefix() {
        let err = ConsoleError::from(CoreError::Validation("Please fill all fields!".into()));
        assert_eq!(err.user_message(), "Please fill all fields!");
    }

    #[test]
    fn action_message_is_shown_verbatim() {
        let err = ConsoleError::action("Failed to add student. Try again!", BackendError::NotFound);
        assert_eq!(err.user_message(), "Failed to add student. Try again!");
        assert!(err.backend_error().is_some_and(BackendError::is_not_found));
    }

    #[test]
    fn backend_error_prefers_payload_message() {
        let err = ConsoleError::from(BackendError::Validation("Roll No taken".into()));
        assert_eq!(err.user_message(), "Roll No taken");
    }
}
