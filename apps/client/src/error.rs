use thiserror::Error;

use crate::domain::GameId;

/// Errors surfaced by the game client and the action loop.
///
/// `Transport`, `Protocol` and `Decode` cover the three ways a single round
/// trip can fail. None of them are retried; they propagate to the caller.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Transport error during {operation}: {detail}")]
    Transport {
        operation: &'static str,
        detail: String,
        timed_out: bool,
    },
    #[error("Protocol error during {operation}: status {status}{}", format_server_detail(.detail))]
    Protocol {
        operation: &'static str,
        status: u16,
        detail: Option<String>,
    },
    #[error("Decode error during {operation}: {detail}")]
    Decode {
        operation: &'static str,
        detail: String,
    },
    #[error("Configuration error: {detail}")]
    Config { detail: String },
    #[error("Strategy error for game {game_id}: {detail}")]
    Strategy { game_id: GameId, detail: String },
    #[error("Interaction error: {detail}")]
    Interaction { detail: String },
    #[error("Action loop already finished in phase {phase}")]
    Finished { phase: String },
}

fn format_server_detail(detail: &Option<String>) -> String {
    match detail {
        Some(detail) => format!(" ({detail})"),
        None => String::new(),
    }
}

impl ClientError {
    /// Stable error code, used as a structured log field.
    pub fn code(&self) -> &'static str {
        match self {
            ClientError::Transport {
                timed_out: true, ..
            } => "TRANSPORT_TIMEOUT",
            ClientError::Transport { .. } => "TRANSPORT",
            ClientError::Protocol { .. } => "PROTOCOL",
            ClientError::Decode { .. } => "DECODE",
            ClientError::Config { .. } => "CONFIG",
            ClientError::Strategy { .. } => "STRATEGY",
            ClientError::Interaction { .. } => "INTERACTION",
            ClientError::Finished { .. } => "LOOP_FINISHED",
        }
    }

    /// HTTP status for protocol failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Protocol { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The server refused the request itself (4xx), e.g. an illegal move.
    pub fn is_rejection(&self) -> bool {
        matches!(self.status(), Some(400..=499))
    }

    /// The server failed while handling the request (5xx).
    pub fn is_server_fault(&self) -> bool {
        matches!(self.status(), Some(500..=599))
    }

    pub fn transport(operation: &'static str, err: &reqwest::Error) -> Self {
        Self::Transport {
            operation,
            detail: err.to_string(),
            timed_out: err.is_timeout(),
        }
    }

    pub fn protocol(operation: &'static str, status: u16, detail: Option<String>) -> Self {
        Self::Protocol {
            operation,
            status,
            detail,
        }
    }

    pub fn decode(operation: &'static str, detail: impl Into<String>) -> Self {
        Self::Decode {
            operation,
            detail: detail.into(),
        }
    }

    pub fn config(detail: impl Into<String>) -> Self {
        Self::Config {
            detail: detail.into(),
        }
    }

    pub fn strategy(game_id: GameId, detail: impl Into<String>) -> Self {
        Self::Strategy {
            game_id,
            detail: detail.into(),
        }
    }

    pub fn interaction(detail: impl Into<String>) -> Self {
        Self::Interaction {
            detail: detail.into(),
        }
    }

    pub fn finished(phase: impl Into<String>) -> Self {
        Self::Finished {
            phase: phase.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_errors_are_classified_by_status() {
        let rejected = ClientError::protocol("submit_actions", 400, Some("illegal".into()));
        assert!(rejected.is_rejection());
        assert!(!rejected.is_server_fault());
        assert_eq!(rejected.status(), Some(400));

        let crashed = ClientError::protocol("fetch_state", 500, None);
        assert!(crashed.is_server_fault());
        assert!(!crashed.is_rejection());
        assert_eq!(crashed.code(), "PROTOCOL");
    }

    #[test]
    fn non_protocol_errors_have_no_status() {
        let err = ClientError::decode("fetch_state", "missing field `players`");
        assert_eq!(err.status(), None);
        assert!(!err.is_rejection());
        assert_eq!(err.code(), "DECODE");
    }

    #[test]
    fn finished_loop_has_its_own_code() {
        let err = ClientError::finished("Ended");
        assert_eq!(err.code(), "LOOP_FINISHED");
        assert_eq!(err.status(), None);
        assert_eq!(err.to_string(), "Action loop already finished in phase Ended");
    }

    #[test]
    fn protocol_display_includes_server_detail() {
        let err = ClientError::protocol("submit_actions", 400, Some("no such action".into()));
        assert_eq!(
            err.to_string(),
            "Protocol error during submit_actions: status 400 (no such action)"
        );

        let bare = ClientError::protocol("create_game", 503, None);
        assert_eq!(
            bare.to_string(),
            "Protocol error during create_game: status 503"
        );
    }
}
