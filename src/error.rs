use std::fmt;

use thiserror::Error;

/// Direction of an activity focus change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusDirection {
    Focus,
    Unfocus,
}

impl FocusDirection {
    pub fn from_focused(focused: bool) -> Self {
        if focused {
            Self::Focus
        } else {
            Self::Unfocus
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Focus => "focus",
            Self::Unfocus => "unfocus",
        }
    }
}

impl fmt::Display for FocusDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejection reported by the service bus for an outbound call or cancel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    #[error("call to {uri} rejected: {reason}")]
    CallRejected { uri: String, reason: String },

    #[error("cancel rejected: {reason}")]
    CancelRejected { reason: String },

    #[error("bus is not connected")]
    Disconnected,
}

/// Failures of the activity manager protocol.
///
/// None of these are fatal for the application: the runtime logs them and
/// keeps running without OS level foreground integration.
#[derive(Debug, Error)]
pub enum ActivityError {
    #[error("already registered with activity manager")]
    AlreadyRegistered,

    #[error("failed to register with activity manager: {0}")]
    Register(ChannelError),

    #[error("failed to {direction} through activity manager: {source}")]
    Focus {
        direction: FocusDirection,
        source: ChannelError,
    },

    #[error("failed to cancel activity: {0}")]
    Cancel(ChannelError),

    #[error("failed to encode activity manager request: {0}")]
    Encode(serde_json::Error),
}

/// Failures while loading an application's `appinfo.json`.
#[derive(Debug, Error)]
pub enum DescriptionError {
    #[error("Could not read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Malformed application metadata: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

/// Error type for host bootstrap failures
#[derive(Debug, Error)]
pub enum HostError {
    #[error(transparent)]
    Description(#[from] DescriptionError),

    #[error("Failed to install logger: {0}")]
    Logger(#[from] log::SetLoggerError),

    #[error("No application to launch")]
    MissingApplication,

    #[error("Failed to notify service manager: {0}")]
    Notify(std::io::Error),
}
