//! Failure modes of a single notification run and their exit codes.

use reqwest::StatusCode;
use thiserror::Error;

use crate::notification::Mode;

/// Exit code for caller mistakes (missing or malformed input).
pub const EXIT_USAGE: u8 = 2;

/// Exit code for failed or degraded delivery.
pub const EXIT_FAILURE: u8 = 1;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("$ROCKETCHAT_WEBHOOK_URL missing")]
    MissingWebhook,

    #[error("{0}")]
    InvalidWebhook(String),

    #[error("-{mode}.* is given, missing some of: {}", .required.join(", "))]
    MissingFields {
        mode: Mode,
        required: &'static [&'static str],
    },

    #[error(
        "Missing either -host.name and -host.state or -host.name, -service.name and -service.state"
    )]
    NoSubject,

    #[error("{0}")]
    Transport(#[source] reqwest::Error),

    /// The webhook answered with a status above 299; `dump` holds the whole response.
    #[error("{dump}")]
    Rejected { status: StatusCode, dump: String },
}

impl NotifyError {
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::MissingWebhook
            | Self::InvalidWebhook(_)
            | Self::MissingFields { .. }
            | Self::NoSubject => EXIT_USAGE,
            Self::Transport(_) | Self::Rejected { .. } => EXIT_FAILURE,
        }
    }
}
