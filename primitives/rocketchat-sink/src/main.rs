//! Rocket.Chat Sink - Icinga Notification Command
//!
//! Formats a single Icinga host or service notification and posts it to a
//! Rocket.Chat incoming webhook. One process handles exactly one event.
//!
//! # Usage
//!
//! ```bash
//! export ROCKETCHAT_WEBHOOK_URL=https://chat.example.com/hooks/abc/xyz
//!
//! # Host notification
//! rocketchat-sink -host.name=web01 -host.state=DOWN -host.output="PING CRITICAL"
//!
//! # Service notification
//! rocketchat-sink -icinga.timet=1700000000 -host.name=web01 \
//!     -service.name=disk -service.state=WARNING -service.output="/ 91% used"
//! ```
//!
//! # Exit Codes
//!
//! - `0` - delivered
//! - `1` - delivery failed, or delivered but the local hostname was unavailable
//! - `2` - usage error (missing webhook URL or required flags)

mod args;
mod delivery;
mod error;
mod message;
mod notification;

use std::ffi::OsString;
use std::io;
use std::process::ExitCode;

use jiff::Timestamp;
use reqwest::Client;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::args::Args;
use crate::error::{EXIT_FAILURE, NotifyError};
use crate::message::UNKNOWN_ORIGIN;
use crate::notification::{Notification, is_blank};

/// How a run that reached the webhook ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Delivered,
    /// Delivered, but the sending machine's hostname could not be read.
    Degraded,
}

impl Outcome {
    fn exit_code(self) -> u8 {
        match self {
            Self::Delivered => 0,
            Self::Degraded => EXIT_FAILURE,
        }
    }
}

/// Name to report as the sender, and the outcome a successful delivery maps to.
///
/// A failed lookup is reported on stderr and replaced by `(unknown)`.
fn origin(lookup: io::Result<OsString>) -> (String, Outcome) {
    match lookup {
        Ok(name) => (name.to_string_lossy().into_owned(), Outcome::Delivered),
        Err(e) => {
            eprintln!("{e}");
            debug!("hostname lookup failed: {e}");
            (UNKNOWN_ORIGIN.to_string(), Outcome::Degraded)
        }
    }
}

async fn run(args: Args) -> Result<Outcome, NotifyError> {
    let webhook = args
        .webhook_url
        .as_deref()
        .filter(|url| !is_blank(url))
        .ok_or(NotifyError::MissingWebhook)?;

    let notification = Notification::from_args(&args, Timestamp::now().as_second())?;
    debug!(
        mode = %notification.subject.mode(),
        host = %notification.subject.host().name,
        state = %notification.state,
        "validated notification"
    );

    let url = delivery::parse_webhook(webhook)?;

    let (sender, outcome) = origin(hostname::get());
    let text = message::render(&notification, &sender);

    let client = Client::builder().build().map_err(NotifyError::Transport)?;
    delivery::deliver(&client, url, &text).await?;

    Ok(outcome)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse_normalized();

    match run(args).await {
        Ok(outcome) => ExitCode::from(outcome.exit_code()),
        Err(e) => {
            if let NotifyError::Rejected { status, .. } = &e {
                debug!(%status, "webhook rejected notification");
            }
            eprintln!("{e}");
            ExitCode::from(e.exit_code())
        }
    }
}
