//! Turns the raw Icinga macros into a validated [`Notification`].
//!
//! Any non-blank service field selects service mode, otherwise any non-blank
//! host field selects host mode. Each mode has its own set of required flags.

use std::fmt;

use crate::args::Args;
use crate::error::NotifyError;

const HOST_REQUIRED: &[&str] = &["-host.name", "-host.state"];
const SERVICE_REQUIRED: &[&str] = &["-host.name", "-service.name", "-service.state"];

/// Empty after trimming surrounding whitespace.
pub fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Host,
    Service,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Host => f.write_str("host"),
            Self::Service => f.write_str("service"),
        }
    }
}

/// A monitored host or service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub name: String,
    /// Falls back to `name` when blank.
    pub display_name: String,
    /// Blank when there is no link.
    pub action_url: String,
}

impl Entity {
    fn new(name: &str, display_name: &str, action_url: &str) -> Self {
        let display_name = if is_blank(display_name) {
            name
        } else {
            display_name
        };

        Self {
            name: name.to_string(),
            display_name: display_name.to_string(),
            action_url: action_url.to_string(),
        }
    }
}

/// What the notification is about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subject {
    Host(Entity),
    Service { host: Entity, service: Entity },
}

impl Subject {
    pub fn mode(&self) -> Mode {
        match self {
            Self::Host(_) => Mode::Host,
            Self::Service { .. } => Mode::Service,
        }
    }

    pub fn host(&self) -> &Entity {
        match self {
            Self::Host(host) | Self::Service { host, .. } => host,
        }
    }
}

/// A validated monitoring event, ready to be rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Seconds since the epoch.
    pub timestamp: i64,
    pub subject: Subject,
    pub state: String,
    pub output: String,
}

impl Notification {
    /// Validates `args` and applies display name defaults. `now` replaces a zero timestamp.
    pub fn from_args(args: &Args, now: i64) -> Result<Self, NotifyError> {
        let timestamp = if args.icinga_timet == 0 {
            now
        } else {
            args.icinga_timet
        };

        let host = Entity::new(
            &args.host_name,
            &args.host_display_name,
            &args.host_action_url,
        );

        let service_given = [
            &args.service_name,
            &args.service_display_name,
            &args.service_action_url,
            &args.service_state,
            &args.service_output,
        ]
        .iter()
        .any(|field| !is_blank(field));

        let host_given = [
            &args.host_name,
            &args.host_display_name,
            &args.host_action_url,
            &args.host_state,
            &args.host_output,
        ]
        .iter()
        .any(|field| !is_blank(field));

        if service_given {
            if is_blank(&args.host_name)
                || is_blank(&args.service_name)
                || is_blank(&args.service_state)
            {
                return Err(NotifyError::MissingFields {
                    mode: Mode::Service,
                    required: SERVICE_REQUIRED,
                });
            }

            let service = Entity::new(
                &args.service_name,
                &args.service_display_name,
                &args.service_action_url,
            );

            Ok(Self {
                timestamp,
                subject: Subject::Service { host, service },
                state: args.service_state.clone(),
                output: args.service_output.clone(),
            })
        } else if host_given {
            if is_blank(&args.host_name) || is_blank(&args.host_state) {
                return Err(NotifyError::MissingFields {
                    mode: Mode::Host,
                    required: HOST_REQUIRED,
                });
            }

            Ok(Self {
                timestamp,
                subject: Subject::Host(host),
                state: args.host_state.clone(),
                output: args.host_output.clone(),
            })
        } else {
            Err(NotifyError::NoSubject)
        }
    }
}
