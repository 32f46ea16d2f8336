//! Renders a [`Notification`] as Rocket.Chat markdown.

use jiff::{Timestamp, fmt::strtime, tz::TimeZone};

use crate::notification::{Entity, Notification, Subject, is_blank};

/// Placeholder for the sending machine when its hostname cannot be read.
pub const UNKNOWN_ORIGIN: &str = "(unknown)";

/// Coarse classification of an Icinga state label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Ok,
    Warning,
    Critical,
    Unknown,
}

impl Severity {
    /// Exact, case-sensitive match on the Icinga state.
    pub fn from_state(state: &str) -> Self {
        match state {
            "UP" | "OK" => Self::Ok,
            "WARNING" => Self::Warning,
            "DOWN" | "CRITICAL" => Self::Critical,
            _ => Self::Unknown,
        }
    }

    /// Emoji shortcode, without the surrounding colons.
    pub fn icon(self) -> &'static str {
        match self {
            Self::Ok => "white_check_mark",
            Self::Warning => "warning",
            Self::Critical => "exclamation",
            Self::Unknown => "question",
        }
    }

    pub fn punctuation(self) -> char {
        match self {
            Self::Ok => '.',
            _ => '!',
        }
    }
}

/// `[text](url)` when a link is present, `_text_` otherwise.
pub fn link_or_italic(text: &str, url: &str) -> String {
    if is_blank(url) {
        format!("_{text}_")
    } else {
        format!("[{text}]({url})")
    }
}

fn entity_label(entity: &Entity) -> String {
    link_or_italic(&entity.display_name, &entity.action_url)
}

/// Local date and time of `timestamp` with offset and zone abbreviation, or the
/// raw number if it is out of range.
pub fn format_time(timestamp: i64) -> String {
    Timestamp::from_second(timestamp)
        .and_then(|time| {
            strtime::format("%Y-%m-%d %H:%M:%S %z %Z", &time.to_zoned(TimeZone::system()))
        })
        .unwrap_or_else(|_| timestamp.to_string())
}

/// Builds the message text. `origin` is the name of the machine sending it.
pub fn render(notification: &Notification, origin: &str) -> String {
    let severity = Severity::from_state(&notification.state);
    let icon = severity.icon();
    let mark = severity.punctuation();
    let state = notification.state.to_lowercase();
    let when = format_time(notification.timestamp);

    let summary = match &notification.subject {
        Subject::Service { host, service } => format!(
            ":{icon}: *Service monitoring on {origin}* :{icon}:\n\n\
             {} on {} is *{state}*{mark}\n\n\
             When: {when}\nHost: {}\nService: {}",
            entity_label(service),
            entity_label(host),
            host.name,
            service.name,
        ),
        Subject::Host(host) => format!(
            ":{icon}: *Host monitoring on {origin}* :{icon}:\n\n\
             {} is *{state}*{mark}\n\n\
             When: {when}\nHost: {}",
            entity_label(host),
            host.name,
        ),
    };

    format!("{summary}\nInfo:\n\n```\n{}\n```", notification.output)
}
