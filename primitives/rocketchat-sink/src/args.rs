//! Command line arguments.
//!
//! Icinga hands its runtime macros to notification commands as single-dash
//! long flags (`-host.name=web01`). clap only understands long options with
//! two dashes, so [`normalize`] rewrites the known flags before parsing.

use std::ffi::OsString;

use clap::Parser;

/// Long flags that may be spelled with a single dash.
const LONG_FLAGS: &[&str] = &[
    "icinga.timet",
    "host.name",
    "host.display_name",
    "host.action_url",
    "host.state",
    "host.output",
    "service.name",
    "service.display_name",
    "service.action_url",
    "service.state",
    "service.output",
    "webhook-url",
    "help",
    "version",
];

/// Rocket.Chat notification command for Icinga.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "rocketchat-sink", version)]
#[command(about = "Posts Icinga host and service notifications to a Rocket.Chat webhook")]
pub struct Args {
    /// Event time in seconds since the epoch ($icinga.timet$, 0 = now).
    #[arg(
        long = "icinga.timet",
        value_name = "SECONDS",
        default_value_t = 0,
        allow_negative_numbers = true
    )]
    pub icinga_timet: i64,

    /// $host.name$
    #[arg(long = "host.name", value_name = "NAME", default_value = "", allow_hyphen_values = true)]
    pub host_name: String,

    /// $host.display_name$
    #[arg(long = "host.display_name", value_name = "NAME", default_value = "", allow_hyphen_values = true)]
    pub host_display_name: String,

    /// $host.action_url$
    #[arg(long = "host.action_url", value_name = "URL", default_value = "", allow_hyphen_values = true)]
    pub host_action_url: String,

    /// $host.state$
    #[arg(long = "host.state", value_name = "STATE", default_value = "", allow_hyphen_values = true)]
    pub host_state: String,

    /// $host.output$
    #[arg(long = "host.output", value_name = "TEXT", default_value = "", allow_hyphen_values = true)]
    pub host_output: String,

    /// $service.name$
    #[arg(long = "service.name", value_name = "NAME", default_value = "", allow_hyphen_values = true)]
    pub service_name: String,

    /// $service.display_name$
    #[arg(long = "service.display_name", value_name = "NAME", default_value = "", allow_hyphen_values = true)]
    pub service_display_name: String,

    /// $service.action_url$
    #[arg(long = "service.action_url", value_name = "URL", default_value = "", allow_hyphen_values = true)]
    pub service_action_url: String,

    /// $service.state$
    #[arg(long = "service.state", value_name = "STATE", default_value = "", allow_hyphen_values = true)]
    pub service_state: String,

    /// $service.output$
    #[arg(long = "service.output", value_name = "TEXT", default_value = "", allow_hyphen_values = true)]
    pub service_output: String,

    /// Rocket.Chat incoming webhook URL.
    #[arg(long = "webhook-url", env = "ROCKETCHAT_WEBHOOK_URL", hide_env_values = true)]
    pub webhook_url: Option<String>,
}

impl Args {
    /// Parses the process arguments, accepting Icinga's single-dash spelling.
    pub fn parse_normalized() -> Self {
        Self::parse_from(normalize(std::env::args_os()))
    }
}

/// Rewrites `-flag` and `-flag=value` into `--flag` / `--flag=value` for every
/// known long flag. The program name and everything after a bare `--` pass
/// through untouched.
pub fn normalize<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut normalized = Vec::new();
    let mut verbatim = false;

    for (index, arg) in args.into_iter().enumerate() {
        if index == 0 || verbatim {
            normalized.push(arg);
            continue;
        }

        if arg == "--" {
            verbatim = true;
            normalized.push(arg);
            continue;
        }

        match arg.to_str() {
            Some(text) if is_single_dash_flag(text) => normalized.push(format!("-{text}").into()),
            _ => normalized.push(arg),
        }
    }

    normalized
}

fn is_single_dash_flag(arg: &str) -> bool {
    let Some(rest) = arg.strip_prefix('-') else {
        return false;
    };

    if rest.starts_with('-') {
        return false;
    }

    let name = rest.split_once('=').map_or(rest, |(name, _)| name);
    LONG_FLAGS.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn os(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(normalize(os(args))).unwrap()
    }

    #[test]
    fn rewrites_single_dash_flags() {
        let out = normalize(os(&["bin", "-host.name=h1", "-host.state", "UP"]));
        assert_eq!(out, os(&["bin", "--host.name=h1", "--host.state", "UP"]));
    }

    #[test]
    fn leaves_values_and_unknown_flags_alone() {
        let out = normalize(os(&["-host.name", "bin", "-x", "--host.state=UP", "-unknown=1"]));
        assert_eq!(out, os(&["-host.name", "bin", "-x", "--host.state=UP", "-unknown=1"]));
    }

    #[test]
    fn stops_rewriting_after_terminator() {
        let out = normalize(os(&["bin", "--", "-host.name=h1"]));
        assert_eq!(out, os(&["bin", "--", "-host.name=h1"]));
    }

    #[test]
    fn parses_icinga_style_command_line() {
        let args = parse(&[
            "rocketchat-sink",
            "-icinga.timet=1700000000",
            "-host.name=h1",
            "-service.name",
            "s1",
            "-service.state=CRITICAL",
            "-service.output",
            "-1 packets lost",
        ]);

        assert_eq!(args.icinga_timet, 1_700_000_000);
        assert_eq!(args.host_name, "h1");
        assert_eq!(args.service_name, "s1");
        assert_eq!(args.service_state, "CRITICAL");
        assert_eq!(args.service_output, "-1 packets lost");
        assert_eq!(args.host_state, "");
    }

    #[test]
    fn defaults_are_empty() {
        let args = parse(&["rocketchat-sink"]);

        assert_eq!(args.icinga_timet, 0);
        assert!(args.host_name.is_empty());
        assert!(args.service_output.is_empty());
    }

    #[test]
    fn rejects_non_numeric_timestamp() {
        let err = Args::try_parse_from(normalize(os(&["bin", "-icinga.timet=soon"]))).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
