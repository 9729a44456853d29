#![forbid(unsafe_code)]

//! Command-line argument parsing.
//!
//! Arguments are parsed by hand. Environment variables with the
//! `DEADRABBIT_` prefix override the defaults and are themselves overridden
//! by explicit flags.

use std::path::PathBuf;

use crate::config::DEFAULT_CONFIG_PATH;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const HELP_TEXT: &str = "\
deadrabbit: browse, drop and requeue RabbitMQ dead letters

USAGE:
    deadrabbit [OPTIONS]

OPTIONS:
    --config=PATH     Configuration file (default: configuration.yaml)
    --log-file=PATH   Log file, appended to (default: logs.txt)
    --debug           Log every state change
    --help, -h        Show this help message
    --version, -V     Show version

KEYBINDINGS:
    Q / Esc / Ctrl+C  Requeue held messages and quit
    L                 Load messages from the DLQ
    D                 Drop the selected message
    H                 Toggle message headers
    S                 Run a configured SQL query
    Tab               Switch view

ENVIRONMENT VARIABLES:
    DEADRABBIT_CONFIG     Override --config
    DEADRABBIT_LOG_FILE   Override --log-file
    DEADRABBIT_DEBUG      Set to 1 or true to enable --debug
    DEADRABBIT_LOG        Log filter, e.g. 'debug' or 'deadrabbit=trace'";

/// Default log file, relative to the working directory.
pub const DEFAULT_LOG_FILE: &str = "logs.txt";

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opts {
    pub config: PathBuf,
    pub log_file: PathBuf,
    /// Forces debug logging even when the configuration leaves it off.
    pub debug: bool,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            config: PathBuf::from(DEFAULT_CONFIG_PATH),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            debug: false,
        }
    }
}

/// What the command line asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Run(Opts),
    Help,
    Version,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CliError {
    #[error("unknown argument: {0}\nRun with --help for usage information.")]
    UnknownArgument(String),
    #[error("{flag} needs a value")]
    MissingValue { flag: &'static str },
}

impl Opts {
    /// Parse the process arguments and environment.
    pub fn parse() -> Result<Command, CliError> {
        parse_from(std::env::args().skip(1), |key| std::env::var(key).ok())
    }
}

/// Parse `args` (program name excluded) with `env` as the environment.
pub fn parse_from<I, E>(args: I, env: E) -> Result<Command, CliError>
where
    I: IntoIterator<Item = String>,
    E: Fn(&str) -> Option<String>,
{
    let mut opts = Opts::default();

    if let Some(val) = env("DEADRABBIT_CONFIG").filter(|v| !v.is_empty()) {
        opts.config = PathBuf::from(val);
    }
    if let Some(val) = env("DEADRABBIT_LOG_FILE").filter(|v| !v.is_empty()) {
        opts.log_file = PathBuf::from(val);
    }
    if let Some(val) = env("DEADRABBIT_DEBUG") {
        opts.debug = matches!(val.as_str(), "1" | "true" | "yes");
    }

    for arg in args {
        match arg.as_str() {
            "--help" | "-h" => return Ok(Command::Help),
            "--version" | "-V" => return Ok(Command::Version),
            "--debug" => opts.debug = true,
            "--config" => return Err(CliError::MissingValue { flag: "--config" }),
            "--log-file" => return Err(CliError::MissingValue { flag: "--log-file" }),
            other => {
                if let Some(val) = other.strip_prefix("--config=") {
                    if val.is_empty() {
                        return Err(CliError::MissingValue { flag: "--config" });
                    }
                    opts.config = PathBuf::from(val);
                } else if let Some(val) = other.strip_prefix("--log-file=") {
                    if val.is_empty() {
                        return Err(CliError::MissingValue { flag: "--log-file" });
                    }
                    opts.log_file = PathBuf::from(val);
                } else {
                    return Err(CliError::UnknownArgument(other.to_string()));
                }
            }
        }
    }

    Ok(Command::Run(opts))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn default_opts() {
        let opts = Opts::default();
        assert_eq!(opts.config, PathBuf::from("configuration.yaml"));
        assert_eq!(opts.log_file, PathBuf::from("logs.txt"));
        assert!(!opts.debug);
    }

    #[test]
    fn version_string_nonempty() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn help_text_lists_env_vars() {
        assert!(HELP_TEXT.contains("DEADRABBIT_CONFIG"));
        assert!(HELP_TEXT.contains("DEADRABBIT_LOG"));
        assert!(HELP_TEXT.contains("--log-file=PATH"));
    }

    #[test]
    fn flags_override_env() {
        let env = |key: &str| match key {
            "DEADRABBIT_CONFIG" => Some("env.yaml".to_string()),
            "DEADRABBIT_DEBUG" => Some("0".to_string()),
            _ => None,
        };
        let cmd = parse_from(args(&["--config=flag.yaml", "--debug"]), env).unwrap();
        let Command::Run(opts) = cmd else {
            panic!("expected run, got {cmd:?}");
        };
        assert_eq!(opts.config, PathBuf::from("flag.yaml"));
        assert!(opts.debug);

        let Command::Run(opts) = parse_from(Vec::new(), env).unwrap() else {
            panic!("expected run");
        };
        assert_eq!(opts.config, PathBuf::from("env.yaml"));
        assert!(!opts.debug);
    }

    #[test]
    fn help_and_version_short_circuit() {
        assert_eq!(parse_from(args(&["-h", "--bogus"]), no_env), Ok(Command::Help));
        assert_eq!(parse_from(args(&["--version"]), no_env), Ok(Command::Version));
    }

    #[test]
    fn rejects_unknown_and_empty() {
        assert_eq!(
            parse_from(args(&["--nope"]), no_env),
            Err(CliError::UnknownArgument("--nope".into()))
        );
        assert_eq!(
            parse_from(args(&["--config="]), no_env),
            Err(CliError::MissingValue { flag: "--config" })
        );
    }
}
