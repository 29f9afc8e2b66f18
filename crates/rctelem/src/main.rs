mod cmd;
mod exit;
mod logging;
mod output;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};

use crate::cmd::Command;
use crate::exit::{FAILURE, SUCCESS};
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(
    name = "rctelem",
    version,
    about = "Live RC channel monitor for MAVLink telemetry"
)]
struct Cli {
    /// Output format (stdout).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    format: OutputFormat,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "warn", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Option<Command>,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => SUCCESS,
                _ => FAILURE,
            };
            let _ = err.print();
            std::process::exit(code);
        }
    };

    let Some(command) = cli.command else {
        eprintln!("{}", Cli::command().render_usage());
        std::process::exit(FAILURE);
    };

    init_logging(cli.log_format, cli.log_level);

    match cmd::run(command, cli.format) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::cmd::RcMonitorArgs;

    #[test]
    fn parses_rc_monitor_subcommand() {
        let cli = Cli::try_parse_from([
            "rctelem",
            "rc-monitor",
            "--address",
            "udpin://0.0.0.0:14540",
            "--count",
            "3",
            "--duration",
            "500ms",
        ])
        .expect("rc-monitor args should parse");

        match cli.command {
            Some(Command::RcMonitor(args)) => {
                assert_eq!(args.address.as_deref(), Some("udpin://0.0.0.0:14540"));
                assert_eq!(args.count, Some(3));
                assert_eq!(args.duration, Some(Duration::from_millis(500)));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rc_status_timeout_defaults_to_five_seconds() {
        let cli = Cli::try_parse_from([
            "rctelem",
            "rc-status",
            "--address",
            "serial:/dev/ttyUSB0:57600",
        ])
        .expect("rc-status args should parse");

        match cli.command {
            Some(Command::RcStatus(args)) => assert_eq!(args.timeout, Duration::from_secs(5)),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_format_after_subcommand() {
        let cli = Cli::try_parse_from(["rctelem", "version", "--format", "json"])
            .expect("global flag should parse after subcommand");
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn rejects_unknown_subcommand() {
        let err = Cli::try_parse_from(["rctelem", "rc-explode"]).expect_err("should fail");
        assert_eq!(err.kind(), ErrorKind::InvalidSubcommand);
    }

    #[test]
    fn rejects_bad_duration() {
        let err = Cli::try_parse_from(["rctelem", "rc-monitor", "--duration", "soon"])
            .expect_err("bad duration should fail");
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn rejects_zero_count() {
        let err = Cli::try_parse_from(["rctelem", "rc-monitor", "--count", "0"])
            .expect_err("zero count should fail");
        assert_eq!(err.kind(), ErrorKind::ValueValidation);

        let cli = Cli::try_parse_from(["rctelem", "rc-monitor", "--count", "1"])
            .expect("count of one should parse");
        assert!(matches!(
            cli.command,
            Some(Command::RcMonitor(RcMonitorArgs { count: Some(1), .. }))
        ));
    }

    #[test]
    fn subcommand_is_optional_at_parse_time() {
        let cli = Cli::try_parse_from(["rctelem"]).expect("bare invocation parses");
        assert!(cli.command.is_none());
    }
}
