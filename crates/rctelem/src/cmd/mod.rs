use std::time::Duration;

use clap::{Args, Subcommand};
use rctelem_monitor::{AddressSource, ADDRESS_ENV};

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod rc_monitor;
pub mod rc_status;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print every RC_CHANNELS message until interrupted.
    RcMonitor(RcMonitorArgs),
    /// Wait for one RC_CHANNELS message and print a labeled snapshot.
    RcStatus(RcStatusArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::RcMonitor(args) => rc_monitor::run(args, format),
        Command::RcStatus(args) => rc_status::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct RcMonitorArgs {
    /// Connection address: `serial:<device>:<baud>` or `[udpin://]<host>:<port>`.
    #[arg(long, env = ADDRESS_ENV)]
    pub address: Option<String>,
    /// Exit after printing N messages (at least 1).
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub count: Option<u64>,
    /// Exit after this long (e.g. 10s, 500ms, 2m). Default: run until Ctrl-C.
    #[arg(long, value_parser = parse_duration)]
    pub duration: Option<Duration>,
}

#[derive(Args, Debug)]
pub struct RcStatusArgs {
    /// Connection address: `serial:<device>:<baud>` or `[udpin://]<host>:<port>`.
    #[arg(long, env = ADDRESS_ENV)]
    pub address: Option<String>,
    /// How long to wait for a message (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s", value_parser = parse_duration)]
    pub timeout: Duration,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// A blank `--address` counts as missing so the error names the variable.
pub fn address_source(address: Option<String>) -> AddressSource {
    match address {
        Some(address) if !address.trim().is_empty() => AddressSource::Literal(address),
        _ => AddressSource::default(),
    }
}

pub fn parse_duration(input: &str) -> Result<Duration, String> {
    let input = input.trim();
    if input.is_empty() {
        return Err("duration must not be empty".to_string());
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else if let Some(num) = input.strip_suffix('m') {
        (num, "m")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .trim()
        .parse()
        .map_err(|_| format!("invalid duration value: {input}"))?;

    if value == 0 {
        return Err("duration must be greater than zero".to_string());
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        "m" => value
            .checked_mul(60)
            .map(Duration::from_secs)
            .ok_or_else(|| format!("duration too large: {input}")),
        _ => Ok(Duration::from_secs(value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_duration_units() {
        assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("150ms").unwrap(), Duration::from_millis(150));
        assert_eq!(parse_duration("2m").unwrap(), Duration::from_secs(120));
        assert_eq!(parse_duration("3").unwrap(), Duration::from_secs(3));
    }

    #[test]
    fn parse_duration_rejects_garbage() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("0s").is_err());
        assert!(parse_duration("fast").is_err());
        assert!(parse_duration("-1s").is_err());
    }

    #[test]
    fn blank_address_falls_back_to_env_source() {
        assert_eq!(address_source(None), AddressSource::default());
        assert_eq!(address_source(Some("  ".to_string())), AddressSource::default());
        assert_eq!(
            address_source(Some("udpin://0.0.0.0:14540".to_string())),
            AddressSource::Literal("udpin://0.0.0.0:14540".to_string())
        );
    }
}
