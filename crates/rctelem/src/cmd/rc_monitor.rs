use std::io;

use rctelem_monitor::{MonitorConfig, StopHandle, TelemetryMonitor};
use tracing::debug;

use crate::cmd::{address_source, RcMonitorArgs};
use crate::exit::{monitor_error, CliError, CliResult, SUCCESS};
use crate::output::{ChannelOutput, OutputFormat};

pub fn run(args: RcMonitorArgs, format: OutputFormat) -> CliResult<i32> {
    let source = address_source(args.address);
    // Resolve before printing anything so configuration errors come first.
    source.load().map_err(monitor_error)?;

    let config = MonitorConfig {
        address: source,
        max_messages: args.count,
        max_duration: args.duration,
    };

    let stop = StopHandle::new();
    install_ctrlc_handler(stop.clone())?;

    let mut output = ChannelOutput::new(io::stdout(), format);
    output
        .banner()
        .map_err(|err| CliError::failure(format!("failed to write output: {err}")))?;

    let mut monitor = TelemetryMonitor::new(config, output).with_stop_handle(stop);
    let stats = monitor.start().map_err(monitor_error)?;
    debug!(
        messages = stats.channel_messages,
        bytes = stats.bytes_read,
        "rc-monitor finished"
    );

    Ok(SUCCESS)
}

pub(crate) fn install_ctrlc_handler(stop: StopHandle) -> CliResult<()> {
    ctrlc::set_handler(move || stop.stop())
        .map_err(|err| CliError::failure(format!("signal handler setup failed: {err}")))
}
