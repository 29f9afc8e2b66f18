use std::io;

use rctelem_monitor::{capture_one, StopHandle};

use crate::cmd::rc_monitor::install_ctrlc_handler;
use crate::cmd::{address_source, RcStatusArgs};
use crate::exit::{monitor_error, CliError, CliResult, SUCCESS};
use crate::output::{write_snapshot, OutputFormat};

pub fn run(args: RcStatusArgs, format: OutputFormat) -> CliResult<i32> {
    let stop = StopHandle::new();
    install_ctrlc_handler(stop.clone())?;

    let snapshot = capture_one(address_source(args.address), args.timeout, Some(stop))
        .map_err(monitor_error)?
        .ok_or_else(|| CliError::failure("No RC_CHANNELS message received (timeout)"))?;

    write_snapshot(&mut io::stdout(), &snapshot, format)
        .map_err(|err| CliError::failure(format!("failed to write output: {err}")))?;
    Ok(SUCCESS)
}
