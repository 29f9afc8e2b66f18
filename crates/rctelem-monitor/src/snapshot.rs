use std::io;
use std::time::Duration;

use rctelem_frame::RcChannels;
use tracing::debug;

use crate::config::{AddressSource, MonitorConfig};
use crate::error::Result;
use crate::monitor::{StopHandle, TelemetryMonitor};

/// Default wait for a single channel message.
pub const DEFAULT_SNAPSHOT_TIMEOUT: Duration = Duration::from_secs(5);

/// Wait up to `timeout` for one RC_CHANNELS message.
///
/// Returns `Ok(None)` when nothing arrives in time or `stop` fires first.
/// The deadline is checked between reads, so the call can overrun `timeout`
/// by up to one transport read timeout.
pub fn capture_one(
    address: AddressSource,
    timeout: Duration,
    stop: Option<StopHandle>,
) -> Result<Option<RcChannels>> {
    let config = MonitorConfig {
        address,
        max_messages: Some(1),
        max_duration: Some(timeout),
    };

    let mut captured = None;
    {
        let sink = |rc: &RcChannels| -> io::Result<()> {
            captured = Some(*rc);
            Ok(())
        };
        let mut monitor = TelemetryMonitor::new(config, sink);
        if let Some(stop) = stop {
            monitor = monitor.with_stop_handle(stop);
        }
        monitor.start()?;
    }

    if captured.is_none() {
        debug!(?timeout, "no channel message before deadline");
    }
    Ok(captured)
}
