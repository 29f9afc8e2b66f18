use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use rctelem_frame::{DecodedMessage, DecoderStats, FrameDecoder, RcChannels, RC_CHANNELS};
use rctelem_transport::{resolve, TelemetryStream};
use tracing::{debug, info, trace, warn};

use crate::config::MonitorConfig;
use crate::error::{MonitorError, Result};
use crate::render::ChannelSink;

/// Size of the reusable read buffer.
pub const CHUNK_SIZE: usize = 2048;

/// Lifecycle of a [`TelemetryMonitor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Idle,
    Connecting,
    Monitoring,
    Stopped,
    /// Startup failed; terminal.
    Failed,
}

/// Counters reported when the loop ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonitorStats {
    pub bytes_read: u64,
    /// Reads that returned no data within the transport timeout.
    pub timeouts: u64,
    /// Validated frames of any kind.
    pub messages: u64,
    /// Channel messages handed to the sink.
    pub channel_messages: u64,
}

/// Cloneable stop request shared with other threads (e.g. a Ctrl-C handler).
///
/// The loop checks it once per read, so a stop takes effect within one
/// transport timeout.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    stopped: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

/// Owns one transport and drives read → decode → filter → render.
pub struct TelemetryMonitor<S> {
    config: MonitorConfig,
    sink: S,
    state: MonitorState,
    stream: Option<TelemetryStream>,
    decoder: FrameDecoder,
    stop: StopHandle,
    stats: MonitorStats,
    started: bool,
}

impl<S: ChannelSink> TelemetryMonitor<S> {
    pub fn new(config: MonitorConfig, sink: S) -> Self {
        Self {
            config,
            sink,
            state: MonitorState::Idle,
            stream: None,
            decoder: FrameDecoder::new(),
            stop: StopHandle::new(),
            stats: MonitorStats::default(),
            started: false,
        }
    }

    /// Share an existing stop handle instead of the monitor's own.
    pub fn with_stop_handle(mut self, stop: StopHandle) -> Self {
        self.stop = stop;
        self
    }

    /// Connect and monitor until stopped, a limit is reached, or a read fails.
    ///
    /// Can be called once. If a stop was requested beforehand, returns
    /// immediately without opening a transport.
    pub fn start(&mut self) -> Result<MonitorStats> {
        if self.started {
            return Err(MonitorError::AlreadyStarted);
        }
        self.started = true;

        if self.stop.is_stopped() {
            debug!("stop requested before start");
            self.state = MonitorState::Stopped;
            return Ok(self.stats);
        }

        if let Err(err) = self.connect() {
            // Failed is only entered from Connecting.
            debug_assert_eq!(self.state, MonitorState::Connecting);
            self.state = MonitorState::Failed;
            return Err(err);
        }

        let result = self.run();
        self.release();
        self.state = MonitorState::Stopped;

        info!(
            bytes = self.stats.bytes_read,
            messages = self.stats.messages,
            channel_messages = self.stats.channel_messages,
            timeouts = self.stats.timeouts,
            "monitoring stopped"
        );
        result.map(|()| self.stats)
    }

    fn connect(&mut self) -> Result<()> {
        self.state = MonitorState::Connecting;
        let address = self.config.address.load()?;
        let spec = resolve(&address)?;

        debug!(%spec, transport = %spec.kind(), "connecting");
        let stream = TelemetryStream::open(&spec)?;
        info!(endpoint = %stream.describe(), "monitoring RC channels");

        self.stream = Some(stream);
        self.state = MonitorState::Monitoring;
        Ok(())
    }

    fn run(&mut self) -> Result<()> {
        let mut chunk = [0u8; CHUNK_SIZE];
        let deadline = self.config.max_duration.map(|d| Instant::now() + d);

        loop {
            if self.stop.is_stopped() {
                debug!("stop requested");
                return Ok(());
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                debug!("duration limit reached");
                return Ok(());
            }

            let Some(stream) = self.stream.as_mut() else {
                return Ok(());
            };
            let n = stream.read(&mut chunk).map_err(|err| {
                warn!(error = %err, "transport read failed");
                MonitorError::from(err)
            })?;

            if n == 0 {
                self.stats.timeouts += 1;
                trace!("read timed out");
                continue;
            }
            self.stats.bytes_read += n as u64;

            for &byte in &chunk[..n] {
                if let Some(message) = self.decoder.feed(byte) {
                    self.stats.messages += 1;
                    self.dispatch(&message)?;
                    if self.limit_reached() {
                        debug!("message limit reached");
                        return Ok(());
                    }
                }
            }
        }
    }

    fn dispatch(&mut self, message: &DecodedMessage) -> Result<()> {
        if message.message_id != RC_CHANNELS {
            trace!(message = message.name(), "discarding");
            return Ok(());
        }
        let Some(channels) = RcChannels::from_message(message) else {
            return Ok(());
        };
        self.sink
            .render(&channels)
            .map_err(MonitorError::Render)?;
        self.stats.channel_messages += 1;
        Ok(())
    }

    fn limit_reached(&self) -> bool {
        self.config
            .max_messages
            .is_some_and(|max| self.stats.channel_messages >= max)
    }
}

impl<S> TelemetryMonitor<S> {
    /// Request termination and release the transport. Idempotent.
    pub fn stop(&mut self) {
        self.stop.stop();
        self.release();
        if self.state != MonitorState::Failed {
            self.state = MonitorState::Stopped;
        }
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    pub fn stats(&self) -> MonitorStats {
        self.stats
    }

    pub fn decoder_stats(&self) -> DecoderStats {
        self.decoder.stats()
    }

    /// True while a transport is held.
    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// The single release path for every exit: stop, error, limit, and drop.
    fn release(&mut self) {
        if let Some(stream) = self.stream.take() {
            stream.close();
        }
    }
}

impl<S> Drop for TelemetryMonitor<S> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<S> std::fmt::Debug for TelemetryMonitor<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelemetryMonitor")
            .field("state", &self.state)
            .field("stream", &self.stream)
            .field("stats", &self.stats)
            .finish()
    }
}
