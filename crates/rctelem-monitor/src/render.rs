use std::fmt::Write as _;
use std::io::{self, Write};

use rctelem_frame::RcChannels;
use serde::Serialize;

/// Destination for decoded channel messages.
pub trait ChannelSink {
    fn render(&mut self, channels: &RcChannels) -> io::Result<()>;
}

impl<F> ChannelSink for F
where
    F: FnMut(&RcChannels) -> io::Result<()>,
{
    fn render(&mut self, channels: &RcChannels) -> io::Result<()> {
        self(channels)
    }
}

/// How [`ChannelRenderer`] lays out a message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RenderStyle {
    /// `CH1: 1500 | CH2: 1500 | ... | CH8: 1000`
    #[default]
    Line,
    /// One JSON object per line.
    Json,
}

/// Writes channels 1 through 8 of each message, one line per message.
///
/// Values are written exactly as decoded; nothing is clamped or rescaled.
pub struct ChannelRenderer<W> {
    out: W,
    style: RenderStyle,
}

impl<W: Write> ChannelRenderer<W> {
    pub fn new(out: W, style: RenderStyle) -> Self {
        Self { out, style }
    }

    /// Print the monitoring header. JSON output has no header.
    pub fn banner(&mut self) -> io::Result<()> {
        if self.style == RenderStyle::Json {
            return Ok(());
        }
        writeln!(self.out, "\n-- Monitoring RC Channels --")?;
        writeln!(self.out, "Ch1-4 typically: Roll, Pitch, Throttle, Yaw")?;
        writeln!(self.out, "Values range: 1000-2000 (1500 = center)\n")?;
        self.out.flush()
    }

    pub fn style(&self) -> RenderStyle {
        self.style
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ChannelSink for ChannelRenderer<W> {
    fn render(&mut self, channels: &RcChannels) -> io::Result<()> {
        let line = match self.style {
            RenderStyle::Line => format_line(channels),
            RenderStyle::Json => format_json(channels)?,
        };
        writeln!(self.out, "{line}")?;
        self.out.flush()
    }
}

/// `CH1: 1500 | CH2: 1500 | ...` for channels 1 through 8.
pub fn format_line(channels: &RcChannels) -> String {
    let mut line = String::with_capacity(96);
    for (idx, value) in channels.rendered().iter().enumerate() {
        if idx > 0 {
            line.push_str(" | ");
        }
        let _ = write!(line, "CH{}: {value:4}", idx + 1);
    }
    line
}

#[derive(Serialize)]
struct ChannelRecord<'a> {
    time_boot_ms: u32,
    chancount: u8,
    rssi: u8,
    channels: &'a [u16],
}

fn format_json(channels: &RcChannels) -> io::Result<String> {
    let record = ChannelRecord {
        time_boot_ms: channels.time_boot_ms,
        chancount: channels.chancount,
        rssi: channels.rssi,
        channels: channels.rendered(),
    };
    serde_json::to_string(&record).map_err(io::Error::other)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> RcChannels {
        RcChannels::new(42, &[1500, 1500, 1000, 1500, 1000, 1000, 1000, 1000])
    }

    #[test]
    fn line_lists_eight_channels_in_order() {
        let line = format_line(&scenario());
        assert_eq!(
            line,
            "CH1: 1500 | CH2: 1500 | CH3: 1000 | CH4: 1500 | CH5: 1000 | CH6: 1000 | CH7: 1000 | CH8: 1000"
        );
    }

    #[test]
    fn line_does_not_clamp() {
        let rc = RcChannels::new(0, &[0, 65535, 2200, 999, 7, 1500, 1500, 1500]);
        let line = format_line(&rc);
        assert!(line.starts_with("CH1:    0 | CH2: 65535 | CH3: 2200 | CH4:  999 | CH5:    7"));
    }

    #[test]
    fn renderer_writes_one_line_per_message() {
        let mut renderer = ChannelRenderer::new(Vec::new(), RenderStyle::Line);
        renderer.render(&scenario()).unwrap();
        renderer.render(&scenario()).unwrap();

        let out = String::from_utf8(renderer.into_inner()).unwrap();
        assert_eq!(out.lines().count(), 2);
        assert!(out.lines().all(|l| l.starts_with("CH1: 1500")));
    }

    #[test]
    fn json_style() {
        let mut renderer = ChannelRenderer::new(Vec::new(), RenderStyle::Json);
        renderer.banner().unwrap();
        renderer.render(&scenario()).unwrap();

        let out = String::from_utf8(renderer.into_inner()).unwrap();
        let value: serde_json::Value = serde_json::from_str(out.trim()).unwrap();
        assert_eq!(value["time_boot_ms"], 42);
        assert_eq!(value["chancount"], 8);
        assert_eq!(
            value["channels"],
            serde_json::json!([1500, 1500, 1000, 1500, 1000, 1000, 1000, 1000])
        );
    }

    #[test]
    fn banner_in_line_style() {
        let mut renderer = ChannelRenderer::new(Vec::new(), RenderStyle::Line);
        renderer.banner().unwrap();
        let out = String::from_utf8(renderer.into_inner()).unwrap();
        assert!(out.contains("-- Monitoring RC Channels --"));
        assert!(out.contains("1500 = center"));
    }

    #[test]
    fn closures_are_sinks() {
        let mut seen = Vec::new();
        let mut sink = |rc: &RcChannels| -> io::Result<()> {
            seen.push(rc.channels[0]);
            Ok(())
        };
        sink.render(&scenario()).unwrap();
        assert_eq!(seen, vec![1500]);
    }
}
