use std::io::{self, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use rctelem_monitor::{ChannelRenderer, ChannelSink, RcChannels, RenderStyle};
use serde::Serialize;

#[derive(Clone, Debug, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// `CH1: 1500 | CH2: 1500 | ...`
    #[default]
    Text,
    Json,
    Table,
}

/// Conventional stick assignment for the first four channels.
const STICK_LABELS: [&str; 4] = ["Roll", "Pitch", "Throttle", "Yaw"];

pub fn channel_label(number: usize) -> String {
    match STICK_LABELS.get(number.wrapping_sub(1)) {
        Some(label) => (*label).to_string(),
        None => format!("Aux {}", number.saturating_sub(4)),
    }
}

/// Sink that writes each channel message to `out` in the selected format.
pub enum ChannelOutput<W: Write> {
    Stream(ChannelRenderer<W>),
    Table(W),
}

impl<W: Write> ChannelOutput<W> {
    pub fn new(out: W, format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => Self::Stream(ChannelRenderer::new(out, RenderStyle::Line)),
            OutputFormat::Json => Self::Stream(ChannelRenderer::new(out, RenderStyle::Json)),
            OutputFormat::Table => Self::Table(out),
        }
    }

    pub fn banner(&mut self) -> io::Result<()> {
        match self {
            Self::Stream(renderer) => renderer.banner(),
            Self::Table(_) => Ok(()),
        }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        match self {
            Self::Stream(renderer) => renderer.into_inner(),
            Self::Table(out) => out,
        }
    }
}

impl<W: Write> ChannelSink for ChannelOutput<W> {
    fn render(&mut self, channels: &RcChannels) -> io::Result<()> {
        match self {
            Self::Stream(renderer) => renderer.render(channels),
            Self::Table(out) => {
                writeln!(out, "{}", channel_row_table(channels))?;
                out.flush()
            }
        }
    }
}

fn channel_row_table(channels: &RcChannels) -> Table {
    let header: Vec<String> = (1..=channels.rendered().len())
        .map(|n| format!("CH{n}"))
        .collect();
    let row: Vec<String> = channels.rendered().iter().map(u16::to_string).collect();

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header)
        .add_row(row);
    table
}

#[derive(Serialize)]
struct SnapshotOutput<'a> {
    time_boot_ms: u32,
    chancount: u8,
    rssi: u8,
    channels: Vec<ChannelOutputEntry<'a>>,
}

#[derive(Serialize)]
struct ChannelOutputEntry<'a> {
    channel: usize,
    label: &'a str,
    value: u16,
}

/// Labeled view of one message: channels 1 through 8 plus RSSI.
pub fn write_snapshot<W: Write>(
    out: &mut W,
    channels: &RcChannels,
    format: OutputFormat,
) -> io::Result<()> {
    let labels: Vec<String> = (1..=channels.rendered().len()).map(channel_label).collect();

    match format {
        OutputFormat::Json => {
            let snapshot = SnapshotOutput {
                time_boot_ms: channels.time_boot_ms,
                chancount: channels.chancount,
                rssi: channels.rssi,
                channels: channels
                    .rendered()
                    .iter()
                    .zip(&labels)
                    .enumerate()
                    .map(|(idx, (value, label))| ChannelOutputEntry {
                        channel: idx + 1,
                        label,
                        value: *value,
                    })
                    .collect(),
            };
            let line = serde_json::to_string(&snapshot).map_err(io::Error::other)?;
            writeln!(out, "{line}")?;
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["CHANNEL", "FUNCTION", "VALUE"]);
            for (idx, (value, label)) in channels.rendered().iter().zip(&labels).enumerate() {
                table.add_row(vec![
                    format!("CH{}", idx + 1),
                    label.clone(),
                    value.to_string(),
                ]);
            }
            table.add_row(vec![
                "RSSI".to_string(),
                String::new(),
                channels.rssi.to_string(),
            ]);
            writeln!(out, "{table}")?;
        }
        OutputFormat::Text => {
            writeln!(out, "RC Channels (time_boot_ms={}):", channels.time_boot_ms)?;
            for (idx, (value, label)) in channels.rendered().iter().zip(&labels).enumerate() {
                let name = format!("CH{} ({label}):", idx + 1);
                writeln!(out, "  {name:<18}{value}")?;
            }
            writeln!(out, "  {:<18}{}", "RSSI:", channels.rssi)?;
        }
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> RcChannels {
        RcChannels::new(1234, &[1500, 1500, 1000, 1500, 1000, 1000, 1000, 1000])
    }

    #[test]
    fn labels_cover_sticks_and_aux() {
        assert_eq!(channel_label(1), "Roll");
        assert_eq!(channel_label(3), "Throttle");
        assert_eq!(channel_label(4), "Yaw");
        assert_eq!(channel_label(5), "Aux 1");
        assert_eq!(channel_label(8), "Aux 4");
    }

    #[test]
    fn text_output_is_the_channel_line() {
        let mut sink = ChannelOutput::new(Vec::new(), OutputFormat::Text);
        sink.render(&scenario()).unwrap();
        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(
            out.trim_end(),
            "CH1: 1500 | CH2: 1500 | CH3: 1000 | CH4: 1500 | CH5: 1000 | CH6: 1000 | CH7: 1000 | CH8: 1000"
        );
    }

    #[test]
    fn table_output_has_every_channel() {
        let mut sink = ChannelOutput::new(Vec::new(), OutputFormat::Table);
        sink.banner().unwrap();
        sink.render(&scenario()).unwrap();
        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert!(out.contains("CH1"));
        assert!(out.contains("CH8"));
        assert!(out.contains("1500"));
        assert!(!out.contains("Monitoring"));
    }

    #[test]
    fn snapshot_text_is_labeled() {
        let mut out = Vec::new();
        write_snapshot(&mut out, &scenario(), OutputFormat::Text).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("CH1 (Roll):"));
        assert!(out.contains("CH3 (Throttle):"));
        assert!(out.contains("RSSI:"));
        assert_eq!(out.lines().count(), 10);
    }

    #[test]
    fn snapshot_json_lists_labeled_channels() {
        let mut out = Vec::new();
        write_snapshot(&mut out, &scenario(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["time_boot_ms"], 1234);
        assert_eq!(value["rssi"], 255);
        assert_eq!(value["channels"][3]["label"], "Yaw");
        assert_eq!(value["channels"][3]["value"], 1500);
        assert_eq!(value["channels"].as_array().unwrap().len(), 8);
    }

    #[test]
    fn snapshot_table_includes_rssi() {
        let mut out = Vec::new();
        write_snapshot(&mut out, &scenario(), OutputFormat::Table).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("FUNCTION"));
        assert!(out.contains("Pitch"));
        assert!(out.contains("RSSI"));
    }
}
