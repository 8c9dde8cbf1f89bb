use std::io::{IsTerminal, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use canbridge_filter::FilterPattern;
use canbridge_frame::CanFrame;
use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct FrameOutput {
    id: u32,
    id_hex: String,
    extended: bool,
    remote: bool,
    dlc: u8,
    data: String,
    timestamp: String,
}

impl FrameOutput {
    fn new(frame: &CanFrame) -> Self {
        Self {
            id: frame.id(),
            id_hex: format!("{:x}", frame.id()),
            extended: frame.is_extended(),
            remote: frame.is_remote(),
            dlc: frame.dlc(),
            data: hex_string(frame.data()),
            timestamp: now_unix_seconds(),
        }
    }
}

pub fn print_frame(frame: &CanFrame, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(&FrameOutput::new(frame)).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["ID", "KIND", "DLC", "DATA"])
                .add_row(vec![
                    format!("{:x}", frame.id()),
                    frame_kind(frame).to_string(),
                    frame.dlc().to_string(),
                    hex_string(frame.data()),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!("{frame}"),
        OutputFormat::Raw => print_raw(frame.data()),
    }
}

#[derive(Serialize)]
struct DatagramOutput<'a> {
    datagram: &'a str,
}

/// Print an outgoing datagram (terminator stripped except in raw mode).
pub fn print_datagram(datagram: &[u8], format: OutputFormat) {
    let text = String::from_utf8_lossy(datagram);
    let line = text.trim_end_matches(&['\r', '\n'][..]);
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(&DatagramOutput { datagram: line })
                    .unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_header(vec!["DATAGRAM"])
                .add_row(vec![line]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!("{line}"),
        OutputFormat::Raw => print_raw(datagram),
    }
}

#[derive(Serialize)]
struct MatchOutput {
    pattern: String,
    id: u32,
    id_hex: String,
    matches: bool,
}

pub fn print_matches(pattern: &FilterPattern, results: &[(u32, bool)], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            for &(id, matches) in results {
                let out = MatchOutput {
                    pattern: pattern.to_string(),
                    id,
                    id_hex: format!("{id:x}"),
                    matches,
                };
                println!(
                    "{}",
                    serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
                );
            }
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["ID", "BINARY", "MATCH"]);
            let width = pattern.width().max(1) as usize;
            for &(id, matches) in results {
                table.add_row(vec![
                    format!("{id:x}"),
                    format!("{id:0width$b}"),
                    if matches { "yes" } else { "no" }.to_string(),
                ]);
            }
            println!("pattern {pattern}");
            println!("{table}");
        }
        OutputFormat::Pretty | OutputFormat::Raw => {
            for &(id, matches) in results {
                println!("{id:x} {}", if matches { "match" } else { "no-match" });
            }
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn frame_kind(frame: &CanFrame) -> &'static str {
    match (frame.is_extended(), frame.is_remote()) {
        (false, false) => "STD DATA",
        (false, true) => "STD REMOTE",
        (true, false) => "EXT DATA",
        (true, true) => "EXT REMOTE",
    }
}

fn hex_string(data: &[u8]) -> String {
    data.iter().map(|b| format!("{b:02x}")).collect()
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}

#[cfg(test)]
mod tests {
    use canbridge_frame::CanId;

    use super::*;

    #[test]
    fn frame_output_fields() {
        let frame = CanFrame::new(CanId::extended(0x12a).unwrap(), &[0x0a, 0xff]).unwrap();
        let out = serde_json::to_value(FrameOutput::new(&frame)).unwrap();

        assert_eq!(out["id"], 0x12a);
        assert_eq!(out["id_hex"], "12a");
        assert_eq!(out["extended"], true);
        assert_eq!(out["remote"], false);
        assert_eq!(out["dlc"], 2);
        assert_eq!(out["data"], "0aff");
    }

    #[test]
    fn frame_kinds() {
        let id = CanId::standard(1).unwrap();
        assert_eq!(frame_kind(&CanFrame::new(id, &[]).unwrap()), "STD DATA");
        assert_eq!(frame_kind(&CanFrame::new_remote(id, 1).unwrap()), "STD REMOTE");
    }
}
