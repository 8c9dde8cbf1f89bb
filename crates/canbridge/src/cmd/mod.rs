use std::time::Duration;

use canbridge_frame::{parse_payload, CanFrame, CanId};
use canbridge_transport::{BridgeStream, TransportConfig, DEFAULT_BRIDGE_ADDR};
use clap::{Args, Subcommand};

use crate::exit::{frame_error, transport_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod decode;
pub mod encode;
pub mod listen;
pub mod matcher;
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Encode a frame as an `fts` datagram.
    Encode(EncodeArgs),
    /// Decode `rf` datagrams (argument, or `-` for stdin).
    Decode(DecodeArgs),
    /// Test identifiers against a ternary filter pattern.
    Match(MatchArgs),
    /// Send a frame or command to a bridge.
    Send(SendArgs),
    /// Connect to a bridge and print received frames.
    Listen(ListenArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Encode(args) => encode::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::Match(args) => matcher::run(args, format),
        Command::Send(args) => send::run(args, format),
        Command::Listen(args) => listen::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug, Default)]
pub struct FrameArgs {
    /// Identifier in hex (e.g. 12a).
    #[arg(long, value_parser = parse_hex_id)]
    pub id: Option<u32>,
    /// Use a 29-bit identifier.
    #[arg(long)]
    pub extended: bool,
    /// Build a remote frame requesting --dlc bytes.
    #[arg(long, requires = "dlc", conflicts_with = "data")]
    pub remote: bool,
    /// Requested length of a remote frame (0-15).
    #[arg(long, requires = "remote")]
    pub dlc: Option<u8>,
    /// Payload in hex (e.g. 1a2b3c).
    #[arg(long)]
    pub data: Option<String>,
}

impl FrameArgs {
    pub fn build(&self) -> CliResult<CanFrame> {
        let raw = self
            .id
            .ok_or_else(|| CliError::new(USAGE, "--id is required"))?;
        let id = CanId::new(raw, self.extended).map_err(|err| frame_error("invalid frame", err))?;

        let frame = if self.remote {
            CanFrame::new_remote(id, self.dlc.unwrap_or(0))
        } else {
            let data = match &self.data {
                Some(hex) => parse_payload(hex).map_err(|err| frame_error("invalid --data", err))?,
                None => Vec::new(),
            };
            CanFrame::new(id, &data)
        };
        frame.map_err(|err| frame_error("invalid frame", err))
    }
}

#[derive(Args, Debug)]
pub struct BridgeArgs {
    /// Bridge address (host:port).
    #[arg(long, env = "CANBRIDGE_ADDR", default_value = DEFAULT_BRIDGE_ADDR)]
    pub addr: String,
    /// Connect and I/O timeout (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub timeout: String,
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    #[command(flatten)]
    pub frame: FrameArgs,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Datagram such as `$rf,12a,3,1a2b3c`, or `-` to read lines from stdin.
    pub datagram: String,
}

#[derive(Args, Debug)]
pub struct MatchArgs {
    /// Pattern over 0, 1 and wildcard characters (e.g. 101x, ***_****_0000).
    pub pattern: String,
    /// Identifiers in hex.
    #[arg(required = true, num_args = 1.., value_parser = parse_hex_id)]
    pub ids: Vec<u32>,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    #[command(flatten)]
    pub bridge: BridgeArgs,
    #[command(flatten)]
    pub frame: FrameArgs,
    /// Send a raw command body instead of a frame (e.g. clearfilt).
    #[arg(long, conflicts_with_all = ["id", "data", "remote"])]
    pub command: Option<String>,
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    #[command(flatten)]
    pub bridge: BridgeArgs,
    /// Only print frames whose identifier matches one of these patterns.
    #[arg(long = "filter", value_name = "PATTERN")]
    pub filters: Vec<String>,
    /// Install a bridge-side periodic filter (e.g. 5s:***_****_****).
    #[arg(long, value_name = "PERIOD:PATTERN")]
    pub pfilt: Vec<String>,
    /// Clear bridge-side filters before listening.
    #[arg(long)]
    pub clear_filters: bool,
    /// Exit after printing N frames.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

fn parse_hex_id(input: &str) -> Result<u32, String> {
    let digits = input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
        .unwrap_or(input);
    u32::from_str_radix(digits, 16).map_err(|err| format!("invalid hex identifier {input:?}: {err}"))
}

pub(crate) fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        _ => Ok(Duration::from_secs(value)),
    }
}

pub(crate) fn connect(args: &BridgeArgs) -> CliResult<(BridgeStream, Duration)> {
    let timeout = parse_duration(&args.timeout)?;
    let config = TransportConfig {
        connect_timeout: Some(timeout),
        ..TransportConfig::default()
    };
    let stream = BridgeStream::connect(&args.addr, &config)
        .map_err(|err| transport_error("connect failed", err))?;
    tracing::info!(peer = %stream.peer_addr(), "connected to bridge");
    Ok((stream, timeout))
}
