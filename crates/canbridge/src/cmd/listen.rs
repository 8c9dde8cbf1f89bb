use std::io::ErrorKind;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use canbridge_filter::FilterSet;
use canbridge_frame::{Command, DatagramConfig, DatagramReader, DatagramWriter, FrameError};

use crate::cmd::{connect, parse_duration, ListenArgs};
use crate::exit::{frame_error, transport_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_frame, OutputFormat};

/// How often a blocked read wakes up to check for Ctrl-C.
const POLL_INTERVAL: Duration = Duration::from_millis(200);

pub fn run(args: ListenArgs, format: OutputFormat) -> CliResult<i32> {
    let commands = setup_commands(&args)?;
    let filters: FilterSet = args.filters.iter().map(String::as_str).collect();

    let (stream, timeout) = connect(&args.bridge)?;
    let write_half = stream
        .try_clone()
        .map_err(|err| transport_error("clone stream failed", err))?;

    let mut writer = DatagramWriter::with_config_bridge(
        write_half,
        DatagramConfig {
            write_timeout: Some(timeout),
            ..DatagramConfig::default()
        },
    )
    .map_err(|err| frame_error("configure stream failed", err))?;
    for command in &commands {
        writer
            .send_command(command)
            .map_err(|err| frame_error("send failed", err))?;
        tracing::info!(?command, "bridge filter configured");
    }

    let mut reader = DatagramReader::with_config_bridge(
        stream,
        DatagramConfig {
            read_timeout: Some(POLL_INTERVAL),
            ..DatagramConfig::default()
        },
    )
    .map_err(|err| frame_error("configure stream failed", err))?;

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut printed = 0usize;

    while running.load(Ordering::SeqCst) {
        let frame = match reader.read_frame() {
            Ok(frame) => frame,
            Err(FrameError::Io(err))
                if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) =>
            {
                continue;
            }
            Err(FrameError::ConnectionClosed) => {
                tracing::info!("bridge closed the connection");
                break;
            }
            Err(err) if err.is_recoverable() => {
                tracing::warn!(error = %err, "skipping datagram");
                continue;
            }
            Err(err) => return Err(frame_error("receive failed", err)),
        };

        if !filters.matches(frame.id()) {
            tracing::trace!(%frame, "filtered out");
            continue;
        }

        print_frame(&frame, format);
        printed = printed.saturating_add(1);

        if let Some(count) = args.count {
            if printed >= count {
                return Ok(SUCCESS);
            }
        }
    }

    Ok(SUCCESS)
}

/// Bridge-side filter commands to send before listening, in order.
fn setup_commands(args: &ListenArgs) -> CliResult<Vec<Command>> {
    let mut commands = Vec::with_capacity(args.pfilt.len() + 1);
    if args.clear_filters {
        commands.push(Command::ClearFilters);
    }
    for spec in &args.pfilt {
        commands.push(parse_periodic_filter(spec)?);
    }
    Ok(commands)
}

/// Parse `PERIOD:PATTERN`. A period of `0` forwards every matching frame.
fn parse_periodic_filter(spec: &str) -> CliResult<Command> {
    let (period, pattern) = spec
        .split_once(':')
        .ok_or_else(|| CliError::new(USAGE, format!("expected PERIOD:PATTERN, got {spec:?}")))?;
    if pattern.is_empty() {
        return Err(CliError::new(USAGE, format!("empty pattern in {spec:?}")));
    }
    let period = match period.trim() {
        "0" | "0s" | "0ms" => Duration::ZERO,
        other => parse_duration(other)?,
    };
    Ok(Command::periodic_filter(period, pattern))
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| {
        CliError::new(
            crate::exit::INTERNAL,
            format!("signal handler setup failed: {err}"),
        )
    })
}
