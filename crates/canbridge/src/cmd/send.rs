use canbridge_frame::{Command, DatagramConfig, DatagramWriter, CLEAR_FILTERS_TAG};

use crate::cmd::{connect, SendArgs};
use crate::exit::{frame_error, CliResult, SUCCESS};
use crate::output::{print_datagram, OutputFormat};

pub fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    let command = resolve_command(&args)?;
    let (stream, timeout) = connect(&args.bridge)?;

    let config = DatagramConfig {
        write_timeout: Some(timeout),
        ..DatagramConfig::default()
    };
    let mut writer = DatagramWriter::with_config_bridge(stream, config)
        .map_err(|err| frame_error("configure stream failed", err))?;
    writer
        .send_command(&command)
        .map_err(|err| frame_error("send failed", err))?;

    tracing::info!(?command, "sent");
    print_datagram(&command.to_datagram(), format);

    Ok(SUCCESS)
}

fn resolve_command(args: &SendArgs) -> CliResult<Command> {
    match args.command.as_deref() {
        Some(CLEAR_FILTERS_TAG) => Ok(Command::ClearFilters),
        Some(body) => Ok(Command::Raw(body.to_string())),
        None => args.frame.build().map(Command::SendFrame),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::{BridgeArgs, FrameArgs};

    fn send_args(command: Option<&str>, frame: FrameArgs) -> SendArgs {
        SendArgs {
            bridge: BridgeArgs {
                addr: "127.0.0.1:1".to_string(),
                timeout: "1s".to_string(),
            },
            frame,
            command: command.map(str::to_string),
        }
    }

    #[test]
    fn resolves_raw_and_clear_commands() {
        let clear = resolve_command(&send_args(Some("clearfilt"), FrameArgs::default())).unwrap();
        assert_eq!(clear, Command::ClearFilters);

        let raw = resolve_command(&send_args(Some("pfilt,0,1x"), FrameArgs::default())).unwrap();
        assert_eq!(raw.to_datagram().as_ref(), b"$pfilt,0,1x\n");
    }

    #[test]
    fn resolves_frame_command() {
        let frame = FrameArgs {
            id: Some(0x7ff),
            data: Some("00".to_string()),
            ..FrameArgs::default()
        };
        let command = resolve_command(&send_args(None, frame)).unwrap();
        assert_eq!(command.to_datagram().as_ref(), b"$fts,7ff,1,00\n");
    }
}
