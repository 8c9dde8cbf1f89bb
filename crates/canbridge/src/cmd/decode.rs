use std::io::Read;

use canbridge_frame::{decode_frame, DatagramReader};

use crate::cmd::DecodeArgs;
use crate::exit::{frame_error, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{print_frame, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    if args.datagram == "-" {
        return decode_stream(std::io::stdin().lock(), format);
    }

    let mut datagram = args.datagram.into_bytes();
    if datagram.last() != Some(&b'\n') {
        datagram.push(b'\n');
    }
    let frame = decode_frame(&datagram).map_err(|err| frame_error("decode failed", err))?;
    print_frame(&frame, format);
    Ok(SUCCESS)
}

/// Decode every line of `input`, reporting bad lines without stopping.
fn decode_stream<R: Read>(input: R, format: OutputFormat) -> CliResult<i32> {
    let mut failed = 0usize;
    for result in DatagramReader::new(input) {
        match result {
            Ok(frame) => print_frame(&frame, format),
            Err(err) if err.is_recoverable() => {
                tracing::warn!(error = %err, "skipping datagram");
                failed = failed.saturating_add(1);
            }
            Err(err) => return Err(frame_error("read failed", err)),
        }
    }

    if failed > 0 {
        tracing::warn!(failed, "some datagrams could not be decoded");
        return Ok(DATA_INVALID);
    }
    Ok(SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_with_bad_line_reports_data_invalid() {
        let input: &[u8] = b"$rf,12a,3,1a2b3c\n$rf,zz,0,\n";
        assert_eq!(decode_stream(input, OutputFormat::Pretty).unwrap(), DATA_INVALID);
    }

    #[test]
    fn clean_stream_succeeds() {
        let input: &[u8] = b"$rf,12a,3,1a2b3c\r\n\n$rf,12a,c5,\n";
        assert_eq!(decode_stream(input, OutputFormat::Pretty).unwrap(), SUCCESS);
    }
}
