use crate::cmd::EncodeArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_datagram, OutputFormat};

pub fn run(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    let frame = args.frame.build()?;
    tracing::debug!(%frame, "encoding frame");
    print_datagram(&frame.to_datagram(), format);
    Ok(SUCCESS)
}
