use uwbuci_frame::check_frame;

use crate::cmd::CrcArgs;
use crate::exit::{frame_error, CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{parse_hex, print_crc, OutputFormat};

pub fn run(args: CrcArgs, format: OutputFormat) -> CliResult<i32> {
    let frame = parse_hex(&args.frame).map_err(|err| CliError::new(DATA_INVALID, err))?;
    let check = check_frame(&frame).map_err(|err| frame_error("cannot classify frame", err))?;
    print_crc(&check, format);
    Ok(SUCCESS)
}
