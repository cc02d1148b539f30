use uwbuci_frame::gid::range;
use uwbuci_frame::{decode_message, split_crc, GroupId};
use uwbuci_session::{ranging, DispatchTable};

use crate::cmd::{DecodeArgs, RangingLayout};
use crate::exit::{frame_error, CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{parse_hex, print_result, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let bytes = parse_hex(&args.frame).map_err(|err| CliError::new(DATA_INVALID, err))?;

    let frame = if args.crc {
        let (body, check) = split_crc(&bytes).map_err(|err| frame_error("bad frame", err))?;
        check.verify().map_err(|err| frame_error("bad frame", err))?;
        body
    } else {
        &bytes[..]
    };

    let msg = decode_message(frame, false, false).map_err(|err| frame_error("bad frame", err))?;
    let table = dispatch_table(args.ranging);
    print_result(&table.dispatch(&msg), format);
    Ok(SUCCESS)
}

fn dispatch_table(layout: Option<RangingLayout>) -> DispatchTable {
    let mut table = DispatchTable::new();
    match layout {
        None => {}
        Some(RangingLayout::Fira) => {
            table.register_notification(GroupId::Range, range::DATA, ranging::fira_range_ntf);
        }
        Some(RangingLayout::CccController) => {
            table.register_notification(
                GroupId::Range,
                range::CCC_DATA,
                ranging::ccc_controller_range_ntf,
            );
            table.register_notification(
                GroupId::Range,
                range::CCC_DATA_EXP,
                ranging::ccc_controller_exp_range_ntf,
            );
        }
        Some(RangingLayout::CccControlee) => {
            table.register_notification(
                GroupId::Range,
                range::CCC_DATA,
                ranging::ccc_controlee_range_ntf,
            );
        }
    }
    table
}

#[cfg(test)]
mod tests {
    use uwbuci_frame::{MessageType, UciStatus};
    use uwbuci_session::{Decoded, DispatchKey, Route};

    use super::*;

    #[test]
    fn ranging_layout_registers_range_notifications() {
        let key = DispatchKey::new(GroupId::Range, range::CCC_DATA);
        assert!(matches!(
            dispatch_table(None).route(MessageType::Notification, key),
            Route::Unregistered
        ));
        assert!(matches!(
            dispatch_table(Some(RangingLayout::CccControlee))
                .route(MessageType::Notification, key),
            Route::Registered(_)
        ));
    }

    #[test]
    fn default_table_decodes_session_status() {
        let frame = [0x61, 0x02, 0x00, 0x06, 0x01, 0x00, 0x00, 0x00, 0x02, 0x00];
        let msg = decode_message(&frame, false, false).expect("frame should decode");
        let result = dispatch_table(None).dispatch(&msg);
        assert_eq!(result.status, UciStatus::Ok);
        assert!(matches!(result.decoded, Decoded::SessionStatus(_)));
    }
}
