use crate::cmd::{load_params, TlvArgs};
use crate::exit::{CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{print_tlvs, OutputFormat};

pub fn run(args: TlvArgs, format: OutputFormat) -> CliResult<i32> {
    let params = load_params(args.profile, args.params.as_deref())?;
    let tlvs = params
        .app_config_tlvs()
        .map_err(|err| CliError::new(DATA_INVALID, format!("incomplete configuration: {err}")))?;
    tracing::debug!(
        session_id = params.session_id(),
        count = tlvs.len(),
        "app config built"
    );
    print_tlvs(&tlvs, format);
    Ok(SUCCESS)
}
