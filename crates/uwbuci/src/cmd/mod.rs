use std::path::{Path, PathBuf};

use clap::{Args, Subcommand, ValueEnum};
use uwbuci_session::{
    device_role, device_type, CccSessionParams, FiraSessionParams, SessionParams,
};

use crate::exit::{io_error, CliError, CliResult, DATA_INVALID};
use crate::output::OutputFormat;

pub mod crc;
pub mod decode;
pub mod simulate;
pub mod tlv;
pub mod version;

/// Session id used when no parameter file names one.
pub const DEMO_SESSION_ID: u32 = 0x0000_2A01;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decode and dispatch one UCI frame.
    Decode(DecodeArgs),
    /// Compute the CRC-16/XMODEM of a frame and classify its trailer.
    Crc(CrcArgs),
    /// Print the app-config TLVs a session would send.
    Tlv(TlvArgs),
    /// Run a full session lifecycle against a scripted device.
    Simulate(SimulateArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Decode(args) => decode::run(args, format),
        Command::Crc(args) => crc::run(args, format),
        Command::Tlv(args) => tlv::run(args, format),
        Command::Simulate(args) => simulate::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Profile {
    Fira,
    Ccc,
}

/// Layout used to decode RANGE notifications.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum RangingLayout {
    Fira,
    CccController,
    CccControlee,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Frame bytes as hex (header, payload and optional CRC).
    pub frame: String,
    /// The frame ends with a CRC-16 trailer to strip and verify.
    #[arg(long)]
    pub crc: bool,
    /// Register a ranging notification decoder before dispatching.
    #[arg(long, value_name = "LAYOUT")]
    pub ranging: Option<RangingLayout>,
}

#[derive(Args, Debug)]
pub struct CrcArgs {
    /// Frame bytes as hex.
    pub frame: String,
}

#[derive(Args, Debug)]
pub struct TlvArgs {
    /// Session profile.
    #[arg(long, default_value = "fira")]
    pub profile: Profile,
    /// JSON file with the fields that differ from the profile default.
    #[arg(long, value_name = "FILE")]
    pub params: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Session profile.
    #[arg(long, default_value = "fira")]
    pub profile: Profile,
    /// JSON file with the fields that differ from the profile default.
    #[arg(long, value_name = "FILE")]
    pub params: Option<PathBuf>,
    /// Number of ranging rounds before the session is stopped.
    #[arg(long, default_value = "5", value_parser = clap::value_parser!(u32).range(1..=1000))]
    pub count: u32,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Load session parameters for `profile`, from `path` when given.
///
/// Without a file, a controller/initiator session is built; FiRa sessions
/// get a device address and one destination so the TLV diff is complete.
pub fn load_params(profile: Profile, path: Option<&Path>) -> CliResult<SessionParams> {
    let Some(path) = path else {
        return Ok(match profile {
            Profile::Fira => {
                let mut params = FiraSessionParams::new(
                    DEMO_SESSION_ID,
                    device_type::CONTROLLER,
                    device_role::INITIATOR,
                    0x0001,
                );
                params.set_dst_addresses(vec![0x0002]);
                params.into()
            }
            Profile::Ccc => CccSessionParams::new(
                DEMO_SESSION_ID,
                device_type::CONTROLLER,
                device_role::INITIATOR,
                1,
            )
            .into(),
        });
    };

    let text = std::fs::read_to_string(path)
        .map_err(|err| io_error(&format!("cannot read {}", path.display()), err))?;
    let parsed = match profile {
        Profile::Fira => serde_json::from_str::<FiraSessionParams>(&text).map(SessionParams::from),
        Profile::Ccc => serde_json::from_str::<CccSessionParams>(&text).map(SessionParams::from),
    };
    parsed.map_err(|err| {
        CliError::new(
            DATA_INVALID,
            format!("invalid parameters in {}: {err}", path.display()),
        )
    })
}
