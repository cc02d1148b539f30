mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "uwbuci", version, about = "UWB Command Interface toolkit")]
struct Cli {
    /// Output format (default: table on a terminal, json otherwise).
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "warn", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    match cmd::run(cli.command, format) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::Profile;

    #[test]
    fn parses_decode_with_crc() {
        let cli = Cli::try_parse_from(["uwbuci", "decode", "6102000600", "--crc"])
            .expect("decode args should parse");
        let Command::Decode(args) = cli.command else {
            panic!("expected decode");
        };
        assert!(args.crc);
        assert_eq!(args.ranging, None);
    }

    #[test]
    fn parses_simulate_with_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "uwbuci",
            "simulate",
            "--profile",
            "ccc",
            "--count",
            "3",
            "--format",
            "json",
            "--log-level",
            "debug",
        ])
        .expect("simulate args should parse");

        assert_eq!(cli.format, Some(OutputFormat::Json));
        assert_eq!(cli.log_level, LogLevel::Debug);
        let Command::Simulate(args) = cli.command else {
            panic!("expected simulate");
        };
        assert_eq!(args.profile, Profile::Ccc);
        assert_eq!(args.count, 3);
    }

    #[test]
    fn rejects_zero_rounds() {
        let err = Cli::try_parse_from(["uwbuci", "simulate", "--count", "0"])
            .expect_err("zero rounds should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn rejects_unknown_profile() {
        let err = Cli::try_parse_from(["uwbuci", "tlv", "--profile", "dw3000"])
            .expect_err("unknown profile should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }
}
