use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use uwbuci_frame::tags::app_tag_name;
use uwbuci_frame::{CrcCheck, UciConfigTlv};
use uwbuci_session::DispatchResult;

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

pub fn print_result(result: &DispatchResult, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(result),
        OutputFormat::Table => {
            let mut table = new_table(vec!["TYPE", "GROUP", "OID", "STATUS", "DECODED"]);
            table.add_row(vec![
                result.message_type.name().to_string(),
                result.gid.to_string(),
                format!("0x{:02X}", result.oid),
                result.status.to_string(),
                result.decoded.to_string(),
            ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "{} {} oid=0x{:02X} status={} {}",
                result.message_type.name(),
                result.gid,
                result.oid,
                result.status,
                result.decoded
            );
        }
    }
}

#[derive(Serialize)]
struct TlvOutput {
    tag: u16,
    name: &'static str,
    len: usize,
    value: String,
}

impl From<&UciConfigTlv> for TlvOutput {
    fn from(tlv: &UciConfigTlv) -> Self {
        Self {
            tag: tlv.tag,
            name: app_tag_name(tlv.tag),
            len: tlv.len(),
            value: hex(&tlv.value),
        }
    }
}

pub fn print_tlvs(tlvs: &[UciConfigTlv], format: OutputFormat) {
    let rows: Vec<TlvOutput> = tlvs.iter().map(TlvOutput::from).collect();
    match format {
        OutputFormat::Json => print_json(&rows),
        OutputFormat::Table => {
            let mut table = new_table(vec!["TAG", "NAME", "LEN", "VALUE"]);
            for row in &rows {
                table.add_row(vec![
                    format!("0x{:02X}", row.tag),
                    row.name.to_string(),
                    row.len.to_string(),
                    row.value.clone(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for row in &rows {
                println!("0x{:02X} {} [{}] {}", row.tag, row.name, row.len, row.value);
            }
        }
    }
}

#[derive(Serialize)]
struct CrcOutput {
    crc16: String,
    trailer: Option<String>,
    valid: Option<bool>,
}

pub fn print_crc(check: &CrcCheck, format: OutputFormat) {
    let out = CrcOutput {
        crc16: format!("0x{:04X}", check.calculated),
        trailer: check.provided.map(|crc| format!("0x{crc:04X}")),
        valid: check.is_valid(),
    };
    let trailer = out.trailer.as_deref().unwrap_or("none");
    let verdict = match out.valid {
        Some(true) => "match",
        Some(false) => "MISMATCH",
        None => "-",
    };
    match format {
        OutputFormat::Json => print_json(&out),
        OutputFormat::Table => {
            let mut table = new_table(vec!["CRC16", "TRAILER", "CHECK"]);
            table.add_row(vec![out.crc16.clone(), trailer.to_string(), verdict.to_string()]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("crc16={} trailer={trailer} check={verdict}", out.crc16);
        }
    }
}

pub fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{byte:02X}")).collect()
}

/// Parse a hex string. Whitespace, `:` and `_` separators and a leading
/// `0x` are ignored.
pub fn parse_hex(input: &str) -> Result<Vec<u8>, String> {
    let trimmed = input.trim();
    let digits: Vec<char> = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed)
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':' && *c != '_')
        .collect();

    if digits.len() % 2 != 0 {
        return Err(format!("odd number of hex digits ({})", digits.len()));
    }

    digits
        .chunks(2)
        .map(|pair| {
            let hi = pair[0].to_digit(16);
            let lo = pair[1].to_digit(16);
            match (hi, lo) {
                (Some(hi), Some(lo)) => Ok((hi * 16 + lo) as u8),
                _ => Err(format!("invalid hex byte '{}{}'", pair[0], pair[1])),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_hex_accepts_separators() {
        assert_eq!(
            parse_hex("0x61 02:00_06").expect("separated hex should parse"),
            vec![0x61, 0x02, 0x00, 0x06]
        );
    }

    #[test]
    fn parse_hex_rejects_bad_input() {
        assert!(parse_hex("610").is_err());
        assert!(parse_hex("6G").is_err());
    }

    #[test]
    fn hex_is_uppercase_without_separators() {
        assert_eq!(hex(&[0x0A, 0xFF]), "0AFF");
        assert_eq!(hex(&[]), "");
    }
}
