use std::{
    env,
    io::{self, Write},
    process::ExitCode,
};

use psid_header::{FieldValue, PsidError, PsidHeader};
use serde_json::json;
use thiserror::Error;

const USAGE: &str = "usage:
  psid_header info <file>
  psid_header get <file> <field>
  psid_header fingerprint <file>
  psid_header normalize <in> <out>
  psid_header set <in> <out> field=value...";

#[derive(Error, Debug)]
enum CliError {
    #[error("{0}")]
    Usage(&'static str),
    #[error(transparent)]
    Psid(#[from] PsidError),
    #[error("expected field=value, got '{0}'")]
    Assignment(String),
    #[error("could not render report: {0}")]
    Report(#[from] serde_json::Error),
    #[error("could not write output: {0}")]
    Output(#[from] io::Error),
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    match run(&args, &mut io::stdout().lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Usage(usage)) => {
            eprintln!("{}", usage);
            ExitCode::from(2)
        }
        Err(CliError::Psid(e)) => {
            eprintln!("error [{}]: {}", e.code(), e);
            eprintln!("hint: {}", e.suggested_action());
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run<W: Write>(args: &[&str], out: &mut W) -> Result<(), CliError> {
    match args {
        ["info", path] => info(path, out),
        ["get", path, field] => get(path, field, out),
        ["fingerprint", path] => {
            let header = PsidHeader::from_path(path)?;
            writeln!(out, "{}", header.fingerprint())?;
            Ok(())
        }
        ["normalize", input, output] => {
            let mut header = PsidHeader::from_path(input)?;
            header.validate();
            header.write_path(output)?;
            writeln!(out, "wrote canonical v2NG header to {}", output)?;
            Ok(())
        }
        ["set", input, output, assignments @ ..] if !assignments.is_empty() => {
            set(input, output, assignments, out)
        }
        _ => Err(CliError::Usage(USAGE)),
    }
}

fn info<W: Write>(path: &str, out: &mut W) -> Result<(), CliError> {
    let header = PsidHeader::from_path(path)?;
    let report = json!({
        "header": header,
        "fileSize": header.file_size(),
        "realLoadAddress": format!("${:04X}", header.real_load_address()),
        "clock": header.clock_name(),
        "sidModel": header.sid_model_name(),
        "fingerprint": header.fingerprint(),
    });
    writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
    Ok(())
}

fn get<W: Write>(path: &str, field: &str, out: &mut W) -> Result<(), CliError> {
    let value = PsidHeader::from_path(path)?.get(field)?;
    writeln!(out, "{}", render(&value))?;
    Ok(())
}

fn set<W: Write>(
    input: &str,
    output: &str,
    assignments: &[&str],
    out: &mut W,
) -> Result<(), CliError> {
    let mut header = PsidHeader::from_path(input)?;

    let mut changes = Vec::new();
    for assignment in assignments {
        let (name, raw) = assignment
            .split_once('=')
            .ok_or_else(|| CliError::Assignment(assignment.to_string()))?;
        changes.push((name, parse_value(name, raw)));
    }

    for e in header.set(changes) {
        eprintln!("skipped: {}", e);
    }
    header.write_path(output)?;
    writeln!(out, "wrote {}", output)?;
    Ok(())
}

/// Text fields take the raw string, everything else a decimal or 0x-prefixed number
fn parse_value(name: &str, raw: &str) -> FieldValue {
    if matches!(name, "name" | "author" | "copyright") {
        return raw.into();
    }
    let parsed = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix('$')) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => raw.parse(),
    };
    parsed.map_or_else(|_| raw.into(), FieldValue::Number)
}

fn render(value: &FieldValue) -> String {
    if value.is_absent() {
        return "-".to_string();
    }
    if let Some(text) = value.as_text() {
        return text.to_string();
    }
    if let Some(bytes) = value.as_bytes() {
        return bytes.iter().map(|b| format!("{:02X}", b)).collect::<Vec<_>>().join(" ");
    }
    value
        .as_number()
        .map_or_else(String::new, |n| n.to_string())
}
