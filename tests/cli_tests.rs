#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::logs::{capture_logs, lines_with, CaptureWriter};
use nf_dispatch::cli::{run_with_transport, Cli};
use nf_dispatch::error::{ConfigError, NfError};
use nf_dispatch::ids::NfId;
use nf_dispatch::transport::json_lines::{JsonLinesRx, JsonLinesTx};
use std::io::{Cursor, Write};
use std::path::Path;

const CHAIN: &str = r#"
nfs:
  - id: 1
    name: frontend
    n_threads: 1
  - id: 2
    name: currencyservice
    n_threads: 2
  - id: 3
    name: paymentservice
    n_threads: 2
routes:
  - id: 0
    hops: [1, 2]
"#;

const SUPPORTED_REQUEST: &str =
    r#"{"route_id":0,"hop_count":1,"caller_fn":1,"operation_name":"GetSupportedCurrencies"}"#;

fn write_config(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn cli(nf_id: u8, config: &Path) -> Cli {
    Cli {
        nf_id,
        config: config.to_path_buf(),
        currency_data: None,
    }
}

/// Transport whose input is `input` and whose output lands in the returned writer.
fn transport(
    input: &str,
) -> (
    JsonLinesRx<Cursor<String>>,
    JsonLinesTx<CaptureWriter>,
    CaptureWriter,
) {
    let out = CaptureWriter::default();
    (
        JsonLinesRx::new(Cursor::new(input.to_string())),
        JsonLinesTx::new(out.clone()),
        out,
    )
}

#[test]
fn test_serves_transport_until_eof() {
    let config = write_config(CHAIN);
    let (rx, tx, out) = transport(&format!("{SUPPORTED_REQUEST}\n"));

    run_with_transport(&cli(2, config.path()), rx, tx).unwrap();

    let output = out.contents();
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains(r#""destination":1"#));
    assert!(lines[0].contains(r#"["EUR","USD","JPY","CAD"]"#));
}

#[test]
fn test_unknown_nf_id_fails_before_start() {
    let config = write_config(CHAIN);
    let (rx, tx, out) = transport(&format!("{SUPPORTED_REQUEST}\n"));

    let err = run_with_transport(&cli(9, config.path()), rx, tx).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<NfError>(),
        Some(NfError::UnknownNf { id: NfId(9) })
    ));
    assert!(out.contents().is_empty());
}

#[test]
fn test_missing_config_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let (rx, tx, _out) = transport("");

    let err = run_with_transport(&cli(2, &dir.path().join("nf.yaml")), rx, tx).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::Read { .. })
    ));
    assert!(format!("{err:#}").contains("Failed to load shared configuration"));
}

#[test]
fn test_invalid_config_yaml_fails() {
    let config = write_config("nfs: [this is: not valid");
    let (rx, tx, _out) = transport("");

    let err = run_with_transport(&cli(2, config.path()), rx, tx).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::Parse(_))
    ));
}

#[test]
fn test_missing_currency_data_fails() {
    let config = write_config(CHAIN);
    let dir = tempfile::tempdir().unwrap();
    let (rx, tx, _out) = transport("");
    let mut cli = cli(2, config.path());
    cli.currency_data = Some(dir.path().join("rates.json"));

    let err = run_with_transport(&cli, rx, tx).unwrap_err();

    assert!(format!("{err:#}").contains("Failed to load currency data"));
}

#[test]
fn test_name_mismatch_is_logged_and_not_fatal() {
    let config = write_config(CHAIN);
    let (rx, tx, out) = transport(&format!("{SUPPORTED_REQUEST}\n"));

    let (result, logs) = capture_logs(|| run_with_transport(&cli(3, config.path()), rx, tx));

    result.unwrap();
    let mismatch = lines_with(&logs, "does not match this service");
    assert_eq!(mismatch.len(), 1);
    assert!(mismatch[0].contains("ERROR"));
    assert!(mismatch[0].contains("paymentservice"));
    assert_eq!(out.contents().lines().count(), 1);
}
