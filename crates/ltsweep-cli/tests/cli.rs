//! Integration tests for the ltsweep binary.

use std::path::Path;
use std::process::{Command, Output};

fn ltsweep(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ltsweep"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("failed to launch ltsweep")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Non-stepped AC rawfile with an 8-bit header and ASCII values.
fn write_ascii_rawfile(path: &Path) {
    let raw = "Title: * pickup\n\
Date: Sat Oct  4 12:00:00 2025\n\
Plotname: AC Analysis\n\
Flags: complex forward log\n\
No. Variables: 2\n\
No. Points: 2\n\
Offset: 0.0\n\
Command: Linear Technology Corporation LTspice XVII\n\
Variables:\n\
\t0\tfrequency\tfrequency\n\
\t1\tV(amp-in)\tvoltage\n\
Values:\n\
0\t1.000000000000000e+01,0.000000000000000e+00\n\
\t1.000000000000000e+01,0.000000000000000e+00\n\
1\t1.000000000000000e+02,0.000000000000000e+00\n\
\t0.000000000000000e+00,1.000000000000000e+00\n";
    std::fs::write(path, raw).unwrap();
}

#[test]
fn test_init_config_prints_defaults() {
    let output = ltsweep(&["init-config"]);
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["product_name"], "AM-Pro");
    assert_eq!(json["target_node"], "Amp-In");
    assert_eq!(json["scenarios"].as_array().unwrap().len(), 9);
    assert_eq!(json["variants"][1]["name"], "Tone");
}

#[test]
fn test_detect() {
    let dir = tempfile::tempdir().unwrap();
    let netlist = dir.path().join("pickup.cir");
    std::fs::write(&netlist, "* pickup\nR1 1 0 1k\n").unwrap();

    let output = ltsweep(&["detect", netlist.to_str().unwrap()]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "spice");

    let foreign = dir.path().join("board.net");
    std::fs::write(&foreign, "\"ExpressPCB Netlist\"\n").unwrap();
    let output = ltsweep(&["detect", foreign.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("ExpressPCB"));
}

#[test]
fn test_traces_and_extract() {
    let dir = tempfile::tempdir().unwrap();
    let raw = dir.path().join("pickup.raw");
    write_ascii_rawfile(&raw);

    let output = ltsweep(&["traces", raw.to_str().unwrap()]);
    assert!(output.status.success());
    let listing = stdout(&output);
    assert!(listing.contains("Plot: AC Analysis"));
    assert!(listing.contains("1\tV(amp-in)\tvoltage"));

    let csv = dir.path().join("pickup.csv");
    let output = ltsweep(&[
        "extract",
        raw.to_str().unwrap(),
        "--node",
        "AMP-IN",
        "-o",
        csv.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let text = std::fs::read_to_string(&csv).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "frequency_Hz,mag_dB,phase_deg,step_index");
    assert_eq!(lines[1], "10,20,0,0");
    assert_eq!(lines[2], "100,0,90,0");
}

#[test]
fn test_extract_unknown_node_fails() {
    let dir = tempfile::tempdir().unwrap();
    let raw = dir.path().join("pickup.raw");
    write_ascii_rawfile(&raw);

    let output = ltsweep(&[
        "extract",
        raw.to_str().unwrap(),
        "--node",
        "tone",
        "-o",
        dir.path().join("x.csv").to_str().unwrap(),
    ]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Available traces: frequency, V(amp-in)"));
}

#[test]
fn test_run_rejects_missing_input() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("sweep.json");
    std::fs::write(&config, r#"{"input": "missing.asc", "template": null}"#).unwrap();

    let output = ltsweep(&["run", "--config", config.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("input file not found"));
    // Nothing created next to the config
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}
