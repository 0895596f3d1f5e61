//! Integration tests for reading LTspice output files from disk.

use ltsweep_raw::{AxisKind, Error, read_rawfile, read_step_log};
use num_complex::Complex64;

fn utf16(s: &str) -> Vec<u8> {
    s.encode_utf16().flat_map(|u| u.to_le_bytes()).collect()
}

/// Two-step AC sweep, three frequencies per step, as LTspice XVII writes it.
fn stepped_ac_rawfile() -> Vec<u8> {
    let mut bytes = utf16(
        "Title: * C:\\sim\\AM-Pro_Analysis.asc\n\
         Date: Sat Oct  4 12:00:00 2025\n\
         Plotname: AC Analysis\n\
         Flags: complex forward log stepped\n\
         No. Variables: 3\n\
         No. Points:            6\n\
         Offset:   0.0000000000000000e+000\n\
         Command: Linear Technology Corporation LTspice XVII\n\
         Variables:\n\
         \t0\tfrequency\tfrequency\n\
         \t1\tV(amp-in)\tvoltage\n\
         \t2\tV(out)\tvoltage\n\
         Binary:\n",
    );
    for step in 0..2 {
        for f in [10.0, 100.0, 1000.0] {
            let g = 1.0 / (1.0 + step as f64);
            for (re, im) in [(f, 0.0), (g, 0.0), (0.0, g)] {
                bytes.extend_from_slice(&f64::to_le_bytes(re));
                bytes.extend_from_slice(&f64::to_le_bytes(im));
            }
        }
    }
    bytes
}

#[test]
fn test_read_utf16_stepped_rawfile() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("AM-Pro_Analysis.raw");
    std::fs::write(&path, stepped_ac_rawfile()).unwrap();

    let raw = read_rawfile(&path).unwrap();
    assert_eq!(raw.header.plotname, "AC Analysis");
    assert_eq!(raw.axis_kind(), AxisKind::Frequency);
    assert_eq!(raw.step_count(), 2);
    assert_eq!(raw.trace_names(), vec!["frequency", "V(amp-in)", "V(out)"]);

    let amp_in = raw.find_trace("v(AMP-IN)").unwrap();
    assert_eq!(raw.wave(amp_in.index, 1).unwrap()[2], Complex64::new(0.5, 0.0));
    assert_eq!(raw.axis(1).unwrap(), vec![10.0, 100.0, 1000.0]);
}

#[test]
fn test_read_utf16_log_steps() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("AM-Pro_Analysis.log");
    std::fs::write(
        &path,
        utf16(
            "Circuit: * AM-Pro\r\n\r\n.step j=0.1\r\n.step j=0.5\r\n\r\n\
             Total elapsed time: 0.1 seconds.\r\n",
        ),
    )
    .unwrap();

    let steps = read_step_log(&path);
    assert_eq!(steps.len(), 2);
    assert_eq!(steps[1]["j"], 0.5);
}

#[test]
fn test_missing_rawfile_is_io_error() {
    let err = read_rawfile(std::path::Path::new("/nonexistent/x.raw")).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}
