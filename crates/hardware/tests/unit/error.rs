//! Error Display Tests.

use fsim_core::SimError;
use fsim_core::common::TraceFormatKind;
use pretty_assertions::assert_eq;

#[test]
fn trace_format_names_line_and_text() {
    let err = SimError::TraceFormat {
        line: 4,
        text: "0 W".into(),
        kind: TraceFormatKind::WrongTokenCount(2),
    };
    assert_eq!(err.to_string(), "trace line 4: expected 3 fields, found 2 in `0 W`");
    assert!(err.is_trace_format());
}

#[test]
fn io_keeps_context_and_source() {
    let err = SimError::io(
        "opening trace t.txt",
        std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
    );
    assert_eq!(err.to_string(), "opening trace t.txt: missing");
    assert!(std::error::Error::source(&err).is_some());
    assert!(!err.is_trace_format());
}

#[test]
fn config_message() {
    let err = SimError::Config("baseline and fix lists must have same length (2 vs 1)".into());
    assert_eq!(
        err.to_string(),
        "configuration error: baseline and fix lists must have same length (2 vs 1)"
    );
}

#[test]
fn kind_messages() {
    assert_eq!(
        TraceFormatKind::InvalidCore("-1".into()).to_string(),
        "invalid core id `-1`"
    );
    assert_eq!(
        TraceFormatKind::InvalidOperation("X".into()).to_string(),
        "unrecognized operation `X`"
    );
    assert_eq!(
        TraceFormatKind::InvalidAddress("0xZZ".into()).to_string(),
        "unparsable address `0xZZ`"
    );
}
