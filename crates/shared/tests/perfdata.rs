#![allow(missing_docs)]

use shared::{PerfData, PerfValue};

#[test]
fn integer_entry() {
    let entry = PerfData::integer("vms", 3);
    assert_eq!(entry.to_string(), "vms=3");
}

#[test]
fn entry_with_unit() {
    let entry = PerfData::integer("duration", 42).with_unit("s");
    assert_eq!(entry.to_string(), "duration=42s");
}

#[test]
fn float_has_two_decimals() {
    assert_eq!(PerfValue::Float(100.0).to_string(), "100.00");
    assert_eq!(PerfValue::Float(0.125).to_string(), "0.12");
}

#[test]
fn join_entries() {
    let line = PerfData::join(&[
        PerfData::integer("vms", 0),
        PerfData::integer("warnings", 0),
        PerfData::float("average_rate", 1.5),
    ]);
    assert_eq!(line, "vms=0; warnings=0; average_rate=1.50");
}

#[test]
fn join_nothing() {
    assert_eq!(PerfData::join(&[]), "");
}
