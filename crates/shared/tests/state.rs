#![allow(missing_docs)]

use shared::{PluginOutput, ServiceState};

#[test]
pub fn exit_codes() {
    assert_eq!(ServiceState::Ok.exit_code(), 0);
    assert_eq!(ServiceState::Warning.exit_code(), 1);
    assert_eq!(ServiceState::Critical.exit_code(), 2);
    assert_eq!(ServiceState::Unknown.exit_code(), 3);
}

#[test]
pub fn labels() {
    assert_eq!(ServiceState::Ok.to_string(), "OK");
    assert_eq!(ServiceState::Warning.to_string(), "WARNING");
    assert_eq!(ServiceState::Critical.to_string(), "CRITICAL");
    assert_eq!(ServiceState::Unknown.to_string(), "UNKNOWN");
}

#[test]
pub fn output_uses_state_label() {
    let output = PluginOutput::from_display(ServiceState::Warning, "slow");
    assert_eq!(output.text, "WARNING: slow");
    assert_eq!(output.state.exit_code(), 1);
}
