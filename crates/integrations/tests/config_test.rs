use std::time::Duration;

use pretty_assertions::assert_eq;
use slotwise_integrations::config::parse_timeout;

#[test]
fn test_timeout_default() {
    // Missing or malformed values fall back to the 10 second default
    assert_eq!(parse_timeout(None), Duration::from_secs(10));
    assert_eq!(
        parse_timeout(Some("not-a-number".to_string())),
        Duration::from_secs(10)
    );
}

#[test]
fn test_timeout_override() {
    assert_eq!(parse_timeout(Some("3".to_string())), Duration::from_secs(3));
}
