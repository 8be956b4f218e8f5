//! Unit tests for live session invite codes and policy

use std::collections::HashSet;
use std::time::Duration;

use fitsocial::live::{generate_invite_code, normalize_invite_code, MembershipPolicy, INVITE_CHARSET};
use fitsocial::storage::LiveSettings;

#[test]
fn test_alphabet_excludes_confusables() {
    for c in [b'0', b'O', b'1', b'I', b'L'] {
        assert!(!INVITE_CHARSET.contains(&c));
    }
    assert_eq!(INVITE_CHARSET.len(), 31);
}

#[test]
fn test_codes_vary() {
    let codes: HashSet<String> = (0..50).map(|_| generate_invite_code(6)).collect();
    assert!(codes.len() > 1);
    assert!(codes.iter().all(|c| c.len() == 6));
}

#[test]
fn test_custom_length() {
    assert_eq!(generate_invite_code(8).len(), 8);
    assert!(generate_invite_code(0).is_empty());
}

#[test]
fn test_normalize_matches_generated() {
    let code = generate_invite_code(6);
    assert_eq!(normalize_invite_code(&code.to_lowercase()), code);
}

#[test]
fn test_policy_defaults_match_settings() {
    let policy = MembershipPolicy::default();
    let from_settings = LiveSettings::default().membership_policy();
    assert_eq!(policy.max_attempts, from_settings.max_attempts);
    assert_eq!(policy.backoff_step, Duration::from_millis(100));
    assert_eq!(policy.backoff_step, from_settings.backoff_step);
    assert_eq!(policy.invite_window, from_settings.invite_window);
    assert_eq!(policy.invite_code_length, 6);
    assert!(!policy.enforce_status_order);
}
