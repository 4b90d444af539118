//! Property-based tests for the Password Safe client.
//!
//! Covers:
//! - Linear backoff delay computation
//! - Configuration validation reporting every missing value
//! - Client secret non-exposure in Debug output

use beyondtrust_client::{BeyondTrustError, ClientConfig, RetryConfig, RetryPolicy};
use proptest::prelude::*;
use std::time::Duration;

const FIELD_NAMES: [&str; 5] = [
    "token_url",
    "sign_in_url",
    "client_id",
    "client_secret",
    "base_url",
];

fn valid_values() -> [String; 5] {
    [
        "https://vault.example.com/Auth/Connect/Token".to_string(),
        "https://vault.example.com/Auth/SignAppin".to_string(),
        "automation".to_string(),
        "s3cret".to_string(),
        "https://vault.example.com/api/public/v3".to_string(),
    ]
}

// Strategy for backoff bases in a test-friendly range
fn backoff_base_strategy() -> impl Strategy<Value = Duration> {
    (1u64..=500).prop_map(Duration::from_millis)
}

// Strategy for client secrets that cannot collide with other config text
fn secret_strategy() -> impl Strategy<Value = String> {
    "[0-9a-f]{32}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// *For any* backoff base and attempt number, the computed delay
    /// SHALL equal `base × attempt` exactly.
    #[test]
    fn prop_backoff_delay_is_linear(
        base in backoff_base_strategy(),
        attempt in 1u32..=10,
    ) {
        let policy = RetryPolicy::new(RetryConfig::default().with_backoff_base(base));
        prop_assert_eq!(policy.delay_for_attempt(attempt), base * attempt);
    }

    /// Later attempts never wait less than earlier ones.
    #[test]
    fn prop_backoff_delay_is_monotonic(
        base in backoff_base_strategy(),
        attempt in 1u32..=9,
    ) {
        let policy = RetryPolicy::new(RetryConfig::default().with_backoff_base(base));
        prop_assert!(policy.delay_for_attempt(attempt + 1) >= policy.delay_for_attempt(attempt));
    }

    /// *For any* subset of required values left empty, construction
    /// SHALL fail with exactly that subset, in declaration order.
    #[test]
    fn prop_missing_values_all_reported(
        empty in any::<[bool; 5]>().prop_filter("at least one empty", |flags| flags.contains(&true)),
    ) {
        let mut values = valid_values();
        let mut expected = Vec::new();
        for (i, is_empty) in empty.iter().enumerate() {
            if *is_empty {
                values[i].clear();
                expected.push(FIELD_NAMES[i].to_string());
            }
        }
        let [token_url, sign_in_url, client_id, client_secret, base_url] = values;

        let err = ClientConfig::new(token_url, sign_in_url, client_id, client_secret, base_url)
            .unwrap_err();

        match err {
            BeyondTrustError::MissingConfig(names) => prop_assert_eq!(names, expected),
            other => prop_assert!(false, "expected MissingConfig, got {}", other),
        }
    }

    /// *For any* client secret, the configuration's Debug output SHALL
    /// NOT expose the secret value.
    #[test]
    fn prop_client_secret_not_exposed_in_debug(secret in secret_strategy()) {
        let [token_url, sign_in_url, client_id, _, base_url] = valid_values();
        let config = ClientConfig::new(token_url, sign_in_url, client_id, secret.clone(), base_url)
            .unwrap();

        let debug_output = format!("{config:?}");

        prop_assert!(
            !debug_output.contains(&secret),
            "Debug output should not contain the client secret"
        );
        prop_assert!(
            debug_output.contains("REDACTED"),
            "Debug output should show the redaction marker"
        );
    }

    /// *For any* colon-free string, URL validation SHALL reject it.
    #[test]
    fn prop_unparseable_endpoint_rejected(bad_url in "[a-z ]{3,20}") {
        let [_, sign_in_url, client_id, client_secret, base_url] = valid_values();
        let result = ClientConfig::new(bad_url, sign_in_url, client_id, client_secret, base_url);

        prop_assert!(matches!(result, Err(BeyondTrustError::InvalidConfig(_))));
    }
}

/// All five names are reported when nothing is configured.
#[test]
fn test_fully_empty_config_reports_every_name() {
    let err = ClientConfig::new("", "", "", "", "").unwrap_err();
    match err {
        BeyondTrustError::MissingConfig(names) => {
            assert_eq!(names, FIELD_NAMES.map(String::from).to_vec());
        }
        other => panic!("expected MissingConfig, got {other}"),
    }
}

/// Default retry settings reproduce the documented 2s/4s/6s ramp.
#[test]
fn test_default_backoff_ramp() {
    let policy = RetryPolicy::new(RetryConfig::default());
    assert_eq!(policy.delay_for_attempt(1), Duration::from_secs(2));
    assert_eq!(policy.delay_for_attempt(2), Duration::from_secs(4));
    assert_eq!(policy.delay_for_attempt(3), Duration::from_secs(6));
    assert_eq!(policy.max_attempts(), 3);
}

/// Error classifications never overlap.
#[test]
fn test_error_classifications_are_disjoint() {
    let errors = [
        BeyondTrustError::MissingConfig(vec!["token_url".to_string()]),
        BeyondTrustError::invalid_config("bad"),
        BeyondTrustError::MissingSessionCookie {
            cookie: "ASP.NET_SessionId".to_string(),
        },
        BeyondTrustError::FolderNotFound("Finance".to_string()),
        BeyondTrustError::MissingFolderId("Finance".to_string()),
        BeyondTrustError::UnexpectedStatus {
            status: reqwest::StatusCode::BAD_GATEWAY,
            body: String::new(),
        },
    ];

    for error in &errors {
        let classes = [
            error.is_retryable(),
            error.is_auth_failure(),
            error.is_not_found(),
        ];
        assert!(
            classes.iter().filter(|flag| **flag).count() <= 1,
            "{error} classified into more than one category"
        );
    }
}
