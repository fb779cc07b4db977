//! Property-based tests for service name validation and log clamping.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use proptest::prelude::*;

use dockyard_cli::domain::{OrchestratorConfig, validate_service_name};
use dockyard_common::ErrorKind;

proptest! {
    /// Every name drawn from the allow-list alphabet is accepted.
    #[test]
    fn prop_allow_list_names_accepted(name in "[A-Za-z0-9_-]{1,64}") {
        prop_assert!(validate_service_name(&name).is_ok(), "rejected {name:?}");
    }

    /// Inserting a traversal fragment anywhere makes the name unsafe.
    #[test]
    fn prop_traversal_fragments_rejected(
        prefix in "[a-z0-9]{0,10}",
        fragment in prop::sample::select(vec!["..", "/", "\\", "\0", "../", "..\\"]),
        suffix in "[a-z0-9]{0,10}",
    ) {
        let name = format!("{prefix}{fragment}{suffix}");
        let err = validate_service_name(&name).expect_err("accepted unsafe name");
        prop_assert_eq!(err.kind(), ErrorKind::SecurityError);
    }

    /// Names longer than the allow-list permits are rejected.
    #[test]
    fn prop_overlong_names_rejected(name in "[a-z]{65,100}") {
        prop_assert!(validate_service_name(&name).is_err());
    }

    /// Any requested count lands within `[1, max_lines]`.
    #[test]
    fn prop_log_count_always_in_bounds(requested in any::<Option<i64>>()) {
        let logs = OrchestratorConfig::default().logs;
        let n = logs.clamp(requested);
        prop_assert!((1..=logs.max_lines).contains(&n), "{requested:?} -> {n}");
    }
}

#[test]
fn rejection_reason_names_the_problem() {
    let err = validate_service_name("../etc").unwrap_err();
    assert!(err.to_string().contains("parent-directory"));
    let err = validate_service_name("a/b").unwrap_err();
    assert!(err.to_string().contains("path separator"));
}
