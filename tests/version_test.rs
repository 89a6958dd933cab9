//! Integration tests for version precedence and operators.

use changelog_core::version::{compare, parse_version};
use changelog_core::{Operator, VersionError};
use proptest::prelude::*;

#[test]
fn test_numeric_component_comparison() {
    assert!(compare("1.9.0", "1.10.0", Operator::Lt).unwrap());
    assert!(compare("0.10.0", "0.9.9", Operator::Gt).unwrap());
    assert!(compare("1.0.10", "1.0.9", Operator::Ge).unwrap());
}

#[test]
fn test_prerelease_below_release() {
    assert!(compare("1.0.0-alpha", "1.0.0", Operator::Lt).unwrap());
    assert!(compare("1.0.0", "1.0.0-rc.99", Operator::Gt).unwrap());
}

#[test]
fn test_fewer_prerelease_identifiers_sort_lower() {
    assert!(compare("1.0.0-alpha", "1.0.0-alpha.1", Operator::Lt).unwrap());
}

#[test]
fn test_semver_spec_precedence_chain() {
    // Example ordering from the Semantic Versioning 2.0.0 document.
    let chain = [
        "1.0.0-alpha",
        "1.0.0-alpha.1",
        "1.0.0-alpha.beta",
        "1.0.0-beta",
        "1.0.0-beta.2",
        "1.0.0-beta.11",
        "1.0.0-rc.1",
        "1.0.0",
    ];

    for pair in chain.windows(2) {
        assert!(
            compare(pair[0], pair[1], Operator::Lt).unwrap(),
            "{} should sort before {}",
            pair[0],
            pair[1]
        );
    }
}

#[test]
fn test_malformed_versions_fail() {
    for bad in ["1", "1.0", "1.0.0.0", "01.0.0", "latest", "1.0.0-"] {
        assert!(
            matches!(
                compare(bad, "1.0.0", Operator::Eq),
                Err(VersionError::ParseFailed(..))
            ),
            "{} should be rejected",
            bad
        );
    }
}

fn version_strategy() -> impl Strategy<Value = String> {
    (
        0u64..20,
        0u64..20,
        0u64..20,
        prop::option::of("(alpha|beta|rc)(\\.[1-9][0-9]?)?"),
    )
        .prop_map(|(major, minor, patch, pre)| match pre {
            Some(pre) => format!("{}.{}.{}-{}", major, minor, patch, pre),
            None => format!("{}.{}.{}", major, minor, patch),
        })
}

proptest! {
    /// Exactly one of <, ==, > holds for any pair.
    #[test]
    fn trichotomy(a in version_strategy(), b in version_strategy()) {
        let lt = compare(&a, &b, Operator::Lt).unwrap();
        let eq = compare(&a, &b, Operator::Eq).unwrap();
        let gt = compare(&a, &b, Operator::Gt).unwrap();
        prop_assert_eq!(u8::from(lt) + u8::from(eq) + u8::from(gt), 1);
    }

    /// Inclusive operators agree with their strict counterparts.
    #[test]
    fn inclusive_operators_consistent(a in version_strategy(), b in version_strategy()) {
        let eq = compare(&a, &b, Operator::Eq).unwrap();
        prop_assert_eq!(
            compare(&a, &b, Operator::Le).unwrap(),
            compare(&a, &b, Operator::Lt).unwrap() || eq
        );
        prop_assert_eq!(
            compare(&a, &b, Operator::Ge).unwrap(),
            compare(&a, &b, Operator::Gt).unwrap() || eq
        );
        prop_assert_eq!(compare(&a, &b, Operator::Ne).unwrap(), !eq);
    }

    /// Build metadata never changes precedence.
    #[test]
    fn build_metadata_ignored(a in version_strategy(), build in "[a-z0-9]{1,8}") {
        let with_build = format!("{}+{}", a, build);
        prop_assert!(compare(&a, &with_build, Operator::Eq).unwrap());
        prop_assert!(parse_version(&with_build).is_ok());
    }
}
