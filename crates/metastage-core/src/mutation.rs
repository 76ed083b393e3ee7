//! Environment-scoped URN mutation.
//!
//! When a category is enabled for an environment, its URNs are rewritten to
//!
//! - seed: `"<environment>_<original urn>"` (UTF-8 bytes)
//! - digest: MD5 of the seed, lowercase hex
//! - output: `"urn:li:<category token>:<first 16 hex digits>"`
//!
//! The digest is an identity tool, not a security primitive. The category is
//! not part of the seed, so two categories sharing an original URN string in
//! one environment get the same suffix under different type prefixes.
//!
//! Without a config, or with the category disabled, the URN passes through
//! untouched.

use md5::{Digest, Md5};

use crate::config::MutationConfig;
use crate::taxonomy::EntityCategory;
use crate::urn::make_urn;

/// Hex digits kept from the digest.
pub const MUTATED_SUFFIX_LEN: usize = 16;

/// Joins environment name and original URN in the digest seed.
pub const SEED_SEPARATOR: &str = "_";

/// Why [`resolve_urn`] produced what it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    Mutated,
    /// No config exists for the environment.
    ConfigAbsent,
    CategoryDisabled,
}

/// `mutate` with the outcome attached, for callers that log decisions.
pub fn resolve_urn(
    original_urn: &str,
    environment_name: &str,
    category: EntityCategory,
    config: Option<&MutationConfig>,
) -> (String, MutationOutcome) {
    let Some(config) = config else {
        return (original_urn.to_string(), MutationOutcome::ConfigAbsent);
    };
    if !config.is_enabled(category) {
        return (original_urn.to_string(), MutationOutcome::CategoryDisabled);
    }
    let suffix = env_scoped_suffix(environment_name, original_urn);
    (make_urn(category.urn_token(), &suffix), MutationOutcome::Mutated)
}

/// Rewrite `original_urn` for `environment_name`, or return it unchanged when
/// mutation does not apply.
pub fn mutate(
    original_urn: &str,
    environment_name: &str,
    category: EntityCategory,
    config: Option<&MutationConfig>,
) -> String {
    resolve_urn(original_urn, environment_name, category, config).0
}

/// First [`MUTATED_SUFFIX_LEN`] hex digits of `md5(environment + "_" + urn)`.
pub fn env_scoped_suffix(environment_name: &str, original_urn: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(environment_name.as_bytes());
    hasher.update(SEED_SEPARATOR.as_bytes());
    hasher.update(original_urn.as_bytes());
    let digest = hasher.finalize();

    let mut out = String::with_capacity(MUTATED_SUFFIX_LEN);
    for b in digest[..MUTATED_SUFFIX_LEN / 2].iter() {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags_enabled(env: &str) -> MutationConfig {
        MutationConfig::with_categories(env, [EntityCategory::Tag])
    }

    #[test]
    fn suffix_has_expected_width_and_alphabet() {
        let s = env_scoped_suffix("dev", "urn:li:tag:PII");
        assert_eq!(s.len(), MUTATED_SUFFIX_LEN);
        assert!(s.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn known_vector_for_dev() {
        let config = tags_enabled("dev");
        assert_eq!(
            mutate("urn:li:tag:PII", "dev", EntityCategory::Tag, Some(&config)),
            "urn:li:tag:4b7df797f1e116cd"
        );
    }

    #[test]
    fn outcome_reports_pass_through_reason() {
        let config = MutationConfig::disabled("dev");
        assert_eq!(
            resolve_urn("urn:li:tag:PII", "dev", EntityCategory::Tag, None).1,
            MutationOutcome::ConfigAbsent
        );
        assert_eq!(
            resolve_urn("urn:li:tag:PII", "dev", EntityCategory::Tag, Some(&config)).1,
            MutationOutcome::CategoryDisabled
        );
    }

    #[test]
    fn category_only_changes_prefix() {
        let config = MutationConfig::with_categories(
            "dev",
            [EntityCategory::Tag, EntityCategory::Domain],
        );
        let tag = mutate("shared", "dev", EntityCategory::Tag, Some(&config));
        let domain = mutate("shared", "dev", EntityCategory::Domain, Some(&config));
        assert_eq!(tag.rsplit(':').next(), domain.rsplit(':').next());
        assert!(tag.starts_with("urn:li:tag:"));
        assert!(domain.starts_with("urn:li:domain:"));
    }

    #[test]
    fn empty_urn_still_hashes() {
        let config = tags_enabled("dev");
        let out = mutate("", "dev", EntityCategory::Tag, Some(&config));
        assert!(out.starts_with("urn:li:tag:"));
        assert_eq!(out.len(), "urn:li:tag:".len() + MUTATED_SUFFIX_LEN);
    }
}
