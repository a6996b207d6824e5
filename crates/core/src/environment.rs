//! Deployment-stage classification.
//!
//! Every security decision downstream is keyed off one canonical [`Environment`]
//! tag derived from a free-form deployment-stage string.

use serde::{Deserialize, Serialize};

/// Canonical deployment environment.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Local,
    Test,
    Dev,
    Qa,
    Preview,
    Production,
}

/// Accepted spellings, matched after trimming and lowercasing.
const SYNONYMS: &[(&str, Environment)] = &[
    ("local", Environment::Local),
    ("localhost", Environment::Local),
    ("test", Environment::Test),
    ("testing", Environment::Test),
    ("dev", Environment::Dev),
    ("develop", Environment::Dev),
    ("development", Environment::Dev),
    ("qa", Environment::Qa),
    ("stage", Environment::Qa),
    ("staging", Environment::Qa),
    ("preview", Environment::Preview),
    ("prod", Environment::Production),
    ("production", Environment::Production),
];

impl Environment {
    pub const ALL: [Environment; 6] = [
        Environment::Local,
        Environment::Test,
        Environment::Dev,
        Environment::Qa,
        Environment::Preview,
        Environment::Production,
    ];

    /// Map a raw deployment-stage string to its canonical tag.
    ///
    /// Missing, blank or unrecognized input yields [`Environment::Local`]. Never fails.
    pub fn classify(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::Local;
        };
        let needle = raw.trim().to_ascii_lowercase();

        SYNONYMS
            .iter()
            .find(|(name, _)| *name == needle)
            .map(|(_, env)| *env)
            .unwrap_or(Self::Local)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Test => "test",
            Self::Dev => "dev",
            Self::Qa => "qa",
            Self::Preview => "preview",
            Self::Production => "production",
        }
    }

    /// `local` and `test` are the only environments allowed to relax secrets,
    /// skip base-URL validation and run without internal-token enforcement.
    pub fn is_relaxed(&self) -> bool {
        matches!(self, Self::Local | Self::Test)
    }
}

impl core::fmt::Display for Environment {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn canonical_names_round_trip() {
        for env in Environment::ALL {
            assert_eq!(Environment::classify(Some(env.as_str())), env);
        }
    }

    #[test]
    fn synonyms_map_to_canonical_tags() {
        assert_eq!(Environment::classify(Some("development")), Environment::Dev);
        assert_eq!(Environment::classify(Some("prod")), Environment::Production);
        assert_eq!(Environment::classify(Some("testing")), Environment::Test);
        assert_eq!(Environment::classify(Some("Staging")), Environment::Qa);
        assert_eq!(Environment::classify(Some("  PREVIEW \n")), Environment::Preview);
    }

    #[test]
    fn missing_or_unknown_is_local() {
        assert_eq!(Environment::classify(None), Environment::Local);
        assert_eq!(Environment::classify(Some("")), Environment::Local);
        assert_eq!(Environment::classify(Some("   ")), Environment::Local);
        assert_eq!(Environment::classify(Some("moon-base")), Environment::Local);
    }

    #[test]
    fn only_local_and_test_are_relaxed() {
        let relaxed: Vec<_> = Environment::ALL.into_iter().filter(|e| e.is_relaxed()).collect();
        assert_eq!(relaxed, vec![Environment::Local, Environment::Test]);
    }

    proptest! {
        /// Property: classification ignores ASCII case for every known spelling.
        #[test]
        fn classification_is_case_insensitive(
            idx in 0..SYNONYMS.len(),
            mask in prop::collection::vec(any::<bool>(), 16)
        ) {
            let (name, expected) = SYNONYMS[idx];
            let mixed: String = name
                .chars()
                .zip(mask.iter().cycle())
                .map(|(c, upper)| if *upper { c.to_ascii_uppercase() } else { c })
                .collect();
            prop_assert_eq!(Environment::classify(Some(&mixed)), expected);
        }

        /// Property: any input yields one of the six tags; unknown input yields local.
        #[test]
        fn classification_is_total(raw in ".*") {
            let env = Environment::classify(Some(&raw));
            prop_assert!(Environment::ALL.contains(&env));
            let known = SYNONYMS
                .iter()
                .any(|(name, _)| *name == raw.trim().to_ascii_lowercase());
            if !known {
                prop_assert_eq!(env, Environment::Local);
            }
        }
    }
}
