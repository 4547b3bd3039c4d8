//! Runtime settings, read from the environment.

use crate::tracking::{DEFAULT_TRACKING_PREFIX, is_valid_prefix};

pub const TRACKING_PREFIX_VAR: &str = "COURIER_TRACKING_PREFIX";
pub const CREATION_NOTE_VAR: &str = "COURIER_CREATION_NOTE";

pub const DEFAULT_CREATION_NOTE: &str = "Order created";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSettings {
    /// Prefix of generated tracking numbers.
    pub tracking_prefix: String,
    /// Description of the first history entry of every order.
    pub creation_note: String,
}

impl Default for OrderSettings {
    fn default() -> Self {
        Self {
            tracking_prefix: DEFAULT_TRACKING_PREFIX.to_string(),
            creation_note: DEFAULT_CREATION_NOTE.to_string(),
        }
    }
}

impl OrderSettings {
    /// Load settings from the process environment, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let tracking_prefix = match lookup(TRACKING_PREFIX_VAR) {
            Some(prefix) if is_valid_prefix(prefix.trim()) => prefix.trim().to_ascii_uppercase(),
            Some(prefix) => {
                tracing::warn!(
                    %prefix,
                    "{TRACKING_PREFIX_VAR} must be 1-8 ASCII alphanumerics; using {}",
                    defaults.tracking_prefix
                );
                defaults.tracking_prefix
            }
            None => defaults.tracking_prefix,
        };

        let creation_note = lookup(CREATION_NOTE_VAR)
            .filter(|note| !note.trim().is_empty())
            .unwrap_or(defaults.creation_note);

        Self {
            tracking_prefix,
            creation_note,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(OrderSettings::from_lookup(lookup(&[])), OrderSettings::default());
    }

    #[test]
    fn reads_overrides() {
        let settings = OrderSettings::from_lookup(lookup(&[
            (TRACKING_PREFIX_VAR, "exp"),
            (CREATION_NOTE_VAR, "Created via import"),
        ]));
        assert_eq!(settings.tracking_prefix, "EXP");
        assert_eq!(settings.creation_note, "Created via import");
    }

    #[test]
    fn invalid_prefix_falls_back() {
        let settings = OrderSettings::from_lookup(lookup(&[(TRACKING_PREFIX_VAR, "no-dashes")]));
        assert_eq!(settings.tracking_prefix, DEFAULT_TRACKING_PREFIX);
    }
}
