//! Tracking numbers: `<PREFIX>-<YYMMDD>-<NNNN>`.

use core::str::FromStr;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use courier_core::{DomainError, ValueObject};

/// Default tracking number prefix.
pub const DEFAULT_TRACKING_PREFIX: &str = "DEL";

// Column width of the persisted tracking number.
const MAX_LEN: usize = 50;

/// Human-facing order reference, printed on labels and encoded in the QR code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TrackingNumber(String);

impl ValueObject for TrackingNumber {}

impl TrackingNumber {
    /// Generate a fresh number for an order created at `created_at`.
    pub fn generate<R: Rng>(prefix: &str, created_at: DateTime<Utc>, rng: &mut R) -> Self {
        let serial: u16 = rng.random_range(0..10_000);
        Self::compose(prefix, created_at, serial)
    }

    /// Deterministic form of [`TrackingNumber::generate`].
    pub fn compose(prefix: &str, created_at: DateTime<Utc>, serial: u16) -> Self {
        Self(format!(
            "{}-{}-{:04}",
            prefix.to_ascii_uppercase(),
            created_at.format("%y%m%d"),
            serial % 10_000
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for TrackingNumber {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TrackingNumber {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim().to_ascii_uppercase();
        if value.is_empty() {
            return Err(DomainError::validation(
                "ParseTrackingNumber",
                "tracking_number",
                "is required",
            ));
        }
        if value.len() > MAX_LEN
            || !value.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(DomainError::validation(
                "ParseTrackingNumber",
                "tracking_number",
                format!("'{s}' is not a valid tracking number"),
            ));
        }
        Ok(Self(value))
    }
}

impl TryFrom<String> for TrackingNumber {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TrackingNumber> for String {
    fn from(value: TrackingNumber) -> Self {
        value.0
    }
}

/// Check a configured prefix: 1 to 8 ASCII alphanumerics.
pub fn is_valid_prefix(prefix: &str) -> bool {
    (1..=8).contains(&prefix.len()) && prefix.chars().all(|c| c.is_ascii_alphanumeric())
}
