//! Package dimensions codec.
//!
//! Dimensions are persisted as one JSON blob:
//! `{"length": n, "width": n, "height": n, "unit": "cm"}`. A package without
//! any dimension is stored as the explicit marker `{}`. Sparse blobs (used by
//! partial updates) carry only the supplied dimensions, but always the unit.

use serde_json::{Map, Number, Value};
use thiserror::Error;

use courier_core::{DomainError, ValueObject};

/// The only unit the blob is ever written with.
pub const DIMENSION_UNIT: &str = "cm";

/// Canonical marker for "no dimensions".
pub const EMPTY_DIMENSIONS: &str = "{}";

const LENGTH: &str = "length";
const WIDTH: &str = "width";
const HEIGHT: &str = "height";
const UNIT: &str = "unit";

// Largest f64 below which every integer is exactly representable.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Decoded package dimensions, in centimeters.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Dimensions {
    pub length: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

impl ValueObject for Dimensions {}

impl Dimensions {
    pub fn new(length: f64, width: f64, height: f64) -> Self {
        Self {
            length: Some(length),
            width: Some(width),
            height: Some(height),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.length.is_none() && self.width.is_none() && self.height.is_none()
    }

    /// Unit of the stored values; `None` when no dimension is present.
    pub fn unit(&self) -> Option<&'static str> {
        (!self.is_empty()).then_some(DIMENSION_UNIT)
    }

    /// Volume in cubic centimeters, when all three dimensions are known.
    pub fn volume(&self) -> Option<f64> {
        Some(self.length? * self.width? * self.height?)
    }

    /// Overlay the dimensions present in `patch` onto `self`.
    pub fn overlay(self, patch: Dimensions) -> Dimensions {
        Dimensions {
            length: patch.length.or(self.length),
            width: patch.width.or(self.width),
            height: patch.height.or(self.height),
        }
    }
}

/// Failure while encoding or decoding a dimensions blob.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DimensionError {
    #[error("{0} must be a finite number")]
    NonFinite(&'static str),

    #[error("{0} must not be negative")]
    Negative(&'static str),

    #[error("unsupported dimension unit '{0}' (expected {DIMENSION_UNIT})")]
    UnsupportedUnit(String),

    #[error("malformed dimensions blob: {0}")]
    Malformed(String),
}

impl DimensionError {
    /// Lift into the domain error model, tagged with the failing operation.
    ///
    /// Negative values are caller mistakes; everything else is an encoding failure.
    pub fn into_domain(self, operation: &'static str) -> DomainError {
        match self {
            DimensionError::Negative(field) => {
                DomainError::validation(operation, field, "must not be negative")
            }
            other => DomainError::encoding(operation, other.to_string()),
        }
    }
}

/// Encode the supplied dimensions only (sparse form).
///
/// Absent dimensions are omitted, not zeroed. With nothing supplied the
/// result is [`EMPTY_DIMENSIONS`].
pub fn encode_dimensions(
    length: Option<f64>,
    width: Option<f64>,
    height: Option<f64>,
) -> Result<String, DimensionError> {
    let mut map = Map::new();
    for (field, value) in [(LENGTH, length), (WIDTH, width), (HEIGHT, height)] {
        if let Some(value) = value {
            map.insert(field.to_string(), number(field, value)?);
        }
    }
    finish(map)
}

/// Encode all three dimensions (creation form).
///
/// All-zero input means "no dimensions" and yields [`EMPTY_DIMENSIONS`].
pub fn encode_complete(length: f64, width: f64, height: f64) -> Result<String, DimensionError> {
    if length == 0.0 && width == 0.0 && height == 0.0 {
        return Ok(EMPTY_DIMENSIONS.to_string());
    }
    encode_dimensions(Some(length), Some(width), Some(height))
}

pub fn encode(dimensions: &Dimensions) -> Result<String, DimensionError> {
    encode_dimensions(dimensions.length, dimensions.width, dimensions.height)
}

/// Decode a blob produced by this codec (or by older writers that omitted the unit).
pub fn decode_dimensions(blob: &str) -> Result<Dimensions, DimensionError> {
    let value: Value =
        serde_json::from_str(blob).map_err(|e| DimensionError::Malformed(e.to_string()))?;
    let Value::Object(map) = value else {
        return Err(DimensionError::Malformed("expected a JSON object".to_string()));
    };

    if let Some(key) = map
        .keys()
        .find(|key| ![LENGTH, WIDTH, HEIGHT, UNIT].contains(&key.as_str()))
    {
        return Err(DimensionError::Malformed(format!("unexpected field '{key}'")));
    }

    match map.get(UNIT) {
        None => {}
        Some(Value::String(unit)) if unit == DIMENSION_UNIT => {}
        Some(Value::String(unit)) => return Err(DimensionError::UnsupportedUnit(unit.clone())),
        Some(other) => {
            return Err(DimensionError::Malformed(format!("unit must be a string, got {other}")));
        }
    }

    Ok(Dimensions {
        length: read(&map, LENGTH)?,
        width: read(&map, WIDTH)?,
        height: read(&map, HEIGHT)?,
    })
}

/// Overlay a sparse patch blob onto a stored blob.
pub fn merge_dimensions(existing: &str, patch: &str) -> Result<String, DimensionError> {
    let merged = decode_dimensions(existing)?.overlay(decode_dimensions(patch)?);
    encode(&merged)
}

fn finish(mut map: Map<String, Value>) -> Result<String, DimensionError> {
    if map.is_empty() {
        return Ok(EMPTY_DIMENSIONS.to_string());
    }
    map.insert(UNIT.to_string(), Value::String(DIMENSION_UNIT.to_string()));
    serde_json::to_string(&Value::Object(map)).map_err(|e| DimensionError::Malformed(e.to_string()))
}

fn number(field: &'static str, value: f64) -> Result<Value, DimensionError> {
    if !value.is_finite() {
        return Err(DimensionError::NonFinite(field));
    }
    if value < 0.0 {
        return Err(DimensionError::Negative(field));
    }
    // Whole numbers are written without a fractional part: `10`, not `10.0`.
    if value.fract() == 0.0 && value < MAX_EXACT_INTEGER {
        return Ok(Value::from(value as u64));
    }
    Number::from_f64(value)
        .map(Value::Number)
        .ok_or(DimensionError::NonFinite(field))
}

fn read(map: &Map<String, Value>, field: &'static str) -> Result<Option<f64>, DimensionError> {
    match map.get(field) {
        None => Ok(None),
        Some(Value::Number(n)) => {
            let value = n
                .as_f64()
                .ok_or_else(|| DimensionError::Malformed(format!("{field} is out of range")))?;
            if value < 0.0 {
                return Err(DimensionError::Negative(field));
            }
            Ok(Some(value))
        }
        Some(other) => Err(DimensionError::Malformed(format!(
            "{field} must be a number, got {other}"
        ))),
    }
}
