//! Plain request records handed over by the transport layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use courier_core::{AddressId, CompanyId};

use crate::model::GeoPoint;

/// Request to create a delivery order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub company_id: String,
    pub branch_id: String,
    pub client_id: String,
    /// Registered company address the parcel is collected from.
    pub company_pickup_id: String,
    pub price: f64,
    pub distance: f64,
    pub pickup_time: DateTime<Utc>,
    pub delivery_deadline: DateTime<Utc>,
    #[serde(default)]
    pub requires_signature: bool,
    #[serde(default)]
    pub delivery_notes: String,
    pub package_details: PackageDetailRequest,
    pub delivery_address: DeliveryAddressRequest,
    pub pickup_contact: PickupContactRequest,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageDetailRequest {
    pub is_fragile: bool,
    pub is_urgent: bool,
    pub weight: Option<f64>,
    pub special_instructions: String,
    /// Centimeters.
    pub length: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryAddressRequest {
    pub recipient_name: String,
    pub recipient_phone: String,
    pub address_line1: String,
    #[serde(default)]
    pub address_line2: String,
    pub city: String,
    pub state: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub location: Option<GeoPoint>,
    #[serde(default)]
    pub address_notes: String,
}

/// Contact half of the pickup address; the geographic half comes from the company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickupContactRequest {
    pub contact_name: String,
    pub contact_phone: String,
    #[serde(default)]
    pub address_notes: String,
}

/// Sparse update request.
///
/// Every field is a presence wrapper: `None` means "not provided" and leaves
/// the stored value alone, `Some(v)` writes `v` even when `v` is `0` or `""`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateOrderRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pickup_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_deadline: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requires_signature: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_notes: Option<String>,
    pub package_details: PackageDetailUpdate,
    pub delivery_address: DeliveryAddressPatch,
    pub pickup_contact: PickupContactPatch,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageDetailUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_fragile: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_urgent: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special_instructions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

impl PackageDetailUpdate {
    pub fn has_dimensions(&self) -> bool {
        self.length.is_some() || self.width.is_some() || self.height.is_some()
    }
}

/// Delivery address fields to overwrite. Used both in requests and in deltas.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryAddressPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_line1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_line2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_notes: Option<String>,
}

impl DeliveryAddressPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Pickup contact fields to overwrite. Used both in requests and in deltas.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickupContactPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_notes: Option<String>,
}

impl PickupContactPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A company's registered pickup location (owned by the company service).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickupLocation {
    pub id: AddressId,
    pub company_id: CompanyId,
    pub address_line1: String,
    #[serde(default)]
    pub address_line2: String,
    pub city: String,
    pub state: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub location: Option<GeoPoint>,
}
