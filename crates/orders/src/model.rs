//! The order aggregate and the sub-records it owns.
//!
//! An [`Order`] owns exactly one [`Detail`], [`PackageDetail`],
//! [`DeliveryAddress`], [`PickupAddress`] and [`Tracking`], plus the
//! append-only [`StatusHistoryEntry`] sequence. `status` and `tracking` are
//! caches of the latest history entry; they are only written by the
//! lifecycle `apply` path and by [`Order::rehydrate`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use courier_core::{
    AggregateRoot, BranchId, CompanyId, DomainError, DomainResult, Entity, HistoryEntryId,
    OrderId, UserId, ValueObject,
};

use crate::dimensions::{self, DimensionError, Dimensions};
use crate::status::OrderStatus;
use crate::tracking::TrackingNumber;

/// Latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl ValueObject for GeoPoint {}

impl GeoPoint {
    pub fn validate(&self, operation: &'static str) -> DomainResult<()> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(DomainError::validation(
                operation,
                "latitude",
                "must be between -90 and 90",
            ));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(DomainError::validation(
                operation,
                "longitude",
                "must be between -180 and 180",
            ));
        }
        Ok(())
    }
}

/// Commercial and scheduling terms of the delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detail {
    /// Price in the company's currency.
    pub price: f64,
    /// Route distance in kilometers.
    pub distance: f64,
    pub pickup_time: DateTime<Utc>,
    pub delivery_deadline: DateTime<Utc>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub requires_signature: bool,
    pub delivery_notes: String,
}

impl Detail {
    pub fn validate(&self, operation: &'static str) -> DomainResult<()> {
        ensure_amount(operation, "price", self.price)?;
        ensure_amount(operation, "distance", self.distance)?;
        ensure_schedule(operation, self.pickup_time, self.delivery_deadline)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageDetail {
    pub is_fragile: bool,
    pub is_urgent: bool,
    /// Kilograms.
    pub weight: Option<f64>,
    /// Serialized dimensions blob, see [`crate::dimensions`].
    pub dimensions: String,
    pub special_instructions: String,
}

impl PackageDetail {
    pub fn decoded_dimensions(&self) -> Result<Dimensions, DimensionError> {
        dimensions::decode_dimensions(&self.dimensions)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryAddress {
    pub recipient_name: String,
    pub recipient_phone: String,
    pub address_line1: String,
    pub address_line2: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub location: Option<GeoPoint>,
    pub address_notes: String,
}

impl ValueObject for DeliveryAddress {}

/// Pickup address of an order.
///
/// The contact half (`contact_*`, `address_notes`) comes from the order
/// request. The geographic half is a copy of the company's registered pickup
/// location taken at creation time and is never edited through the order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickupAddress {
    pub contact_name: String,
    pub contact_phone: String,
    pub address_line1: String,
    pub address_line2: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub location: Option<GeoPoint>,
    pub address_notes: String,
}

impl ValueObject for PickupAddress {}

/// Immutable record of a past status value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusHistoryEntry {
    pub id: HistoryEntryId,
    pub status: OrderStatus,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl Entity for StatusHistoryEntry {
    type Id = HistoryEntryId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Current position in the lifecycle, as shown to trackers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tracking {
    pub current_status: OrderStatus,
    pub last_updated: DateTime<Utc>,
}

/// Aggregate root: delivery Order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
    pub(crate) id: OrderId,
    pub(crate) company_id: CompanyId,
    pub(crate) branch_id: BranchId,
    pub(crate) client_id: UserId,
    pub(crate) driver_id: Option<UserId>,
    pub(crate) tracking_number: TrackingNumber,
    pub(crate) status: OrderStatus,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
    pub(crate) detail: Detail,
    pub(crate) package_detail: PackageDetail,
    pub(crate) delivery_address: DeliveryAddress,
    pub(crate) pickup_address: PickupAddress,
    pub(crate) tracking: Tracking,
    pub(crate) status_history: Vec<StatusHistoryEntry>,
    /// Number of status changes, i.e. the history length.
    #[serde(skip)]
    pub(crate) version: u64,
}

impl Order {
    pub fn company_id(&self) -> CompanyId {
        self.company_id
    }

    pub fn branch_id(&self) -> BranchId {
        self.branch_id
    }

    pub fn client_id(&self) -> UserId {
        self.client_id
    }

    pub fn driver_id(&self) -> Option<UserId> {
        self.driver_id
    }

    pub fn tracking_number(&self) -> &TrackingNumber {
        &self.tracking_number
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn detail(&self) -> &Detail {
        &self.detail
    }

    pub fn package_detail(&self) -> &PackageDetail {
        &self.package_detail
    }

    pub fn delivery_address(&self) -> &DeliveryAddress {
        &self.delivery_address
    }

    pub fn pickup_address(&self) -> &PickupAddress {
        &self.pickup_address
    }

    pub fn tracking(&self) -> Tracking {
        self.tracking
    }

    pub fn status_history(&self) -> &[StatusHistoryEntry] {
        &self.status_history
    }

    pub fn latest_entry(&self) -> Option<&StatusHistoryEntry> {
        latest_entry(&self.status_history)
    }

    /// Payload of the order's QR code.
    pub fn qr_payload(&self) -> &str {
        self.tracking_number.as_str()
    }

    pub fn is_editable(&self) -> bool {
        self.status.allows_field_updates()
    }

    pub(crate) fn ensure_editable(&self, operation: &'static str) -> DomainResult<()> {
        if self.is_editable() {
            Ok(())
        } else {
            Err(DomainError::validation(
                operation,
                "status",
                format!("order in status {} can no longer be edited", self.status),
            ))
        }
    }

    /// Whole-aggregate consistency check.
    pub fn validate(&self) -> DomainResult<()> {
        self.detail.validate("ValidateOrder")?;
        if let Some(weight) = self.package_detail.weight {
            ensure_amount("ValidateOrder", "weight", weight)?;
        }
        self.package_detail
            .decoded_dimensions()
            .map_err(|e| e.into_domain("ValidateOrder"))?;
        for location in [self.delivery_address.location, self.pickup_address.location]
            .into_iter()
            .flatten()
        {
            location.validate("ValidateOrder")?;
        }
        match latest_entry(&self.status_history) {
            Some(entry) if entry.status == self.status => Ok(()),
            Some(entry) => Err(DomainError::invariant(format!(
                "cached status {} differs from history status {}",
                self.status, entry.status
            ))),
            None => Err(DomainError::invariant("order has no status history")),
        }
    }

    /// Rebuild an order from its persisted shape.
    ///
    /// Status and tracking are recomputed from the history; a record whose
    /// history is empty is rejected.
    pub fn rehydrate(record: OrderRecord) -> DomainResult<Self> {
        let latest = latest_entry(&record.status_history)
            .cloned()
            .ok_or_else(|| DomainError::invariant("order has no status history"))?;

        let order = Order {
            id: record.id,
            company_id: record.company_id,
            branch_id: record.branch_id,
            client_id: record.client_id,
            driver_id: record.driver_id,
            tracking_number: record.tracking_number,
            status: latest.status,
            created_at: record.created_at,
            updated_at: record.updated_at,
            detail: record.detail,
            package_detail: record.package_detail,
            delivery_address: record.delivery_address,
            pickup_address: record.pickup_address,
            tracking: Tracking {
                current_status: latest.status,
                last_updated: latest.created_at,
            },
            version: record.status_history.len() as u64,
            status_history: record.status_history,
        };
        order.validate()?;
        Ok(order)
    }

    /// Persisted shape of this order.
    pub fn to_record(&self) -> OrderRecord {
        OrderRecord {
            id: self.id,
            company_id: self.company_id,
            branch_id: self.branch_id,
            client_id: self.client_id,
            driver_id: self.driver_id,
            tracking_number: self.tracking_number.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
            detail: self.detail.clone(),
            package_detail: self.package_detail.clone(),
            delivery_address: self.delivery_address.clone(),
            pickup_address: self.pickup_address.clone(),
            status_history: self.status_history.clone(),
        }
    }
}

impl AggregateRoot for Order {
    type Id = OrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Plain persisted form of an order, as handed over by the storage layer.
///
/// There is no status field: the status is always derived from the history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: OrderId,
    pub company_id: CompanyId,
    pub branch_id: BranchId,
    pub client_id: UserId,
    #[serde(default)]
    pub driver_id: Option<UserId>,
    pub tracking_number: TrackingNumber,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub detail: Detail,
    pub package_detail: PackageDetail,
    pub delivery_address: DeliveryAddress,
    pub pickup_address: PickupAddress,
    pub status_history: Vec<StatusHistoryEntry>,
}

/// Latest entry: greatest timestamp, later insertion wins ties.
pub fn latest_entry(history: &[StatusHistoryEntry]) -> Option<&StatusHistoryEntry> {
    history
        .iter()
        .enumerate()
        .max_by_key(|(position, entry)| (entry.created_at, *position))
        .map(|(_, entry)| entry)
}

/// Recompute the current status from the audit trail.
pub fn replay_status(history: &[StatusHistoryEntry]) -> Option<OrderStatus> {
    latest_entry(history).map(|entry| entry.status)
}

pub(crate) fn ensure_amount(
    operation: &'static str,
    field: &'static str,
    value: f64,
) -> DomainResult<()> {
    if !value.is_finite() {
        return Err(DomainError::validation(operation, field, "must be a finite number"));
    }
    if value < 0.0 {
        return Err(DomainError::validation(operation, field, "must not be negative"));
    }
    Ok(())
}

pub(crate) fn ensure_schedule(
    operation: &'static str,
    pickup_time: DateTime<Utc>,
    delivery_deadline: DateTime<Utc>,
) -> DomainResult<()> {
    if delivery_deadline < pickup_time {
        return Err(DomainError::validation(
            operation,
            "delivery_deadline",
            format!("{delivery_deadline} precedes pickup_time {pickup_time}"),
        ));
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn rehydrate_derives_status_from_history() {
        let mut record = record();
        record
            .status_history
            .push(entry(OrderStatus::Accepted, at(10, 0)));

        let order = Order::rehydrate(record).unwrap();
        assert_eq!(order.status(), OrderStatus::Accepted);
        assert_eq!(order.tracking().current_status, OrderStatus::Accepted);
        assert_eq!(order.tracking().last_updated, at(10, 0));
        assert_eq!(order.version(), 2);
    }

    #[test]
    fn rehydrate_rejects_empty_history() {
        let mut record = record();
        record.status_history.clear();
        assert!(matches!(
            Order::rehydrate(record),
            Err(DomainError::InvariantViolation(_))
        ));
    }

    #[test]
    fn rehydrate_rejects_deadline_before_pickup() {
        let mut record = record();
        record.detail.delivery_deadline = at(14, 29);
        assert!(matches!(
            Order::rehydrate(record),
            Err(DomainError::Validation { field: "delivery_deadline", .. })
        ));
    }

    #[test]
    fn latest_entry_breaks_timestamp_ties_by_insertion_order() {
        let history = vec![
            entry(OrderStatus::Pending, at(9, 0)),
            entry(OrderStatus::Accepted, at(10, 0)),
            entry(OrderStatus::Cancelled, at(10, 0)),
        ];
        assert_eq!(replay_status(&history), Some(OrderStatus::Cancelled));
    }

    #[test]
    fn latest_entry_prefers_later_timestamp_over_position() {
        let history = vec![
            entry(OrderStatus::Pending, at(9, 0)),
            entry(OrderStatus::Accepted, at(11, 0)),
            entry(OrderStatus::Cancelled, at(10, 0)),
        ];
        assert_eq!(replay_status(&history), Some(OrderStatus::Accepted));
        assert_eq!(replay_status(&[]), None);
    }

    #[test]
    fn serialized_order_reads_back_as_record() {
        let order = order();
        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["status"], "PENDING");
        let record: OrderRecord = serde_json::from_value(json).unwrap();
        assert_eq!(Order::rehydrate(record).unwrap(), order);
    }

    #[test]
    fn record_round_trip_keeps_history() {
        let mut record = record();
        record
            .status_history
            .push(entry(OrderStatus::Cancelled, at(9, 30)));
        let order = Order::rehydrate(record.clone()).unwrap();
        assert_eq!(order.to_record(), record);
        assert_eq!(order.status(), OrderStatus::Cancelled);
    }

    #[test]
    fn record_json_keeps_full_float_precision() {
        let mut record = record();
        record.detail.price = 98569.07946328695;
        record.package_detail.weight = Some(94943.77153062675);

        let json = serde_json::to_string(&record).unwrap();
        let back: OrderRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.detail.price.to_bits(), record.detail.price.to_bits());
        assert_eq!(back, record);
    }

    #[test]
    fn qr_payload_is_the_tracking_number() {
        let order = order();
        assert_eq!(order.qr_payload(), order.tracking_number().as_str());
    }

    #[test]
    fn geo_point_ranges() {
        let bad = GeoPoint {
            latitude: 91.0,
            longitude: 0.0,
        };
        assert!(matches!(
            bad.validate("Test"),
            Err(DomainError::Validation { field: "latitude", .. })
        ));
    }
}
