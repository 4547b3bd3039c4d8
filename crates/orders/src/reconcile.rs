//! Partial-update reconciliation.
//!
//! [`reconcile_update`] turns a sparse [`UpdateOrderRequest`] into an
//! [`OrderDelta`]: a partial order carrying only the sub-records the request
//! touches, and inside each only the provided fields. Anything absent from the
//! delta must be left untouched by whoever persists it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use courier_core::{DomainError, DomainResult, OrderId};

use crate::dimensions::{self, encode_dimensions};
use crate::model::{Order, ensure_amount, ensure_schedule};
use crate::request::{
    DeliveryAddressPatch, PackageDetailUpdate, PickupContactPatch, UpdateOrderRequest,
};

const RECONCILE: &str = "ReconcileUpdate";
const APPLY: &str = "ApplyDelta";

/// Partial order produced by reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDelta {
    pub id: OrderId,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<DetailPatch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_detail: Option<PackageDetailPatch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_address: Option<DeliveryAddressPatch>,
    /// Contact half only; the geographic half is never patched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pickup_address: Option<PickupContactPatch>,
}

impl OrderDelta {
    /// True when the delta touches no sub-record.
    pub fn is_noop(&self) -> bool {
        self.detail.is_none()
            && self.package_detail.is_none()
            && self.delivery_address.is_none()
            && self.pickup_address.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetailPatch {
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
}

impl DetailPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageDetailPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_fragile: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_urgent: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    /// Sparse dimensions blob: only the sides the request supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special_instructions: Option<String>,
}

impl PackageDetailPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Build the delta for `order_id` from a sparse request.
///
/// All validation runs before any part of the delta is built; on error
/// nothing is returned.
pub fn reconcile_update(
    order_id: OrderId,
    request: &UpdateOrderRequest,
    now: DateTime<Utc>,
) -> DomainResult<OrderDelta> {
    validate_update(request)?;

    let detail = DetailPatch {
        price: request.price,
        distance: request.distance,
        pickup_time: request.pickup_time,
        delivery_deadline: request.delivery_deadline,
        requires_signature: request.requires_signature,
        delivery_notes: request.delivery_notes.clone(),
    };

    Ok(OrderDelta {
        id: order_id,
        updated_at: now,
        detail: (!detail.is_empty()).then_some(detail),
        package_detail: package_patch(&request.package_details)?,
        delivery_address: (!request.delivery_address.is_empty())
            .then(|| request.delivery_address.clone()),
        pickup_address: (!request.pickup_contact.is_empty())
            .then(|| request.pickup_contact.clone()),
    })
}

fn validate_update(request: &UpdateOrderRequest) -> DomainResult<()> {
    if let (Some(pickup), Some(deadline)) = (request.pickup_time, request.delivery_deadline) {
        ensure_schedule(RECONCILE, pickup, deadline)?;
    }
    for (field, value) in [
        ("price", request.price),
        ("distance", request.distance),
        ("weight", request.package_details.weight),
    ] {
        if let Some(value) = value {
            ensure_amount(RECONCILE, field, value)?;
        }
    }
    if let Some(location) = request.delivery_address.location {
        location.validate(RECONCILE)?;
    }
    Ok(())
}

fn package_patch(update: &PackageDetailUpdate) -> DomainResult<Option<PackageDetailPatch>> {
    let dimensions = if update.has_dimensions() {
        Some(
            encode_dimensions(update.length, update.width, update.height)
                .map_err(|e| e.into_domain(RECONCILE))?,
        )
    } else {
        None
    };

    let patch = PackageDetailPatch {
        is_fragile: update.is_fragile,
        is_urgent: update.is_urgent,
        weight: update.weight,
        dimensions,
        special_instructions: update.special_instructions.clone(),
    };
    Ok((!patch.is_empty()).then_some(patch))
}

impl Order {
    /// Apply a delta with patch semantics: only present fields are written.
    ///
    /// Every fallible step (deadline check against the merged schedule,
    /// dimension merge) runs before the aggregate is touched.
    pub fn apply_delta(&mut self, delta: &OrderDelta) -> DomainResult<()> {
        if delta.id != self.id {
            return Err(DomainError::invariant("order_id mismatch"));
        }
        self.ensure_editable(APPLY)?;

        if let Some(patch) = &delta.detail {
            ensure_schedule(
                APPLY,
                patch.pickup_time.unwrap_or(self.detail.pickup_time),
                patch.delivery_deadline.unwrap_or(self.detail.delivery_deadline),
            )?;
        }

        let merged_dimensions = match delta
            .package_detail
            .as_ref()
            .and_then(|patch| patch.dimensions.as_deref())
        {
            Some(patch) => Some(
                dimensions::merge_dimensions(&self.package_detail.dimensions, patch)
                    .map_err(|e| e.into_domain(APPLY))?,
            ),
            None => None,
        };

        if let Some(patch) = &delta.detail {
            let detail = &mut self.detail;
            overwrite(&mut detail.price, &patch.price);
            overwrite(&mut detail.distance, &patch.distance);
            overwrite(&mut detail.pickup_time, &patch.pickup_time);
            overwrite(&mut detail.delivery_deadline, &patch.delivery_deadline);
            overwrite(&mut detail.requires_signature, &patch.requires_signature);
            overwrite(&mut detail.delivery_notes, &patch.delivery_notes);
        }

        if let Some(patch) = &delta.package_detail {
            let package = &mut self.package_detail;
            overwrite(&mut package.is_fragile, &patch.is_fragile);
            overwrite(&mut package.is_urgent, &patch.is_urgent);
            if patch.weight.is_some() {
                package.weight = patch.weight;
            }
            overwrite(&mut package.special_instructions, &patch.special_instructions);
            if let Some(blob) = merged_dimensions {
                package.dimensions = blob;
            }
        }

        if let Some(patch) = &delta.delivery_address {
            let address = &mut self.delivery_address;
            overwrite(&mut address.recipient_name, &patch.recipient_name);
            overwrite(&mut address.recipient_phone, &patch.recipient_phone);
            overwrite(&mut address.address_line1, &patch.address_line1);
            overwrite(&mut address.address_line2, &patch.address_line2);
            overwrite(&mut address.city, &patch.city);
            overwrite(&mut address.state, &patch.state);
            overwrite(&mut address.postal_code, &patch.postal_code);
            if patch.location.is_some() {
                address.location = patch.location;
            }
            overwrite(&mut address.address_notes, &patch.address_notes);
        }

        if let Some(patch) = &delta.pickup_address {
            let address = &mut self.pickup_address;
            overwrite(&mut address.contact_name, &patch.contact_name);
            overwrite(&mut address.contact_phone, &patch.contact_phone);
            overwrite(&mut address.address_notes, &patch.address_notes);
        }

        if !delta.is_noop() && delta.updated_at > self.updated_at {
            self.updated_at = delta.updated_at;
        }
        Ok(())
    }
}

fn overwrite<T: Clone>(target: &mut T, value: &Option<T>) {
    if let Some(value) = value {
        *target = value.clone();
    }
}
