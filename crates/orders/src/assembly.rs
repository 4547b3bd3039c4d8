//! Order assembly: building new orders and routing updates.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use courier_core::{
    AddressId, AggregateRoot, BranchId, CompanyId, DomainError, DomainResult, HistoryEntryId,
    OrderId, UserId,
};

use crate::config::OrderSettings;
use crate::dimensions::encode_complete;
use crate::lifecycle;
use crate::model::{
    DeliveryAddress, Detail, Order, PackageDetail, PickupAddress, StatusHistoryEntry, Tracking,
    ensure_amount, ensure_schedule,
};
use crate::reconcile::{OrderDelta, reconcile_update};
use crate::request::{CreateOrderRequest, PickupLocation, UpdateOrderRequest};
use crate::status::OrderStatus;
use crate::tracking::TrackingNumber;

const ASSEMBLE: &str = "AssembleOrder";
const UPDATE: &str = "UpdateOrder";

/// Lookup of registered company pickup locations (owned by the company service).
pub trait PickupLocations {
    fn pickup_location(&self, id: AddressId) -> Option<PickupLocation>;
}

impl PickupLocations for HashMap<AddressId, PickupLocation> {
    fn pickup_location(&self, id: AddressId) -> Option<PickupLocation> {
        self.get(&id).cloned()
    }
}

impl<T: PickupLocations + ?Sized> PickupLocations for &T {
    fn pickup_location(&self, id: AddressId) -> Option<PickupLocation> {
        (**self).pickup_location(id)
    }
}

/// Identity and creation time of an order that is about to be assembled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderStamp {
    pub order_id: OrderId,
    pub history_entry_id: HistoryEntryId,
    pub tracking_number: TrackingNumber,
    pub created_at: DateTime<Utc>,
    /// Description of the creation history entry.
    pub description: String,
}

impl NewOrderStamp {
    /// Fresh ids and a random tracking number.
    pub fn generate(settings: &OrderSettings, now: DateTime<Utc>) -> Self {
        Self {
            order_id: OrderId::new(),
            history_entry_id: HistoryEntryId::new(),
            tracking_number: TrackingNumber::generate(
                &settings.tracking_prefix,
                now,
                &mut rand::rng(),
            ),
            created_at: now,
            description: settings.creation_note.clone(),
        }
    }
}

/// Build a complete `PENDING` order from a creation request.
///
/// Pure: the same request, pickup location and stamp always give the same order.
pub fn assemble_order(
    request: &CreateOrderRequest,
    pickup: &PickupLocation,
    stamp: NewOrderStamp,
) -> DomainResult<Order> {
    let company_id: CompanyId = required_id("company_id", &request.company_id)?;
    let branch_id: BranchId = required_id("branch_id", &request.branch_id)?;
    let client_id: UserId = required_id("client_id", &request.client_id)?;

    if pickup.company_id != company_id {
        return Err(DomainError::reference(
            ASSEMBLE,
            format!("pickup location {} does not belong to company {company_id}", pickup.id),
        ));
    }

    ensure_schedule(ASSEMBLE, request.pickup_time, request.delivery_deadline)?;
    ensure_amount(ASSEMBLE, "price", request.price)?;
    ensure_amount(ASSEMBLE, "distance", request.distance)?;

    let package = &request.package_details;
    if let Some(weight) = package.weight {
        ensure_amount(ASSEMBLE, "weight", weight)?;
    }
    let dimensions = encode_complete(
        package.length.unwrap_or(0.0),
        package.width.unwrap_or(0.0),
        package.height.unwrap_or(0.0),
    )
    .map_err(|e| e.into_domain(ASSEMBLE))?;

    let delivery = &request.delivery_address;
    if let Some(location) = delivery.location {
        location.validate(ASSEMBLE)?;
    }

    let creation_entry = StatusHistoryEntry {
        id: stamp.history_entry_id,
        status: OrderStatus::Pending,
        description: stamp.description,
        created_at: stamp.created_at,
    };

    Ok(Order {
        id: stamp.order_id,
        company_id,
        branch_id,
        client_id,
        driver_id: None,
        tracking_number: stamp.tracking_number,
        status: OrderStatus::Pending,
        created_at: stamp.created_at,
        updated_at: stamp.created_at,
        detail: Detail {
            price: request.price,
            distance: request.distance,
            pickup_time: request.pickup_time,
            delivery_deadline: request.delivery_deadline,
            delivered_at: None,
            requires_signature: request.requires_signature,
            delivery_notes: request.delivery_notes.clone(),
        },
        package_detail: PackageDetail {
            is_fragile: package.is_fragile,
            is_urgent: package.is_urgent,
            weight: package.weight,
            dimensions,
            special_instructions: package.special_instructions.clone(),
        },
        delivery_address: DeliveryAddress {
            recipient_name: delivery.recipient_name.clone(),
            recipient_phone: delivery.recipient_phone.clone(),
            address_line1: delivery.address_line1.clone(),
            address_line2: delivery.address_line2.clone(),
            city: delivery.city.clone(),
            state: delivery.state.clone(),
            postal_code: delivery.postal_code.clone(),
            location: delivery.location,
            address_notes: delivery.address_notes.clone(),
        },
        pickup_address: PickupAddress {
            contact_name: request.pickup_contact.contact_name.clone(),
            contact_phone: request.pickup_contact.contact_phone.clone(),
            address_line1: pickup.address_line1.clone(),
            address_line2: pickup.address_line2.clone(),
            city: pickup.city.clone(),
            state: pickup.state.clone(),
            postal_code: pickup.postal_code.clone(),
            location: pickup.location,
            address_notes: request.pickup_contact.address_notes.clone(),
        },
        tracking: Tracking {
            current_status: OrderStatus::Pending,
            last_updated: creation_entry.created_at,
        },
        status_history: vec![creation_entry],
        version: 1,
    })
}

fn required_id<T>(field: &'static str, raw: &str) -> DomainResult<T>
where
    T: core::str::FromStr<Err = DomainError>,
{
    if raw.trim().is_empty() {
        return Err(DomainError::validation(ASSEMBLE, field, "is required"));
    }
    raw.parse()
}

/// Entry points of the order lifecycle core.
///
/// Creation, field updates and status changes are separate operations; an
/// update never changes the status and a status change never edits fields.
pub struct OrderService<L> {
    locations: L,
    settings: OrderSettings,
}

impl<L: PickupLocations> OrderService<L> {
    pub fn new(locations: L, settings: OrderSettings) -> Self {
        Self {
            locations,
            settings,
        }
    }

    /// Resolve the pickup location, then assemble a new order stamped `now`.
    pub fn create_order(
        &self,
        request: &CreateOrderRequest,
        now: DateTime<Utc>,
    ) -> DomainResult<Order> {
        let pickup = self.resolve_pickup(request)?;
        let stamp = NewOrderStamp::generate(&self.settings, now);

        let order = assemble_order(request, &pickup, stamp).inspect_err(|err| {
            tracing::warn!(error = %err, company_id = %request.company_id, "order rejected");
        })?;

        tracing::info!(
            order_id = %order.id(),
            tracking_number = %order.tracking_number(),
            company_id = %order.company_id(),
            "order created"
        );
        Ok(order)
    }

    /// Reconcile a sparse update against an existing order.
    ///
    /// The returned delta is what the persistence layer must write.
    pub fn update_order(
        &self,
        existing: &Order,
        request: &UpdateOrderRequest,
        now: DateTime<Utc>,
    ) -> DomainResult<OrderDelta> {
        let result = existing.ensure_editable(UPDATE).and_then(|()| {
            ensure_schedule(
                UPDATE,
                request.pickup_time.unwrap_or(existing.detail().pickup_time),
                request
                    .delivery_deadline
                    .unwrap_or(existing.detail().delivery_deadline),
            )?;
            reconcile_update(*existing.id(), request, now)
        });

        match &result {
            Ok(delta) => tracing::info!(
                order_id = %existing.id(),
                detail = delta.detail.is_some(),
                package = delta.package_detail.is_some(),
                delivery_address = delta.delivery_address.is_some(),
                pickup_contact = delta.pickup_address.is_some(),
                "order update reconciled"
            ),
            Err(err) => tracing::warn!(order_id = %existing.id(), error = %err, "order update rejected"),
        }
        result
    }

    pub fn change_status(
        &self,
        order: &mut Order,
        status: OrderStatus,
        description: &str,
        now: DateTime<Utc>,
    ) -> DomainResult<StatusHistoryEntry> {
        let from = order.status();
        match lifecycle::apply_status_transition(order, status, description, now) {
            Ok(entry) => {
                tracing::info!(order_id = %order.id(), %from, to = %status, "order status changed");
                Ok(entry)
            }
            Err(err) => {
                tracing::warn!(order_id = %order.id(), %from, to = %status, error = %err, "status change rejected");
                Err(err)
            }
        }
    }

    pub fn assign_driver(
        &self,
        order: &mut Order,
        driver_id: UserId,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        lifecycle::assign_driver(order, driver_id, now)?;
        tracing::info!(order_id = %order.id(), %driver_id, "driver assigned");
        Ok(())
    }

    fn resolve_pickup(&self, request: &CreateOrderRequest) -> DomainResult<PickupLocation> {
        let id: AddressId = if request.company_pickup_id.trim().is_empty() {
            return Err(DomainError::validation(ASSEMBLE, "company_pickup_id", "is required"));
        } else {
            request.company_pickup_id.parse()?
        };

        self.locations.pickup_location(id).ok_or_else(|| {
            tracing::warn!(pickup_id = %id, "pickup location not found");
            DomainError::reference(ASSEMBLE, format!("pickup location {id} not found"))
        })
    }
}
