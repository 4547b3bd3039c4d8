//! Delivery order lifecycle core.
//!
//! Order assembly, sparse updates, the package dimensions codec and the
//! status state machine. Transport, persistence and authentication live
//! elsewhere; this crate works on in-memory values only.

pub mod assembly;
pub mod config;
pub mod dimensions;
pub mod lifecycle;
pub mod model;
pub mod reconcile;
pub mod request;
pub mod status;
pub mod tracking;

pub use assembly::{NewOrderStamp, OrderService, PickupLocations, assemble_order};
pub use config::OrderSettings;
pub use dimensions::{
    DimensionError, Dimensions, decode_dimensions, encode_complete, encode_dimensions,
    merge_dimensions,
};
pub use lifecycle::{OrderCommand, OrderEvent, apply_status_transition, assign_driver};
pub use model::{
    DeliveryAddress, Detail, GeoPoint, Order, OrderRecord, PackageDetail, PickupAddress,
    StatusHistoryEntry, Tracking, replay_status,
};
pub use reconcile::{DetailPatch, OrderDelta, PackageDetailPatch, reconcile_update};
pub use request::{
    CreateOrderRequest, DeliveryAddressPatch, DeliveryAddressRequest, PackageDetailRequest,
    PackageDetailUpdate, PickupContactPatch, PickupContactRequest, PickupLocation,
    UpdateOrderRequest,
};
pub use status::OrderStatus;
pub use tracking::TrackingNumber;
