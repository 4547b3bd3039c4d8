use std::path::Path;

use chrono::Utc;
use courier_core::OrderId;
use courier_orders::{UpdateOrderRequest, reconcile_update};

use super::{print_json, read_json};

pub fn reconcile(order_id: OrderId, request: &Path) -> anyhow::Result<()> {
    let request: UpdateOrderRequest = read_json(request)?;
    let delta = reconcile_update(order_id, &request, Utc::now())?;

    if delta.is_noop() {
        tracing::info!(%order_id, "update request touches no field");
    }
    print_json(&delta)
}
