use std::collections::HashMap;
use std::path::Path;

use chrono::Utc;
use courier_orders::{Order, OrderRecord, OrderService, OrderSettings, OrderStatus};

use super::{print_json, read_json};

/// Replay a persisted order, apply one status change and print the new state.
pub fn transition(
    order: &Path,
    status: OrderStatus,
    description: &str,
    settings: OrderSettings,
) -> anyhow::Result<()> {
    let record: OrderRecord = read_json(order)?;
    let mut order = Order::rehydrate(record)?;

    let service = OrderService::new(HashMap::new(), settings);
    service.change_status(&mut order, status, description, Utc::now())?;

    print_json(&order)
}
