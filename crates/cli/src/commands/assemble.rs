use std::collections::HashMap;
use std::path::Path;

use chrono::Utc;
use courier_orders::{CreateOrderRequest, OrderService, OrderSettings, PickupLocation};

use super::{print_json, read_json};

pub fn assemble(request: &Path, pickup: &Path, settings: OrderSettings) -> anyhow::Result<()> {
    let request: CreateOrderRequest = read_json(request)?;
    let pickup: PickupLocation = read_json(pickup)?;

    let locations = HashMap::from([(pickup.id, pickup)]);
    let order = OrderService::new(locations, settings).create_order(&request, Utc::now())?;

    print_json(&order)
}
