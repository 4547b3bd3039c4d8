use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use chrono::{DateTime, Duration, TimeZone, Utc};
use courier_core::{AddressId, AggregateRoot, BranchId, CompanyId, HistoryEntryId, OrderId, UserId};
use courier_orders::{
    CreateOrderRequest, DeliveryAddressRequest, NewOrderStamp, Order, OrderStatus,
    PackageDetailRequest, PackageDetailUpdate, PickupContactRequest, PickupLocation,
    TrackingNumber, UpdateOrderRequest, apply_status_transition, assemble_order,
    decode_dimensions, encode_complete, merge_dimensions, reconcile_update,
};

fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 5, 15, hour, 0, 0).unwrap()
}

fn new_order() -> Order {
    let company_id = CompanyId::new();
    let pickup = PickupLocation {
        id: AddressId::new(),
        company_id,
        address_line1: "456 Business Ave".to_string(),
        address_line2: String::new(),
        city: "Chicago".to_string(),
        state: "IL".to_string(),
        postal_code: "60606".to_string(),
        location: None,
    };
    let request = CreateOrderRequest {
        company_id: company_id.to_string(),
        branch_id: BranchId::new().to_string(),
        client_id: UserId::new().to_string(),
        company_pickup_id: pickup.id.to_string(),
        price: 25.5,
        distance: 7.2,
        pickup_time: at(14),
        delivery_deadline: at(16),
        requires_signature: false,
        delivery_notes: String::new(),
        package_details: PackageDetailRequest {
            length: Some(30.0),
            width: Some(20.0),
            height: Some(15.0),
            ..PackageDetailRequest::default()
        },
        delivery_address: DeliveryAddressRequest {
            recipient_name: "John Doe".to_string(),
            recipient_phone: "+1234567890".to_string(),
            address_line1: "123 Main Street".to_string(),
            address_line2: String::new(),
            city: "New York".to_string(),
            state: "NY".to_string(),
            postal_code: "10001".to_string(),
            location: None,
            address_notes: String::new(),
        },
        pickup_contact: PickupContactRequest {
            contact_name: "Jane Smith".to_string(),
            contact_phone: "+0987654321".to_string(),
            address_notes: String::new(),
        },
    };
    let stamp = NewOrderStamp {
        order_id: OrderId::new(),
        history_entry_id: HistoryEntryId::new(),
        tracking_number: TrackingNumber::compose("DEL", at(9), 42),
        created_at: at(9),
        description: "Order created".to_string(),
    };
    assemble_order(&request, &pickup, stamp).unwrap()
}

fn bench_dimensions_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("dimensions_codec");
    let blob = encode_complete(30.0, 20.0, 15.5).unwrap();

    group.bench_function("encode_complete", |b| {
        b.iter(|| encode_complete(black_box(30.0), black_box(20.0), black_box(15.5)).unwrap());
    });
    group.bench_function("decode", |b| {
        b.iter(|| decode_dimensions(black_box(&blob)).unwrap());
    });
    group.bench_function("merge_single_side", |b| {
        b.iter(|| merge_dimensions(black_box(&blob), black_box(r#"{"length":50,"unit":"cm"}"#)).unwrap());
    });

    group.finish();
}

fn bench_reconcile_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile_update");
    let order = new_order();

    let sparse = UpdateOrderRequest {
        price: Some(30.0),
        ..UpdateOrderRequest::default()
    };
    let wide = UpdateOrderRequest {
        price: Some(30.0),
        distance: Some(9.1),
        delivery_notes: Some("Leave at reception".to_string()),
        package_details: PackageDetailUpdate {
            weight: Some(3.0),
            length: Some(50.0),
            height: Some(10.0),
            ..PackageDetailUpdate::default()
        },
        ..UpdateOrderRequest::default()
    };

    for (name, request) in [("single_field", &sparse), ("many_fields", &wide)] {
        group.bench_with_input(BenchmarkId::new("reconcile_and_apply", name), request, |b, request| {
            b.iter(|| {
                let mut order = order.clone();
                let delta = reconcile_update(*order.id(), request, at(10)).unwrap();
                order.apply_delta(&delta).unwrap();
                order
            });
        });
    }

    group.finish();
}

fn bench_status_transitions(c: &mut Criterion) {
    let mut group = c.benchmark_group("status_transitions");
    let order = new_order();

    group.bench_function("pending_accepted_delivered_completed", |b| {
        b.iter(|| {
            let mut order = order.clone();
            let mut now = at(10);
            for status in [OrderStatus::Accepted, OrderStatus::Delivered, OrderStatus::Completed] {
                apply_status_transition(&mut order, status, "", now).unwrap();
                now += Duration::minutes(30);
            }
            order
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_dimensions_codec,
    bench_reconcile_update,
    bench_status_transitions
);
criterion_main!(benches);
