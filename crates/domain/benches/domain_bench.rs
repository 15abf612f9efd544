use std::sync::Arc;

use common::{EpochMillis, ManualClock};
use criterion::{Criterion, criterion_group, criterion_main};
use domain::{
    LicenseWindow, NewCustomerRequest, NewOrderRequest, Order, OrderRepository, OrderStatus,
};
use storage::{InMemoryKeyValueStore, PersistenceStore, Snapshot};

const T: i64 = 1_750_000_000_000;

async fn licensed_repo() -> (OrderRepository<InMemoryKeyValueStore>, ManualClock) {
    let clock = ManualClock::new(EpochMillis::new(T));
    let repo = OrderRepository::builder(InMemoryKeyValueStore::new())
        .clock(Arc::new(clock.clone()))
        .open()
        .await;
    repo.license().activate(365).await.unwrap();
    (repo, clock)
}

fn request() -> NewOrderRequest {
    NewOrderRequest::for_new_customer(
        NewCustomerRequest::new("Budi", "08123", "Jl. Mawar 1"),
        "5",
        "25000",
    )
}

fn bench_create_order(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("domain/create_order", |b| {
        b.iter(|| {
            rt.block_on(async {
                let (mut repo, _clock) = licensed_repo().await;
                repo.create_order(request()).await.unwrap();
            });
        });
    });
}

fn bench_advance_order(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("domain/advance_to_picked_up", |b| {
        b.iter(|| {
            rt.block_on(async {
                let (mut repo, _clock) = licensed_repo().await;
                let order = repo.create_order(request()).await.unwrap().order;
                while repo.find_by_code(order.code.as_str()).unwrap().status
                    != OrderStatus::PickedUp
                {
                    repo.advance(&order).await.unwrap();
                }
            });
        });
    });
}

fn bench_snapshot_load(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let (mut repo, clock) = rt.block_on(licensed_repo());
    rt.block_on(async {
        for _ in 0..500 {
            clock.advance_millis(1);
            repo.create_order(request()).await.unwrap();
        }
    });
    let store = InMemoryKeyValueStore::new();
    let persistence = PersistenceStore::new(store);
    let snapshot = Snapshot {
        customers: repo.customers().to_vec(),
        orders: repo.orders().to_vec(),
    };
    rt.block_on(persistence.save(&snapshot)).unwrap();

    c.bench_function("domain/load_500_orders", |b| {
        b.iter(|| {
            rt.block_on(async {
                let loaded: Snapshot<domain::Customer, Order> = persistence.load().await;
                assert_eq!(loaded.orders.len(), 500);
            });
        });
    });
}

fn bench_license_status(c: &mut Criterion) {
    let window = LicenseWindow::new(EpochMillis::new(T).plus_days(30));
    let now = EpochMillis::new(T);

    c.bench_function("domain/license_status_at", |b| {
        b.iter(|| window.status_at(std::hint::black_box(now)));
    });
}

criterion_group!(
    benches,
    bench_create_order,
    bench_advance_order,
    bench_snapshot_load,
    bench_license_status
);
criterion_main!(benches);
