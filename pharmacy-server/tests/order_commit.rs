//! Order commit workflow tests
//!
//! Drives the OrderCoordinator + InventoryLedger + PrescriptionLifecycle
//! directly against an embedded database, including the concurrency
//! properties (no oversell, no prescription double-spend).

use std::sync::Arc;

use surrealdb::RecordId;

use pharmacy_server::db::DbService;
use pharmacy_server::db::models::{
    MedicineCreate, PrescriptionCreate, PrescriptionLine, UserCreate,
};
use pharmacy_server::db::repository::{
    MedicineRepository, OrderRepository, PrescriptionRepository, UserRepository,
};
use pharmacy_server::inventory::ReserveLine;
use pharmacy_server::orders::OrderCommitError;
use pharmacy_server::{Config, ServerState};
use shared::order::{OrderItemInput, PlaceOrderInput};
use shared::util::now_millis;
use shared::{DeliveryMethod, OrderStatus, PrescriptionStatus, Role};

struct TestEnv {
    state: ServerState,
    // Keeps the database directory alive for the duration of the test
    _tmp: tempfile::TempDir,
}

async fn setup() -> TestEnv {
    let tmp = tempfile::tempdir().unwrap();
    let db_service = DbService::new(tmp.path().join("db")).await.unwrap();
    let config = Config::with_overrides(tmp.path().to_string_lossy().to_string(), 0);
    let state = ServerState::with_db(config, db_service.db);
    TestEnv { state, _tmp: tmp }
}

async fn seed_user(state: &ServerState, name: &str, email: &str, role: Role) -> RecordId {
    let repo = UserRepository::new(state.db.clone());
    let user = repo
        .create(UserCreate {
            name: name.to_string(),
            email: email.to_string(),
            password: "a-long-enough-password".to_string(),
            role,
        })
        .await
        .unwrap();
    user.id.unwrap()
}

async fn seed_medicine(
    state: &ServerState,
    supplier: &RecordId,
    name: &str,
    price: f64,
    stock: i64,
) -> RecordId {
    let repo = MedicineRepository::new(state.db.clone());
    let medicine = repo
        .create(
            supplier.clone(),
            MedicineCreate {
                name: name.to_string(),
                description: "test medicine".to_string(),
                price,
                stock,
                manufacturer: "Acme Labs".to_string(),
                category: "Analgesic".to_string(),
                requires_prescription: false,
                expiry_date: now_millis() + 86_400_000,
            },
        )
        .await
        .unwrap();
    medicine.id.unwrap()
}

async fn stock_of(state: &ServerState, id: &RecordId) -> i64 {
    let repo = MedicineRepository::new(state.db.clone());
    repo.find_by_id(&id.to_string()).await.unwrap().unwrap().stock
}

fn collect_order(medicine: &RecordId, quantity: i64) -> PlaceOrderInput {
    PlaceOrderInput {
        items: vec![OrderItemInput {
            medicine: medicine.to_string(),
            quantity,
        }],
        delivery_method: DeliveryMethod::Collect,
        address: None,
        phone: "600123456".to_string(),
        prescription: None,
    }
}

#[tokio::test]
async fn collect_order_completes_and_decrements_stock() {
    let env = setup().await;
    let supplier = seed_user(&env.state, "Sup", "sup@example.com", Role::Supplier).await;
    let customer = seed_user(&env.state, "Cus", "cus@example.com", Role::Customer).await;
    let medicine = seed_medicine(&env.state, &supplier, "Ibuprofen", 4.25, 10).await;

    let order = env
        .state
        .coordinator
        .place_order(customer, collect_order(&medicine, 3))
        .await
        .unwrap();

    assert_eq!(order.status, OrderStatus::Completed);
    assert_eq!(order.items.len(), 1);
    assert_eq!(order.items[0].name, "Ibuprofen");
    assert_eq!(order.items[0].price, 4.25);
    assert_eq!(order.total_amount, 12.75);
    assert_eq!(stock_of(&env.state, &medicine).await, 7);
}

#[tokio::test]
async fn delivery_order_stays_pending() {
    let env = setup().await;
    let supplier = seed_user(&env.state, "Sup", "sup@example.com", Role::Supplier).await;
    let customer = seed_user(&env.state, "Cus", "cus@example.com", Role::Customer).await;
    let medicine = seed_medicine(&env.state, &supplier, "Paracetamol", 2.10, 5).await;

    let input = PlaceOrderInput {
        delivery_method: DeliveryMethod::Delivery,
        address: Some("12 Harbor Road".to_string()),
        ..collect_order(&medicine, 2)
    };

    let order = env.state.coordinator.place_order(customer, input).await.unwrap();

    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(stock_of(&env.state, &medicine).await, 3);
}

#[tokio::test]
async fn insufficient_stock_fails_and_leaves_stock_unchanged() {
    let env = setup().await;
    let supplier = seed_user(&env.state, "Sup", "sup@example.com", Role::Supplier).await;
    let customer = seed_user(&env.state, "Cus", "cus@example.com", Role::Customer).await;
    let medicine = seed_medicine(&env.state, &supplier, "Amoxicillin", 9.99, 3).await;

    let err = env
        .state
        .coordinator
        .place_order(customer, collect_order(&medicine, 5))
        .await
        .unwrap_err();

    match err {
        OrderCommitError::InsufficientStock { medicine: name } => {
            assert_eq!(name, "Amoxicillin");
        }
        other => panic!("expected InsufficientStock, got {other:?}"),
    }

    assert_eq!(stock_of(&env.state, &medicine).await, 3);
}

#[tokio::test]
async fn failing_batch_restores_earlier_lines() {
    let env = setup().await;
    let supplier = seed_user(&env.state, "Sup", "sup@example.com", Role::Supplier).await;
    let customer = seed_user(&env.state, "Cus", "cus@example.com", Role::Customer).await;
    let plenty = seed_medicine(&env.state, &supplier, "Aspirin", 1.50, 100).await;
    let scarce = seed_medicine(&env.state, &supplier, "Insulin", 30.0, 1).await;

    let input = PlaceOrderInput {
        items: vec![
            OrderItemInput {
                medicine: plenty.to_string(),
                quantity: 10,
            },
            OrderItemInput {
                medicine: scarce.to_string(),
                quantity: 2,
            },
        ],
        ..collect_order(&plenty, 1)
    };

    let err = env.state.coordinator.place_order(customer, input).await.unwrap_err();
    assert!(matches!(err, OrderCommitError::InsufficientStock { .. }));

    // First line was decremented then restored; second never applied
    assert_eq!(stock_of(&env.state, &plenty).await, 100);
    assert_eq!(stock_of(&env.state, &scarce).await, 1);
}

#[tokio::test]
async fn delivery_without_address_fails_before_any_stock_mutation() {
    let env = setup().await;
    let supplier = seed_user(&env.state, "Sup", "sup@example.com", Role::Supplier).await;
    let customer = seed_user(&env.state, "Cus", "cus@example.com", Role::Customer).await;
    let medicine = seed_medicine(&env.state, &supplier, "Cough Syrup", 6.40, 8).await;

    let input = PlaceOrderInput {
        delivery_method: DeliveryMethod::Delivery,
        address: None,
        ..collect_order(&medicine, 2)
    };

    let err = env.state.coordinator.place_order(customer, input).await.unwrap_err();
    assert!(matches!(err, OrderCommitError::Validation(_)));
    assert_eq!(stock_of(&env.state, &medicine).await, 8);
}

#[tokio::test]
async fn unknown_medicine_fails_with_not_found() {
    let env = setup().await;
    let customer = seed_user(&env.state, "Cus", "cus@example.com", Role::Customer).await;

    let input = PlaceOrderInput {
        items: vec![OrderItemInput {
            medicine: "medicine:doesnotexist".to_string(),
            quantity: 1,
        }],
        delivery_method: DeliveryMethod::Collect,
        address: None,
        phone: "600123456".to_string(),
        prescription: None,
    };

    let err = env.state.coordinator.place_order(customer, input).await.unwrap_err();
    assert!(matches!(err, OrderCommitError::MedicineNotFound(_)));
}

#[tokio::test]
async fn total_amount_matches_sum_of_line_items_exactly() {
    let env = setup().await;
    let supplier = seed_user(&env.state, "Sup", "sup@example.com", Role::Supplier).await;
    let customer = seed_user(&env.state, "Cus", "cus@example.com", Role::Customer).await;
    let a = seed_medicine(&env.state, &supplier, "A", 12.50, 50).await;
    let b = seed_medicine(&env.state, &supplier, "B", 3.99, 50).await;
    let c = seed_medicine(&env.state, &supplier, "C", 0.45, 50).await;

    let input = PlaceOrderInput {
        items: vec![
            OrderItemInput { medicine: a.to_string(), quantity: 2 },
            OrderItemInput { medicine: b.to_string(), quantity: 1 },
            OrderItemInput { medicine: c.to_string(), quantity: 10 },
        ],
        ..collect_order(&a, 1)
    };

    let order = env.state.coordinator.place_order(customer, input).await.unwrap();

    // 25.00 + 3.99 + 4.50 = 33.49, no floating drift
    assert_eq!(order.total_amount, 33.49);
    let recomputed: f64 = order
        .items
        .iter()
        .map(|i| {
            pharmacy_server::orders::money::to_f64(pharmacy_server::orders::money::line_total(
                i.price, i.quantity,
            ))
        })
        .sum();
    assert_eq!(order.total_amount, recomputed);
}

#[tokio::test]
async fn order_with_prescription_consumes_it() {
    let env = setup().await;
    let supplier = seed_user(&env.state, "Sup", "sup@example.com", Role::Supplier).await;
    let customer = seed_user(&env.state, "Cus", "cus@example.com", Role::Customer).await;
    let doctor = seed_user(&env.state, "Doc", "doc@example.com", Role::Doctor).await;
    let medicine = seed_medicine(&env.state, &supplier, "Tramadol", 15.0, 10).await;

    let prescriptions = PrescriptionRepository::new(env.state.db.clone());
    let prescription = prescriptions
        .create(PrescriptionCreate {
            patient: customer.clone(),
            doctor,
            medicines: vec![PrescriptionLine {
                medicine: medicine.clone(),
                dosage: "50mg".to_string(),
                duration: "7 days".to_string(),
            }],
            notes: String::new(),
            valid_until: now_millis() + 86_400_000,
        })
        .await
        .unwrap();
    let prescription_id = prescription.id.unwrap();

    let input = PlaceOrderInput {
        prescription: Some(prescription_id.to_string()),
        ..collect_order(&medicine, 1)
    };

    let order = env.state.coordinator.place_order(customer, input).await.unwrap();
    assert_eq!(
        order.prescription.as_ref().map(|p| p.to_string()),
        Some(prescription_id.to_string())
    );

    let stored = prescriptions
        .find_by_id(&prescription_id.to_string())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, PrescriptionStatus::Completed);
}

#[tokio::test]
async fn consumed_prescription_cannot_back_a_second_order() {
    let env = setup().await;
    let supplier = seed_user(&env.state, "Sup", "sup@example.com", Role::Supplier).await;
    let customer = seed_user(&env.state, "Cus", "cus@example.com", Role::Customer).await;
    let doctor = seed_user(&env.state, "Doc", "doc@example.com", Role::Doctor).await;
    let medicine = seed_medicine(&env.state, &supplier, "Codeine", 8.0, 10).await;

    let prescriptions = PrescriptionRepository::new(env.state.db.clone());
    let prescription = prescriptions
        .create(PrescriptionCreate {
            patient: customer.clone(),
            doctor,
            medicines: vec![],
            notes: String::new(),
            valid_until: now_millis() + 86_400_000,
        })
        .await
        .unwrap();
    let prescription_id = prescription.id.unwrap();

    let input = PlaceOrderInput {
        prescription: Some(prescription_id.to_string()),
        ..collect_order(&medicine, 2)
    };
    env.state
        .coordinator
        .place_order(customer.clone(), input.clone())
        .await
        .unwrap();
    assert_eq!(stock_of(&env.state, &medicine).await, 8);

    // Second order referencing the spent prescription must fully roll back
    let err = env.state.coordinator.place_order(customer, input).await.unwrap_err();
    assert!(matches!(err, OrderCommitError::PrescriptionConsumed(_)));

    // Stock restored, only the first order persisted
    assert_eq!(stock_of(&env.state, &medicine).await, 8);
    let orders = OrderRepository::new(env.state.db.clone());
    assert_eq!(orders.count().await.unwrap(), 1);
}

#[tokio::test]
async fn concurrent_orders_consume_a_prescription_exactly_once() {
    let env = setup().await;
    let supplier = seed_user(&env.state, "Sup", "sup@example.com", Role::Supplier).await;
    let customer = seed_user(&env.state, "Cus", "cus@example.com", Role::Customer).await;
    let doctor = seed_user(&env.state, "Doc", "doc@example.com", Role::Doctor).await;
    let medicine = seed_medicine(&env.state, &supplier, "Morphine", 20.0, 10).await;

    let prescriptions = PrescriptionRepository::new(env.state.db.clone());
    let prescription = prescriptions
        .create(PrescriptionCreate {
            patient: customer.clone(),
            doctor,
            medicines: vec![],
            notes: String::new(),
            valid_until: now_millis() + 86_400_000,
        })
        .await
        .unwrap();
    let prescription_id = prescription.id.unwrap();

    let input = PlaceOrderInput {
        prescription: Some(prescription_id.to_string()),
        ..collect_order(&medicine, 1)
    };

    let c1 = env.state.coordinator.clone();
    let c2 = env.state.coordinator.clone();
    let (cust1, cust2) = (customer.clone(), customer.clone());
    let (in1, in2) = (input.clone(), input);

    let t1 = tokio::spawn(async move { c1.place_order(cust1, in1).await });
    let t2 = tokio::spawn(async move { c2.place_order(cust2, in2).await });
    let (r1, r2) = (t1.await.unwrap(), t2.await.unwrap());

    let successes = [&r1, &r2].iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1, "exactly one order may consume the prescription");

    // The prescription ends completed exactly once, never re-enters active
    let stored = prescriptions
        .find_by_id(&prescription_id.to_string())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, PrescriptionStatus::Completed);

    // Loser rolled back its reservation
    assert_eq!(stock_of(&env.state, &medicine).await, 9);
    let orders = OrderRepository::new(env.state.db.clone());
    assert_eq!(orders.count().await.unwrap(), 1);
}

#[tokio::test]
async fn concurrent_reservations_never_oversell() {
    let env = setup().await;
    let supplier = seed_user(&env.state, "Sup", "sup@example.com", Role::Supplier).await;
    let customer = seed_user(&env.state, "Cus", "cus@example.com", Role::Customer).await;
    let medicine = seed_medicine(&env.state, &supplier, "Vaccine", 50.0, 5).await;

    let mut handles = Vec::new();
    for _ in 0..10 {
        let coordinator = env.state.coordinator.clone();
        let cust = customer.clone();
        let input = collect_order(&medicine, 1);
        handles.push(tokio::spawn(async move {
            coordinator.place_order(cust, input).await
        }));
    }

    let mut successes = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            successes += 1;
        }
    }

    assert_eq!(successes, 5, "only as many orders as stock may succeed");
    assert_eq!(stock_of(&env.state, &medicine).await, 0);
}

#[tokio::test]
async fn ledger_release_restores_stock() {
    let env = setup().await;
    let supplier = seed_user(&env.state, "Sup", "sup@example.com", Role::Supplier).await;
    let medicine = seed_medicine(&env.state, &supplier, "Bandage", 1.0, 20).await;

    let lines = vec![ReserveLine {
        medicine: medicine.clone(),
        quantity: 6,
    }];

    env.state.ledger.check_and_reserve(&lines).await.unwrap();
    assert_eq!(stock_of(&env.state, &medicine).await, 14);

    env.state.ledger.release(&lines).await.unwrap();
    assert_eq!(stock_of(&env.state, &medicine).await, 20);
}

#[tokio::test]
async fn coordinator_is_shareable_across_tasks() {
    // Arc<OrderCoordinator> clones share one ledger lock
    let env = setup().await;
    let c: Arc<_> = env.state.coordinator.clone();
    let c2 = c.clone();
    assert!(Arc::ptr_eq(&c, &c2));
}
