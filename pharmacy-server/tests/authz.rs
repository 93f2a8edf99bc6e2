//! Role gate and ownership tests over the HTTP surface
//!
//! Builds the full axum service (auth middleware included) and drives it
//! with tower's oneshot, asserting status codes and that protected
//! records stay unmodified on denied requests.

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use surrealdb::RecordId;
use tower::ServiceExt;

use pharmacy_server::db::DbService;
use pharmacy_server::db::models::{MedicineCreate, PrescriptionCreate, UserCreate};
use pharmacy_server::db::repository::{MedicineRepository, PrescriptionRepository, UserRepository};
use pharmacy_server::{Config, ServerState};
use shared::util::now_millis;
use shared::{PrescriptionStatus, Role};

struct TestEnv {
    state: ServerState,
    _tmp: tempfile::TempDir,
}

async fn setup() -> TestEnv {
    let tmp = tempfile::tempdir().unwrap();
    let db_service = DbService::new(tmp.path().join("db")).await.unwrap();
    let config = Config::with_overrides(tmp.path().to_string_lossy().to_string(), 0);
    let state = ServerState::with_db(config, db_service.db);
    TestEnv { state, _tmp: tmp }
}

fn app(state: &ServerState) -> Router {
    pharmacy_server::core::server::build_service(state.clone())
}

async fn seed_user(state: &ServerState, name: &str, email: &str, role: Role) -> (RecordId, String) {
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
    let id = user.id.clone().unwrap();
    let token = state
        .jwt_service
        .generate_token(&id.to_string(), name, email, role)
        .unwrap();
    (id, token)
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(t) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    builder.body(Body::empty()).unwrap()
}

fn json_request(method: &str, uri: &str, token: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_is_public() {
    let env = setup().await;
    let response = app(&env.state).oneshot(get("/api/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn missing_token_is_unauthenticated() {
    let env = setup().await;
    let response = app(&env.state).oneshot(get("/api/orders", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn garbage_token_is_rejected() {
    let env = setup().await;
    let response = app(&env.state)
        .oneshot(get("/api/orders", Some("not-a-real-token")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn role_mismatch_is_forbidden() {
    let env = setup().await;
    let (_, doctor_token) = seed_user(&env.state, "Doc", "doc@example.com", Role::Doctor).await;

    // Doctors cannot list customer orders
    let response = app(&env.state)
        .oneshot(get("/api/orders", Some(&doctor_token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Doctors cannot create medicines either
    let response = app(&env.state)
        .oneshot(json_request(
            "POST",
            "/api/medicines",
            &doctor_token,
            serde_json::json!({
                "name": "X", "description": "d", "price": 1.0, "stock": 1,
                "manufacturer": "m", "category": "c", "expiry_date": now_millis() + 1000
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn catalog_is_open_to_any_authenticated_role() {
    let env = setup().await;
    let (_, customer_token) =
        seed_user(&env.state, "Cus", "cus@example.com", Role::Customer).await;

    let response = app(&env.state)
        .oneshot(get("/api/medicines", Some(&customer_token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn foreign_supplier_cannot_update_or_delete_medicine() {
    let env = setup().await;
    let (owner_id, _) = seed_user(&env.state, "Owner", "owner@example.com", Role::Supplier).await;
    let (_, intruder_token) =
        seed_user(&env.state, "Other", "other@example.com", Role::Supplier).await;

    let medicines = MedicineRepository::new(env.state.db.clone());
    let medicine = medicines
        .create(
            owner_id,
            MedicineCreate {
                name: "Zinc".to_string(),
                description: "supplement".to_string(),
                price: 5.0,
                stock: 40,
                manufacturer: "Acme".to_string(),
                category: "Vitamins".to_string(),
                requires_prescription: false,
                expiry_date: now_millis() + 86_400_000,
            },
        )
        .await
        .unwrap();
    let medicine_id = medicine.id.unwrap();

    // PATCH by a different supplier → 403, record unmodified
    let response = app(&env.state)
        .oneshot(json_request(
            "PATCH",
            &format!("/api/medicines/{medicine_id}"),
            &intruder_token,
            serde_json::json!({ "stock": 0 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let stored = medicines
        .find_by_id(&medicine_id.to_string())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.stock, 40);

    // DELETE by a different supplier → 403, record still there
    let response = app(&env.state)
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/medicines/{medicine_id}"))
                .header(header::AUTHORIZATION, format!("Bearer {intruder_token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(
        medicines
            .find_by_id(&medicine_id.to_string())
            .await
            .unwrap()
            .is_some()
    );
}

#[tokio::test]
async fn owning_supplier_updates_stock_and_expiry() {
    let env = setup().await;
    let (owner_id, owner_token) =
        seed_user(&env.state, "Owner", "owner@example.com", Role::Supplier).await;

    let medicines = MedicineRepository::new(env.state.db.clone());
    let medicine = medicines
        .create(
            owner_id,
            MedicineCreate {
                name: "Iron".to_string(),
                description: "supplement".to_string(),
                price: 3.0,
                stock: 10,
                manufacturer: "Acme".to_string(),
                category: "Vitamins".to_string(),
                requires_prescription: false,
                expiry_date: now_millis() + 86_400_000,
            },
        )
        .await
        .unwrap();
    let medicine_id = medicine.id.unwrap();

    let response = app(&env.state)
        .oneshot(json_request(
            "PATCH",
            &format!("/api/medicines/{medicine_id}"),
            &owner_token,
            serde_json::json!({ "stock": 25 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["stock"], 25);

    // Negative stock is rejected
    let response = app(&env.state)
        .oneshot(json_request(
            "PATCH",
            &format!("/api/medicines/{medicine_id}"),
            &owner_token,
            serde_json::json!({ "stock": -1 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn foreign_doctor_cannot_complete_prescription() {
    let env = setup().await;
    let (owner_id, _) = seed_user(&env.state, "DocA", "doca@example.com", Role::Doctor).await;
    let (_, intruder_token) =
        seed_user(&env.state, "DocB", "docb@example.com", Role::Doctor).await;
    let (patient_id, _) = seed_user(&env.state, "Cus", "cus@example.com", Role::Customer).await;

    let prescriptions = PrescriptionRepository::new(env.state.db.clone());
    let prescription = prescriptions
        .create(PrescriptionCreate {
            patient: patient_id,
            doctor: owner_id,
            medicines: vec![],
            notes: String::new(),
            valid_until: now_millis() + 86_400_000,
        })
        .await
        .unwrap();
    let prescription_id = prescription.id.unwrap();

    let response = app(&env.state)
        .oneshot(json_request(
            "PATCH",
            &format!("/api/prescriptions/{prescription_id}"),
            &intruder_token,
            serde_json::json!({ "status": "completed" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let stored = prescriptions
        .find_by_id(&prescription_id.to_string())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, PrescriptionStatus::Active);
}

#[tokio::test]
async fn owning_doctor_completes_prescription_once() {
    let env = setup().await;
    let (owner_id, owner_token) =
        seed_user(&env.state, "DocA", "doca@example.com", Role::Doctor).await;
    let (patient_id, _) = seed_user(&env.state, "Cus", "cus@example.com", Role::Customer).await;

    let prescriptions = PrescriptionRepository::new(env.state.db.clone());
    let prescription = prescriptions
        .create(PrescriptionCreate {
            patient: patient_id,
            doctor: owner_id,
            medicines: vec![],
            notes: String::new(),
            valid_until: now_millis() + 86_400_000,
        })
        .await
        .unwrap();
    let prescription_id = prescription.id.unwrap();

    let response = app(&env.state)
        .oneshot(json_request(
            "PATCH",
            &format!("/api/prescriptions/{prescription_id}"),
            &owner_token,
            serde_json::json!({ "status": "completed" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "completed");

    // Terminal states are final; a second transition conflicts
    let response = app(&env.state)
        .oneshot(json_request(
            "PATCH",
            &format!("/api/prescriptions/{prescription_id}"),
            &owner_token,
            serde_json::json!({ "status": "expired" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn signup_then_login_round_trip() {
    let env = setup().await;

    let response = app(&env.state)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/signup")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::json!({
                        "name": "Robin",
                        "email": "robin@example.com",
                        "password": "a-long-enough-password",
                        "role": "customer"
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app(&env.state)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::json!({
                        "email": "robin@example.com",
                        "password": "a-long-enough-password"
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let token = body["token"].as_str().unwrap().to_string();
    assert_eq!(body["user"]["role"], "customer");

    // The issued token passes the gate
    let response = app(&env.state)
        .oneshot(get("/api/orders", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Wrong password is rejected with the unified message
    let response = app(&env.state)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::json!({
                        "email": "robin@example.com",
                        "password": "wrong-password-entirely"
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
