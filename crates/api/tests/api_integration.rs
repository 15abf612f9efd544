//! Integration tests for the API server.

use std::sync::{Arc, OnceLock};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{EpochMillis, ManualClock};
use domain::{OrderRepository, RecordingMirror, RecordingNotifier};
use metrics_exporter_prometheus::PrometheusHandle;
use storage::InMemoryKeyValueStore;
use tower::ServiceExt;

const T: i64 = 1_750_000_000_000;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

struct TestApp {
    app: axum::Router,
    clock: ManualClock,
    notifier: RecordingNotifier,
    mirror: RecordingMirror,
}

async fn setup() -> TestApp {
    let clock = ManualClock::new(EpochMillis::new(T));
    let notifier = RecordingNotifier::new();
    let mirror = RecordingMirror::new();
    let repository = OrderRepository::builder(InMemoryKeyValueStore::new())
        .clock(Arc::new(clock.clone()))
        .notifier(Arc::new(notifier.clone()))
        .mirror(Arc::new(mirror.clone()))
        .open()
        .await;
    let app = api::create_app(api::AppState::new(repository), get_metrics_handle());
    TestApp {
        app,
        clock,
        notifier,
        mirror,
    }
}

/// Sets up an app with a 30-day license already active.
async fn setup_licensed() -> TestApp {
    let t = setup().await;
    let (status, _) = send(&t.app, "POST", "/license/activate", Some(serde_json::json!({"days": 30}))).await;
    assert_eq!(status, StatusCode::OK);
    t
}

async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_string(&json).unwrap())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };
    (status, json)
}

fn new_customer_order(weight: &str, price: &str) -> serde_json::Value {
    serde_json::json!({
        "customer": {"kind": "new", "name": "Budi", "phone": "08123", "address": "Jl. Mawar 1"},
        "weight_kg": weight,
        "price": price
    })
}

#[tokio::test]
async fn test_health_check() {
    let t = setup().await;
    let (status, json) = send(&t.app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let t = setup().await;
    let response = t
        .app
        .clone()
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response.headers()["content-type"]
            .to_str()
            .unwrap()
            .starts_with("text/plain")
    );
}

mod license {
    use super::*;

    #[tokio::test]
    async fn fresh_install_is_expired() {
        let t = setup().await;
        let (status, json) = send(&t.app, "GET", "/license", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "expired");
        assert_eq!(json["can_write"], false);
    }

    #[tokio::test]
    async fn activate_by_days_and_plan() {
        let t = setup().await;

        let (status, json) = send(
            &t.app,
            "POST",
            "/license/activate",
            Some(serde_json::json!({"days": 30})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "active");
        assert_eq!(json["expires_at"], T + 30 * 86_400_000);

        let (status, json) = send(
            &t.app,
            "POST",
            "/license/activate",
            Some(serde_json::json!({"plan": "monthly"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["expires_at"], T + 60 * 86_400_000);
    }

    #[tokio::test]
    async fn zero_days_is_rejected() {
        let t = setup().await;
        let (status, json) = send(
            &t.app,
            "POST",
            "/license/activate",
            Some(serde_json::json!({"days": 0})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].is_string());
    }

    #[tokio::test]
    async fn grace_shows_grace_and_denies_writes() {
        let t = setup_licensed().await;
        t.clock.advance_days(32);

        let (_, json) = send(&t.app, "GET", "/license", None).await;
        assert_eq!(json["status"], "grace");

        let (status, _) = send(&t.app, "POST", "/orders", Some(new_customer_order("5", "25000"))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}

mod orders {
    use super::*;

    #[tokio::test]
    async fn create_is_denied_without_license() {
        let t = setup().await;
        let (status, json) = send(&t.app, "POST", "/orders", Some(new_customer_order("5", "25000"))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(json["error"].as_str().unwrap().contains("read-only"));

        let (_, orders) = send(&t.app, "GET", "/orders", None).await;
        assert_eq!(orders, serde_json::json!([]));
    }

    #[tokio::test]
    async fn create_then_list_and_get() {
        let t = setup_licensed().await;

        let (status, json) = send(&t.app, "POST", "/orders", Some(new_customer_order("5", "25000"))).await;
        assert_eq!(status, StatusCode::CREATED);
        let code = json["order"]["code"].as_str().unwrap().to_string();
        assert_eq!(code, format!("LND-{T}"));
        assert_eq!(json["order"]["status"], "Pesanan masuk");
        assert_eq!(json["order"]["price"], 25000);
        assert_eq!(json["new_customer"]["name"], "Budi");

        t.clock.advance_millis(60_000);
        let (status, json) = send(
            &t.app,
            "POST",
            "/orders",
            Some(serde_json::json!({
                "customer": {"kind": "existing", "index": 0},
                "weight_kg": "2",
                "price": "10000"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(json["new_customer"].is_null());
        let second = json["order"]["code"].as_str().unwrap().to_string();

        let (_, orders) = send(&t.app, "GET", "/orders", None).await;
        let codes: Vec<_> = orders
            .as_array()
            .unwrap()
            .iter()
            .map(|o| o["code"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(codes, vec![second, code.clone()]);

        let (_, customers) = send(&t.app, "GET", "/customers", None).await;
        assert_eq!(customers.as_array().unwrap().len(), 1);

        let (status, order) = send(&t.app, "GET", &format!("/orders/{code}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(order["customerName"], "Budi");
    }

    #[tokio::test]
    async fn invalid_input_is_unprocessable() {
        let t = setup_licensed().await;
        let (status, json) = send(&t.app, "POST", "/orders", Some(new_customer_order("5", "-10"))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(json["error"].as_str().unwrap().contains("price"));

        let (status, _) = send(&t.app, "POST", "/orders", Some(new_customer_order("", "10"))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn unknown_code_is_not_found() {
        let t = setup_licensed().await;
        let (status, _) = send(&t.app, "GET", "/orders/LND-1", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&t.app, "POST", "/orders/LND-1/advance", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn scan_advances_until_complete() {
        let t = setup_licensed().await;
        let (_, json) = send(&t.app, "POST", "/orders", Some(new_customer_order("5", "25000"))).await;
        let code = json["order"]["code"].as_str().unwrap().to_string();
        let uri = format!("/orders/{code}/advance");

        for (previous, next) in [
            ("Pesanan masuk", "Sedang dicuci"),
            ("Sedang dicuci", "Selesai dicuci"),
            ("Selesai dicuci", "Sudah diambil"),
        ] {
            let (status, json) = send(&t.app, "POST", &uri, None).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(json["outcome"], "advanced");
            assert_eq!(json["previous"], previous);
            assert_eq!(json["order"]["status"], next);
        }

        let (status, json) = send(&t.app, "POST", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["outcome"], "already_complete");
        assert_eq!(json["order"]["status"], "Sudah diambil");

        // Notifications are fire-and-forget; give the spawned tasks a moment.
        for _ in 0..50 {
            if t.notifier.sent().await.len() == 3 {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert_eq!(t.notifier.sent().await.len(), 3);
    }
}

mod remote {
    use super::*;

    #[tokio::test]
    async fn fetch_reads_through_mirror() {
        let t = setup_licensed().await;
        send(&t.app, "POST", "/orders", Some(new_customer_order("5", "25000"))).await;

        for _ in 0..50 {
            if !t.mirror.posted_to("orders").await.is_empty() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }

        let (status, json) = send(&t.app, "GET", "/remote/orders?select=code,status", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn mirror_failure_is_bad_gateway() {
        let t = setup().await;
        t.mirror.set_fail(true);
        let (status, json) = send(&t.app, "GET", "/remote/orders", None).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(json["error"].is_string());
    }
}

mod file_backed {
    use super::*;

    #[tokio::test]
    async fn default_state_persists_across_restarts() {
        let dir = tempfile::tempdir().unwrap();
        let config = api::config::Config {
            data_path: dir.path().join("laundry.json"),
            ..Default::default()
        };

        let app = api::create_app(
            api::create_default_state(&config).await,
            get_metrics_handle(),
        );
        let (status, _) = send(&app, "POST", "/license/activate", Some(serde_json::json!({"plan": "yearly"}))).await;
        assert_eq!(status, StatusCode::OK);
        let (status, json) = send(&app, "POST", "/orders", Some(new_customer_order("3", "15000"))).await;
        assert_eq!(status, StatusCode::CREATED);
        let code = json["order"]["code"].as_str().unwrap().to_string();

        let restarted = api::create_app(
            api::create_default_state(&config).await,
            get_metrics_handle(),
        );
        let (status, order) = send(&restarted, "GET", &format!("/orders/{code}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(order["weightKg"], "3");

        let (_, license) = send(&restarted, "GET", "/license", None).await;
        assert_eq!(license["status"], "active");
    }
}
