// Shared helpers for router-level integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Once};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vitrina::api::{create_router, AppState};
use vitrina::config::{AuthConfig, Config, MarketplaceConfig};
use vitrina::db::{seed, Database, DatabaseBackend, LibSqlBackend};
use vitrina::marketplace::MarketplaceClient;
use vitrina::models::User;
use vitrina::services::NewUser;

pub const ADMIN_EMAIL: &str = "admin@vitrina.test";
pub const ADMIN_PASSWORD: &str = "admin-password";
pub const PASSWORD: &str = "buyer-password";

static INIT: Once = Once::new();

/// Initialize tracing subscriber once for tests
pub fn init_test_logger() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub marketplace: MockServer,
    _dir: TempDir,
}

pub async fn spawn_app() -> TestApp {
    init_test_logger();
    let marketplace = MockServer::start().await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let mut config = Config::default();
    config.database.url = format!("file:{}", dir.path().join("vitrina_test.db").display());
    config.marketplace = MarketplaceConfig {
        base_url: marketplace.uri(),
        access_token: Some("APP_USR-test".to_string()),
        ..MarketplaceConfig::default()
    };
    config.auth = AuthConfig {
        admin_email: Some(ADMIN_EMAIL.to_string()),
        admin_password: Some(ADMIN_PASSWORD.to_string()),
        ..AuthConfig::default()
    };
    config.server.cors_allowed_origins = Vec::new();

    let raw_db = Database::new(&config.database).await.unwrap();
    let db: Arc<dyn DatabaseBackend> = Arc::new(LibSqlBackend::new(raw_db));
    seed::seed(&*db, &config.auth).await.unwrap();

    let client = MarketplaceClient::new(config.marketplace.clone()).unwrap();
    let state = AppState::new(config, db, client);

    TestApp {
        router: create_router(state.clone()),
        state,
        marketplace,
        _dir: dir,
    }
}

impl TestApp {
    pub fn db(&self) -> &Arc<dyn DatabaseBackend> {
        &self.state.db
    }

    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    pub async fn login(&self, email: &str, password: &str) -> String {
        let (status, json) = self
            .send(
                "POST",
                "/api/v1/auth/login",
                None,
                Some(json!({ "email": email, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {json}");
        json["data"]["token"].as_str().unwrap().to_string()
    }

    pub async fn login_admin(&self) -> String {
        self.login(ADMIN_EMAIL, ADMIN_PASSWORD).await
    }

    /// Create a buyer account and open a session for it.
    pub async fn buyer(&self, username: &str) -> (User, String) {
        let email = format!("{username}@vitrina.test");
        let user = self
            .state
            .auth
            .create_user(NewUser {
                name: username.to_string(),
                surname: "Tester".to_string(),
                username: username.to_string(),
                email: email.clone(),
                password: PASSWORD.to_string(),
                role_ids: Vec::new(),
            })
            .await
            .unwrap();
        let token = self.login(&email, PASSWORD).await;
        (user, token)
    }
}

pub fn product_json(id: &str, title: &str, price: f64) -> Value {
    json!({
        "id": id,
        "title": title,
        "price": price,
        "currency_id": "ARS",
        "pictures": [
            {"id": format!("{id}-p1"), "url": format!("http://img.test/{id}/1.jpg")},
            {"id": format!("{id}-p2"), "url": format!("http://img.test/{id}/2.jpg")}
        ]
    })
}

/// Serve `products` from the batch endpoint, in reverse order, wrapped the
/// way the marketplace wraps multi-get entries. Each product is also served
/// from its single-item endpoint.
pub async fn mock_batch(server: &MockServer, products: &[Value]) {
    for product in products {
        mock_item(server, product.clone()).await;
    }

    let entries: Vec<Value> = products
        .iter()
        .rev()
        .map(|body| json!({ "code": 200, "body": body }))
        .collect();

    Mock::given(method("GET"))
        .and(path("/items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(entries))
        .mount(server)
        .await;
}

pub async fn mock_item(server: &MockServer, product: Value) {
    let id = product["id"].as_str().unwrap().to_string();
    Mock::given(method("GET"))
        .and(path(format!("/items/{id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(product))
        .mount(server)
        .await;
}
