// mart-client/tests/client_integration.rs
// Integration tests against an in-process gateway

use async_trait::async_trait;
use axum::extract::Path;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, patch, post, put};
use axum::{Json, Router};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use mart_client::{
    ApiClient, ApiError, AuthError, AuthSession, ClientConfig, ProviderClient, TokenSet,
};
use serde_json::json;
use shared::models::{CommandStatus, UpdateUserRequest};
use std::sync::Arc;

/// Serve a router on an ephemeral port and return its base URL
async fn spawn_gateway(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

fn product_json(id: u64) -> serde_json::Value {
    json!({
        "productId": id,
        "name": "Mechanical Keyboard",
        "description": "Tenkeyless",
        "price": 79.5,
        "stock": 12
    })
}

fn command_json(id: u64, status: &str) -> serde_json::Value {
    json!({
        "commandId": id,
        "date": "2026-08-01T10:30:00Z",
        "status": status,
        "totalPrice": 21.5,
        "userId": "u-1",
        "username": "alice",
        "items": [{ "productId": 1, "quantity": 2, "price": 10.75 }]
    })
}

fn user_json(id: &str, enabled: bool) -> serde_json::Value {
    json!({
        "id": id,
        "username": "bob",
        "email": "bob@example.com",
        "firstName": "Bob",
        "lastName": "B",
        "enabled": enabled,
        "emailVerified": true,
        "createdTimestamp": 1_700_000_000u64
    })
}

fn gateway_router() -> Router {
    Router::new()
        .route(
            "/api/products",
            get(|| async { Json(json!([product_json(1), product_json(2)])) }),
        )
        .route(
            "/api/products/{id}",
            get(|headers: HeaderMap| async move {
                match headers.get("authorization") {
                    Some(value) if value.to_str().unwrap_or("").starts_with("Bearer ") => {
                        Json(product_json(7)).into_response()
                    }
                    _ => StatusCode::UNAUTHORIZED.into_response(),
                }
            }),
        )
        .route(
            "/api/commands",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "database down") }),
        )
        .route(
            "/api/users",
            get(|| async { (StatusCode::FORBIDDEN, "admin role required") }),
        )
        .route(
            "/api/commands/{id}",
            get(|Path(id): Path<u64>| async move { Json(command_json(id, "PENDING")) }),
        )
        .route(
            "/api/commands/{id}/status",
            patch(
                |Path(id): Path<u64>, Json(body): Json<serde_json::Value>| async move {
                    Json(command_json(id, body["status"].as_str().unwrap_or("PENDING")))
                },
            ),
        )
        .route(
            "/api/commands/{id}/cancel",
            post(|| async { StatusCode::NO_CONTENT }),
        )
        .route(
            "/api/users/{id}",
            put(
                |Path(id): Path<String>, Json(body): Json<serde_json::Value>| async move {
                    let mut user = user_json(&id, true);
                    if let Some(email) = body.get("email") {
                        user["email"] = email.clone();
                    }
                    Json(user)
                },
            ),
        )
        .route(
            "/api/users/{id}/enabled",
            patch(
                |Path(id): Path<String>, Json(body): Json<serde_json::Value>| async move {
                    Json(user_json(&id, body["enabled"].as_bool().unwrap_or(true)))
                },
            ),
        )
        .route(
            "/api/products/{id}/check-stock",
            get(|| async { Json(json!(true)) }),
        )
        .route(
            "/api/products/reduce-stock",
            post(|Json(body): Json<serde_json::Value>| async move {
                if body.as_array().is_some_and(|items| !items.is_empty()) {
                    StatusCode::NO_CONTENT.into_response()
                } else {
                    StatusCode::BAD_REQUEST.into_response()
                }
            }),
        )
        .route(
            "/api/products/restore-stock",
            post(|Json(body): Json<serde_json::Value>| async move {
                if body.as_array().is_some_and(|items| !items.is_empty()) {
                    StatusCode::NO_CONTENT.into_response()
                } else {
                    StatusCode::BAD_REQUEST.into_response()
                }
            }),
        )
        .route(
            "/api/auth/register",
            post(|headers: HeaderMap, Json(body): Json<serde_json::Value>| async move {
                if headers.contains_key("authorization") {
                    // Registration must stay anonymous
                    return StatusCode::BAD_REQUEST.into_response();
                }
                Json(json!({ "id": "u-1", "username": body["username"] })).into_response()
            }),
        )
}

fn client_for(base_url: &str) -> ApiClient {
    ClientConfig::new(base_url).with_timeout(5).build_api_client()
}

/// Provider that hands out a pre-built token and never refreshes
struct StaticProvider {
    tokens: TokenSet,
}

#[async_trait]
impl ProviderClient for StaticProvider {
    async fn login(&self, _username: &str, _password: &str) -> Result<TokenSet, AuthError> {
        Ok(self.tokens.clone())
    }

    async fn refresh(&self, _refresh_token: &str) -> Result<TokenSet, AuthError> {
        Err(AuthError::Rejected("no refresh in this test".into()))
    }

    async fn logout(&self, _refresh_token: &str) -> Result<(), AuthError> {
        Ok(())
    }
}

fn long_lived_token(username: &str) -> TokenSet {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs();
    let payload = json!({
        "exp": now + 3600,
        "preferred_username": username,
        "realm_access": { "roles": ["CLIENT"] }
    });
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none"}"#);
    let body = URL_SAFE_NO_PAD.encode(payload.to_string().as_bytes());
    TokenSet {
        access_token: format!("{header}.{body}.sig"),
        refresh_token: "refresh".into(),
        expires_in: 0,
    }
}

async fn authenticated_client(base_url: &str) -> ApiClient {
    let provider = Arc::new(StaticProvider {
        tokens: long_lived_token("alice"),
    });
    let auth = Arc::new(AuthSession::new(provider, None));
    auth.login("alice", "secret").await.unwrap();
    client_for(base_url).with_auth(auth)
}

#[tokio::test]
async fn list_products_deserializes_the_wire_format() {
    let base = spawn_gateway(gateway_router()).await;
    let client = client_for(&base);

    let products = client.list_products().await.unwrap();
    assert_eq!(products.len(), 2);
    assert_eq!(products[0].product_id, 1);
    assert_eq!(products[0].name, "Mechanical Keyboard");
    assert_eq!(products[0].stock, 12);
    assert_eq!(products[0].price.to_string(), "79.5");
}

#[tokio::test]
async fn status_codes_map_to_distinct_error_kinds() {
    let base = spawn_gateway(gateway_router()).await;
    let client = client_for(&base);

    // 401 without a token
    let err = client.get_product(7).await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized));
    assert_eq!(err.status(), Some(401));

    // 500 carries status and body
    let err = client.list_commands(None).await.unwrap_err();
    match err {
        ApiError::Http { status, ref body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "database down");
        }
        other => panic!("expected Http error, got {other:?}"),
    }

    // 403 is its own kind
    let err = client.list_users().await.unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));
}

#[tokio::test]
async fn unreachable_server_maps_to_status_zero() {
    // Nothing listens on this port
    let client = client_for("http://127.0.0.1:9");

    let err = client.list_products().await.unwrap_err();
    assert!(matches!(err, ApiError::Unreachable(_)));
    assert_eq!(err.status(), Some(0));
    assert!(!err.is_client_error());
}

#[tokio::test]
async fn bearer_token_is_attached_when_authenticated() {
    let base = spawn_gateway(gateway_router()).await;
    let client = authenticated_client(&base).await;

    // The route 401s unless a bearer token arrives
    let product = client.get_product(7).await.unwrap();
    assert_eq!(product.product_id, 7);
}

#[tokio::test]
async fn empty_body_success_yields_unit() {
    let base = spawn_gateway(gateway_router()).await;
    let client = authenticated_client(&base).await;

    client.cancel_command(3).await.unwrap();
}

#[tokio::test]
async fn stock_endpoints_round_the_batch_through() {
    let base = spawn_gateway(gateway_router()).await;
    let client = authenticated_client(&base).await;

    let batch = [shared::models::StockUpdate {
        product_id: 1,
        quantity: 3,
    }];
    assert!(client.check_stock(1, 3).await.unwrap());
    client.reduce_stock(&batch).await.unwrap();
    client.restore_stock(&batch).await.unwrap();
}

#[tokio::test]
async fn command_by_id_and_status_patch_use_the_expected_paths() {
    let base = spawn_gateway(gateway_router()).await;
    let client = authenticated_client(&base).await;

    let command = client.get_command(42).await.unwrap();
    assert_eq!(command.command_id, 42);
    assert_eq!(command.status, CommandStatus::Pending);
    assert_eq!(command.total_price.to_string(), "21.5");
    assert_eq!(command.items[0].price.to_string(), "10.75");

    // The PATCH payload carries the wire-format status name
    let shipped = client
        .update_command_status(42, CommandStatus::Shipped)
        .await
        .unwrap();
    assert_eq!(shipped.status, CommandStatus::Shipped);
}

#[tokio::test]
async fn user_updates_carry_the_expected_payloads() {
    let base = spawn_gateway(gateway_router()).await;
    let client = authenticated_client(&base).await;

    // PUT sends only the populated fields
    let updated = client
        .update_user(
            "u-9",
            &UpdateUserRequest {
                email: Some("bob@corp.example".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.id, "u-9");
    assert_eq!(updated.email, "bob@corp.example");

    let disabled = client.set_user_enabled("u-9", false).await.unwrap();
    assert!(!disabled.enabled);
}

#[tokio::test]
async fn registration_never_carries_a_token() {
    let base = spawn_gateway(gateway_router()).await;
    let client = authenticated_client(&base).await;

    let response = client
        .register(&shared::models::CreateUserRequest {
            username: "newcomer".into(),
            email: "new@example.com".into(),
            first_name: "New".into(),
            last_name: "Comer".into(),
            password: "hunter2hunter2".into(),
        })
        .await
        .unwrap();
    assert_eq!(response.username, "newcomer");
}
