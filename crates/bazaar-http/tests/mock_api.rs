//! Mock API tests for the bazaar client.
//!
//! These tests use wiremock to simulate the storefront API and exercise the
//! token refresh flow and catalog queries without network access.

use std::sync::Arc;
use std::time::Duration;

use bazaar_core::error::{AuthError, Error};
use bazaar_core::{
    ApiUrl, CatalogSource, CategoryId, CredentialPair, FilterField, ListController, ListState,
    MemoryTokenStore, PhoneNumber, PropertyFilter, PropertyKind, PropertyValue, TokenStore,
};
use bazaar_http::{ApiRequest, BazaarClient, CatalogFeed, SessionContext, SessionStatus};
use serde_json::json;
use wiremock::matchers::{body_json, body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper to create an API URL from a mock server.
fn mock_api_url(server: &MockServer) -> ApiUrl {
    ApiUrl::new(&format!("http://127.0.0.1:{}", server.address().port())).unwrap()
}

fn logged_in_store() -> Arc<MemoryTokenStore> {
    Arc::new(MemoryTokenStore::with_credentials(CredentialPair::new(
        "oldToken",
        "refresh-1",
    )))
}

fn client(server: &MockServer, store: Arc<MemoryTokenStore>) -> BazaarClient {
    let session = SessionContext::init(store).unwrap();
    BazaarClient::new(mock_api_url(server), session).unwrap()
}

fn product_json(id: u64) -> serde_json::Value {
    json!({ "id": id, "title": format!("Product {}", id), "price": 1000 * id })
}

async fn mount_unauthorized(server: &MockServer, route: &str) {
    Mock::given(path(route))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "message": "Unauthorized",
            "statusCode": 401
        })))
        .mount(server)
        .await;
}

// ============================================================================
// Token Refresh Tests
// ============================================================================

#[tokio::test]
async fn test_concurrent_401s_share_one_refresh() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/me"))
        .and(header("authorization", "Bearer newToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 1, "name": "Ali" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products/7"))
        .and(header("authorization", "Bearer newToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(product_json(7)))
        .expect(1)
        .mount(&server)
        .await;
    mount_unauthorized(&server, "/users/me").await;
    mount_unauthorized(&server, "/products/7").await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .and(body_json(json!({ "refreshToken": "refresh-1" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "accessToken": "newToken" }))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let store = logged_in_store();
    let client = client(&server, store.clone());

    let (me, product) = tokio::join!(client.me(), client.product(7));

    assert_eq!(me.unwrap().id, 1);
    assert_eq!(product.unwrap().id, 7);
    assert!(!client.session().is_refreshing());

    // Refresh token was not rotated, so the old one is kept.
    assert_eq!(
        store.load().unwrap(),
        Some(CredentialPair::new("newToken", "refresh-1"))
    );
}

#[tokio::test]
async fn test_refresh_rotates_refresh_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": "a2",
            "refreshToken": "refresh-2"
        })))
        .mount(&server)
        .await;

    let store = logged_in_store();
    let client = client(&server, store.clone());
    client.refresh().await.unwrap();

    assert_eq!(
        store.load().unwrap(),
        Some(CredentialPair::new("a2", "refresh-2"))
    );
    assert_eq!(client.session().status(), SessionStatus::Authenticated);
}

#[tokio::test]
async fn test_invalid_refresh_token_ends_session_without_refresh() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/me"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "message": "Invalid refresh token",
            "statusCode": 401
        })))
        .mount(&server)
        .await;
    Mock::given(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "accessToken": "x" })))
        .expect(0)
        .mount(&server)
        .await;

    let store = logged_in_store();
    let client = client(&server, store.clone());
    let status = client.session().subscribe();

    let err = client.me().await.unwrap_err();

    assert!(matches!(err, Error::Auth(AuthError::RefreshTokenInvalid)));
    assert!(err.requires_reauth());
    assert!(store.load().unwrap().is_none());
    assert_eq!(*status.borrow(), SessionStatus::ReauthRequired);
}

#[tokio::test]
async fn test_refresh_endpoint_rejecting_token_ends_session() {
    let server = MockServer::start().await;

    mount_unauthorized(&server, "/users/me").await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": "Forbidden",
            "message": "Invalid refresh token"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = logged_in_store();
    let client = client(&server, store.clone());

    let err = client.me().await.unwrap_err();
    assert!(matches!(err, Error::Auth(AuthError::RefreshTokenInvalid)));
    assert!(!client.session().is_authenticated());
    assert!(store.load().unwrap().is_none());
}

#[tokio::test]
async fn test_refresh_failure_rejects_all_waiters() {
    let server = MockServer::start().await;

    mount_unauthorized(&server, "/users/me").await;
    mount_unauthorized(&server, "/products/1").await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(json!({ "message": "Internal server error" }))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let store = logged_in_store();
    let client = client(&server, store.clone());

    let (me, product) = tokio::join!(client.me(), client.product(1));

    for err in [me.unwrap_err(), product.unwrap_err()] {
        assert!(
            matches!(err, Error::Auth(AuthError::RefreshFailed { .. })),
            "unexpected error: {err:?}"
        );
    }
    assert!(store.load().unwrap().is_none());
    assert_eq!(client.session().status(), SessionStatus::ReauthRequired);
}

#[tokio::test]
async fn test_retried_request_is_not_refreshed_twice() {
    let server = MockServer::start().await;

    mount_unauthorized(&server, "/products/3").await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "accessToken": "newToken" })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server, logged_in_store());
    let err = client.product(3).await.unwrap_err();

    match err {
        Error::Protocol(p) => assert_eq!(p.status, 401),
        other => panic!("expected protocol error, got {other:?}"),
    }
    // The refresh itself succeeded, so the session survives.
    assert!(client.session().is_authenticated());
}

#[tokio::test]
async fn test_server_error_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products/5"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "message": "boom" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client(&server, logged_in_store());
    let err = client.product(5).await.unwrap_err();

    let message = err.to_string();
    assert!(message.contains("500"));
    assert!(message.contains("boom"));
}

// ============================================================================
// Authentication Tests
// ============================================================================

#[tokio::test]
async fn test_credential_endpoints_never_send_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/otp/send"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;

    let client = client(&server, logged_in_store());
    let phone = PhoneNumber::new("+998901234567").unwrap();
    client.send_otp(&phone).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_credential_endpoint_401_does_not_refresh() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/otp/verify"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "message": "Wrong code"
        })))
        .mount(&server)
        .await;
    Mock::given(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client(&server, Arc::new(MemoryTokenStore::new()));
    let phone = PhoneNumber::new("+998901234567").unwrap();
    let err = client.verify_otp(&phone, "000000").await.unwrap_err();

    assert!(matches!(err, Error::Auth(AuthError::InvalidCredentials)));
    assert_eq!(client.session().status(), SessionStatus::Anonymous);
}

#[tokio::test]
async fn test_verify_otp_starts_session() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/otp/verify"))
        .and(body_json(json!({ "phone": "+998901234567", "code": "123456" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": "access-1",
            "refreshToken": "refresh-1"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/me"))
        .and(header("authorization", "Bearer access-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 42,
            "name": "Ali",
            "phone": "+998901234567"
        })))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::new());
    let client = client(&server, store.clone());
    let phone = PhoneNumber::new("+998 90 123-45-67").unwrap();

    client.verify_otp(&phone, "123456").await.unwrap();
    assert_eq!(
        store.load().unwrap(),
        Some(CredentialPair::new("access-1", "refresh-1"))
    );

    let me = client.me().await.unwrap();
    assert_eq!(me.id, 42);
    assert_eq!(me.name.as_deref(), Some("Ali"));
}

#[tokio::test]
async fn test_register_starts_session() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/register"))
        .and(body_json(json!({
            "phone": "+998901234567",
            "name": "Ali",
            "code": "123456"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "accessToken": "access-1",
            "refreshToken": "refresh-1"
        })))
        .mount(&server)
        .await;

    let client = client(&server, Arc::new(MemoryTokenStore::new()));
    let phone = PhoneNumber::new("+998901234567").unwrap();
    client.register(&phone, "Ali", "123456").await.unwrap();

    assert_eq!(client.session().status(), SessionStatus::Authenticated);
}

#[tokio::test]
async fn test_me_requires_session() {
    let server = MockServer::start().await;
    let client = client(&server, Arc::new(MemoryTokenStore::new()));

    let err = client.me().await.unwrap_err();
    assert!(matches!(err, Error::Auth(AuthError::NotAuthenticated)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_anonymous_401_reports_not_authenticated() {
    let server = MockServer::start().await;

    mount_unauthorized(&server, "/products/9").await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "accessToken": "x" })))
        .expect(0)
        .mount(&server)
        .await;

    let client = client(&server, Arc::new(MemoryTokenStore::new()));
    let err = client.product(9).await.unwrap_err();

    assert!(matches!(err, Error::Auth(AuthError::NotAuthenticated)));
    assert_eq!(client.session().status(), SessionStatus::Anonymous);
    assert!(!client.session().is_refreshing());
}

#[tokio::test]
async fn test_logout_clears_store() {
    let server = MockServer::start().await;
    let store = logged_in_store();
    let client = client(&server, store.clone());

    client.logout().unwrap();
    assert!(store.load().unwrap().is_none());
    assert_eq!(client.session().status(), SessionStatus::Anonymous);
}

// ============================================================================
// Catalog Tests
// ============================================================================

#[tokio::test]
async fn test_filter_request_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/products/filter"))
        .and(header("authorization", "Bearer oldToken"))
        .and(body_partial_json(json!({
            "categoryId": "cars",
            "minPrice": 100000,
            "maxPrice": 500000,
            "properties": [{ "key": "color", "value": "red" }],
            "sortBy": "createdAt",
            "sortOrder": "desc",
            "page": 1,
            "limit": 20
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [product_json(1)],
            "total": 1
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server, logged_in_store());
    let mut feed = CatalogFeed::new(
        Arc::new(client),
        ListController::new(Some(CategoryId::new("cars")), 20),
    );

    feed.set_filter_field(FilterField::MinPrice(Some(100_000)));
    feed.set_filter_field(FilterField::MaxPrice(Some(500_000)));
    feed.set_filter_field(FilterField::Property(
        PropertyFilter::new("color", PropertyValue::Select("red".into())).unwrap(),
    ));
    assert_eq!(feed.controller().active_filter_count(), 2);

    assert!(feed.sync().unwrap());
    feed.wait_idle().await;

    assert_eq!(feed.items().count(), 1);
    assert_eq!(feed.controller().state(), &ListState::Exhausted);
}

#[tokio::test]
async fn test_feed_pages_through_results() {
    let server = MockServer::start().await;

    for page in 1..=2u64 {
        Mock::given(method("POST"))
            .and(path("/products/filter"))
            .and(body_partial_json(json!({ "page": page })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [product_json(page * 10), product_json(page * 10 + 1)],
                "total": 4
            })))
            .expect(1)
            .mount(&server)
            .await;
    }
    Mock::given(method("POST"))
        .and(path("/products/filter"))
        .and(body_partial_json(json!({ "page": 3 })))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client(&server, Arc::new(MemoryTokenStore::new()));
    let mut feed = CatalogFeed::new(Arc::new(client), ListController::new(None, 2));

    feed.sync().unwrap();
    feed.wait_idle().await;
    assert!(feed.controller().has_more());

    feed.load_next_page().await;
    assert_eq!(
        feed.items().map(|p| p.id).collect::<Vec<_>>(),
        vec![10, 11, 20, 21]
    );
    assert!(!feed.controller().has_more());
    assert!(feed.load_next_page().await.is_none());
}

#[tokio::test]
async fn test_anonymous_catalog_request_has_no_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products/9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(product_json(9)))
        .mount(&server)
        .await;

    let client = client(&server, Arc::new(MemoryTokenStore::new()));
    let product = client.product(9).await.unwrap();
    assert_eq!(product.title, "Product 9");

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_category_properties() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/categories/cars/properties"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "key": "color", "type": "select", "options": ["red", "blue"] },
            { "key": "mileage", "type": "number" }
        ])))
        .mount(&server)
        .await;

    let client = client(&server, Arc::new(MemoryTokenStore::new()));
    let properties = client
        .category_properties(&CategoryId::new("cars"))
        .await
        .unwrap();

    assert_eq!(properties.len(), 2);
    assert_eq!(properties[0].key, "color");
    assert!(matches!(properties[0].kind, PropertyKind::Select { .. }));
    let mileage = properties[1].parse_value("120000").unwrap();
    assert_eq!(mileage.value(), &PropertyValue::Number(120000.0));
}

#[tokio::test]
async fn test_raw_request_through_client() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products/1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let client = client(&server, Arc::new(MemoryTokenStore::new()));
    let value = client.send_json(&ApiRequest::get("/products/1")).await.unwrap();
    assert!(value.is_null());
}
