//! CLI integration tests against a mock storefront API.

mod common;

use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{run_cli, run_cli_with_env, run_cli_with_env_success};

fn api_url(server: &MockServer) -> String {
    format!("http://127.0.0.1:{}", server.address().port())
}

fn home() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    std::fs::create_dir_all(temp_dir.path().join("data")).unwrap();
    temp_dir
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/auth/otp/verify"))
        .and(body_partial_json(json!({ "phone": "+998901234567", "code": "123456" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": "access-1",
            "refreshToken": "refresh-1"
        })))
        .mount(server)
        .await;
}

fn login(home: &TempDir, api: &str) {
    run_cli_with_env_success(
        &[
            "auth",
            "verify-otp",
            "--phone",
            "+998 90 123 45 67",
            "--code",
            "123456",
        ],
        home.path(),
        api,
    );
}

#[test]
fn test_help_lists_commands() {
    let output = run_cli(&["--help"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("auth"));
    assert!(stdout.contains("catalog"));
}

#[test]
fn test_rejects_plain_http_api() {
    let home = home();
    let output = run_cli_with_env(
        &["catalog", "product", "1"],
        home.path(),
        "http://api.bazaar.market",
    );

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid API URL"));
}

#[test]
fn test_rejects_bad_sort() {
    let home = home();
    let output = run_cli_with_env(
        &["catalog", "browse", "--sort", "rating:up"],
        home.path(),
        "http://127.0.0.1:1",
    );
    assert!(!output.status.success());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_login_whoami_logout() {
    let server = MockServer::start().await;
    let api = api_url(&server);
    mount_login(&server).await;

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

    let home = home();
    login(&home, &api);

    let stdout = run_cli_with_env_success(&["auth", "whoami"], home.path(), &api);
    assert!(stdout.contains("42"));
    assert!(stdout.contains("Ali"));

    run_cli_with_env_success(&["auth", "logout"], home.path(), &api);

    let output = run_cli_with_env(&["auth", "whoami"], home.path(), &api);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("No active session"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_send_otp_has_no_token() {
    let server = MockServer::start().await;
    let api = api_url(&server);

    Mock::given(method("POST"))
        .and(path("/auth/otp/send"))
        .and(body_partial_json(json!({ "phone": "+998901234567" })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let home = home();
    let stdout = run_cli_with_env_success(
        &["auth", "send-otp", "--phone", "+998901234567"],
        home.path(),
        &api,
    );
    assert!(stdout.contains("Code sent"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_expired_session_asks_for_login() {
    let server = MockServer::start().await;
    let api = api_url(&server);
    mount_login(&server).await;

    Mock::given(method("GET"))
        .and(path("/users/me"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "message": "Invalid refresh token"
        })))
        .mount(&server)
        .await;

    let home = home();
    login(&home, &api);

    let output = run_cli_with_env(&["auth", "whoami"], home.path(), &api);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Not logged in"));

    // The stored pair was cleared.
    let output = run_cli_with_env(&["auth", "whoami"], home.path(), &api);
    assert!(String::from_utf8_lossy(&output.stderr).contains("No active session"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_browse_with_filters() {
    let server = MockServer::start().await;
    let api = api_url(&server);

    Mock::given(method("GET"))
        .and(path("/categories/cars/properties"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "key": "color", "type": "select", "options": ["red", "blue"] }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/products/filter"))
        .and(body_partial_json(json!({
            "categoryId": "cars",
            "minPrice": 100000,
            "maxPrice": 500000,
            "properties": [{ "key": "color", "value": "red" }],
            "sortBy": "price",
            "sortOrder": "asc",
            "page": 1,
            "limit": 5
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                { "id": 1, "title": "Red hatchback", "price": 120000 },
                { "id": 2, "title": "Red sedan", "price": 450000 }
            ],
            "total": 2
        })))
        .expect(1)
        .mount(&server)
        .await;

    let home = home();
    let stdout = run_cli_with_env_success(
        &[
            "catalog",
            "browse",
            "--category",
            "cars",
            "--min-price",
            "100000",
            "--max-price",
            "500000",
            "--prop",
            "color=red",
            "--sort",
            "price:asc",
            "--page-size",
            "5",
            "--json",
        ],
        home.path(),
        &api,
    );

    let titles: Vec<String> = stdout
        .lines()
        .map(|line| serde_json::from_str::<serde_json::Value>(line).unwrap())
        .map(|product| product["title"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(titles, vec!["Red hatchback", "Red sedan"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_browse_rejects_unknown_property_value() {
    let server = MockServer::start().await;
    let api = api_url(&server);

    Mock::given(method("GET"))
        .and(path("/categories/cars/properties"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "key": "color", "type": "select", "options": ["red", "blue"] }
        ])))
        .mount(&server)
        .await;
    Mock::given(path("/products/filter"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let home = home();
    let output = run_cli_with_env(
        &["catalog", "browse", "--category", "cars", "--prop", "color=green"],
        home.path(),
        &api,
    );
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("color"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_browse_search_from_url_pages() {
    let server = MockServer::start().await;
    let api = api_url(&server);

    for page in 1..=2 {
        Mock::given(method("POST"))
            .and(path("/products/filter"))
            .and(body_partial_json(json!({ "title": "lamp", "page": page })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{ "id": page, "title": format!("Lamp {}", page), "price": 10 }],
                "total": 2
            })))
            .expect(1)
            .mount(&server)
            .await;
    }

    let home = home();
    let output = run_cli_with_env(
        &[
            "catalog",
            "browse",
            "--from-url",
            "https://bazaar.market/catalog?q=lamp&tab=new",
            "--page-size",
            "1",
            "--pages",
            "5",
        ],
        home.path(),
        &api,
    );
    assert!(
        output.status.success(),
        "browse failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Lamp 1"));
    assert!(stdout.contains("Lamp 2"));
    assert!(String::from_utf8_lossy(&output.stderr).contains("q=lamp"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_product_json() {
    let server = MockServer::start().await;
    let api = api_url(&server);

    Mock::given(method("GET"))
        .and(path("/products/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 7,
            "title": "Bicycle",
            "price": 250000,
            "description": "barely used"
        })))
        .mount(&server)
        .await;

    let home = home();
    let stdout = run_cli_with_env_success(&["catalog", "product", "7"], home.path(), &api);
    let product: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(product["title"], "Bicycle");
    assert_eq!(product["description"], "barely used");
}
