//! Error normalization and the demo fallback.
//!
//! Run with: cargo test -p gearhub-integration-tests --test fallback_and_errors

use axum::http::StatusCode;
use gearhub_client::fallback::{DEMO_LOGIN_MESSAGE, DEMO_PASSWORD, DEMO_PRODUCTS_MESSAGE};
use gearhub_client::mirror::{Access, ProductListScreen, ProductScope};
use gearhub_client::{ApiClient, ClientError, SessionStore};
use gearhub_core::models::ProductQuery;
use gearhub_core::{ProductId, Role};
use gearhub_integration_tests::{Mode, StubBackend, unreachable_config};
use secrecy::SecretString;

fn demo_client(stub: &StubBackend) -> ApiClient {
    ApiClient::new(
        &stub.config().with_demo_fallback(true),
        SessionStore::in_memory(),
    )
    .expect("client")
}

// ============================================================================
// Error normalization
// ============================================================================

#[tokio::test]
async fn test_html_error_page_is_protocol_error() {
    let stub = StubBackend::spawn().await;
    stub.set_mode(Mode::Html);

    let err = stub
        .client()
        .list_products(&ProductQuery::new(10))
        .await
        .expect_err("html body");

    match &err {
        ClientError::Protocol { status, detail } => {
            assert_eq!(*status, 502);
            assert!(
                detail.starts_with("Server returned non-JSON response: <html>"),
                "{detail}"
            );
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.is_backend_unavailable());
}

#[tokio::test]
async fn test_bare_error_status_gets_default_fields() {
    let stub = StubBackend::spawn().await;
    stub.set_mode(Mode::Outage(StatusCode::SERVICE_UNAVAILABLE));

    let err = stub
        .client()
        .get_product(ProductId::new(1))
        .await
        .expect_err("outage");

    match err {
        ClientError::Api {
            status,
            code,
            message,
            origin_message,
        } => {
            assert_eq!(status, 503);
            assert_eq!(code, "E503");
            assert_eq!(message, "An error occurred");
            assert_eq!(origin_message, "Service Unavailable");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_server_error_fields_are_kept() {
    let stub = StubBackend::spawn().await;
    let client = stub.signed_in("customer").await;

    let err = client
        .add_to_cart(gearhub_core::VariantId::new(12), 1)
        .await
        .expect_err("out of stock");

    match err {
        ClientError::Api {
            status,
            code,
            message,
            origin_message,
        } => {
            assert_eq!(status, 400);
            assert_eq!(code, "CART_001");
            assert_eq!(message, "Insufficient stock");
            assert_eq!(origin_message, "Bad Request");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_unreachable_backend_is_network_error() {
    let client = ApiClient::new(&unreachable_config(), SessionStore::in_memory()).expect("client");

    let err = client
        .list_products(&ProductQuery::new(10))
        .await
        .expect_err("connection refused");

    assert!(matches!(err, ClientError::Network(_)));
    assert!(err.status().is_none());
    assert!(!client.demo_mode().is_active());
}

// ============================================================================
// Demo login
// ============================================================================

#[tokio::test]
async fn test_demo_login_when_backend_unreachable() {
    let client = ApiClient::new(
        &unreachable_config().with_demo_fallback(true),
        SessionStore::in_memory(),
    )
    .expect("client");

    let response = client
        .login("staff", &SecretString::from(DEMO_PASSWORD))
        .await
        .expect("demo login");

    assert_eq!(response.message, DEMO_LOGIN_MESSAGE);
    assert!(response.data.token.starts_with("demo_token_"));
    assert!(client.demo_mode().is_active());
    assert_eq!(Access::Staff.check(&client).await.expect("staff"), Role::Moderator);
}

#[tokio::test]
async fn test_demo_login_rejects_other_passwords() {
    let client = ApiClient::new(
        &unreachable_config().with_demo_fallback(true),
        SessionStore::in_memory(),
    )
    .expect("client");

    let err = client
        .login("staff", &SecretString::from("staff123"))
        .await
        .expect_err("demo password only");

    assert_eq!(err.message(), "Invalid credentials");
    assert!(!client.session().is_authenticated().await);
}

#[tokio::test]
async fn test_live_rejection_never_falls_back() {
    let stub = StubBackend::spawn().await;
    let client = demo_client(&stub);

    let err = client
        .login("customer", &SecretString::from(DEMO_PASSWORD))
        .await
        .expect_err("live backend said no");

    assert_eq!(err.status(), Some(401));
    assert!(!client.demo_mode().is_active());
}

// ============================================================================
// Demo catalog
// ============================================================================

#[tokio::test]
async fn test_outage_serves_demo_catalog() {
    let stub = StubBackend::spawn().await;
    stub.set_mode(Mode::Outage(StatusCode::BAD_GATEWAY));
    let client = demo_client(&stub);
    let mut screen = ProductListScreen::new(ProductScope::Catalog, 5);
    screen.set_keyword("sony");

    screen.refresh(&client).await.expect("demo data");

    let page = screen.page().expect("loaded");
    assert!(page.is_consistent());
    assert_eq!(page.total_elements, 2);
    assert!(page.items.iter().all(|p| p.brand_name.as_deref() == Some("Sony")));
    assert_eq!(screen.mirror().message(), Some(DEMO_PRODUCTS_MESSAGE));
    assert!(client.demo_mode().is_active());
}

#[tokio::test]
async fn test_client_error_status_is_not_papered_over() {
    let stub = StubBackend::spawn().await;
    stub.set_mode(Mode::Outage(StatusCode::NOT_FOUND));
    let client = demo_client(&stub);

    let err = client
        .list_products(&ProductQuery::new(10))
        .await
        .expect_err("404 is a real answer");

    assert_eq!(err.status(), Some(404));
    assert!(!client.demo_mode().is_active());
}

#[tokio::test]
async fn test_fallback_disabled_surfaces_outage() {
    let stub = StubBackend::spawn().await;
    stub.set_mode(Mode::Html);

    let err = stub
        .client()
        .list_products(&ProductQuery::new(10))
        .await
        .expect_err("no fallback configured");

    assert!(matches!(err, ClientError::Protocol { .. }));
}

#[tokio::test]
async fn test_product_detail_has_no_demo_copy() {
    let stub = StubBackend::spawn().await;
    stub.set_mode(Mode::Outage(StatusCode::SERVICE_UNAVAILABLE));
    let client = demo_client(&stub);

    let err = client
        .get_product(ProductId::new(9))
        .await
        .expect_err("detail is live only");

    assert_eq!(err.status(), Some(503));
    assert!(!client.demo_mode().is_active());
}

#[tokio::test]
async fn test_demo_flag_is_shared_between_clones() {
    let stub = StubBackend::spawn().await;
    stub.set_mode(Mode::Html);
    let client = demo_client(&stub);
    let clone = client.clone();

    clone
        .list_products(&ProductQuery::new(10))
        .await
        .expect("demo data");

    assert!(client.demo_mode().is_active());
}
