//! Sign-in, registration, profile and session persistence.
//!
//! Run with: cargo test -p gearhub-integration-tests --test auth_session

use std::path::PathBuf;
use std::sync::Arc;

use gearhub_client::mirror::{
    Access, MirrorError, OrderListScreen, OrderScope, ProductListScreen, ProductScope,
    ProfileScreen, register, sign_in,
};
use gearhub_client::{ApiClient, ClientError, FileSessionStorage, SessionStore};
use gearhub_core::Role;
use gearhub_core::models::{ChangePasswordRequest, ProfileUpdate, RegisterRequest};
use gearhub_integration_tests::StubBackend;
use secrecy::SecretString;

fn session_path(test: &str) -> PathBuf {
    std::env::temp_dir()
        .join(format!("gearhub-it-{}-{test}", std::process::id()))
        .join("session.json")
}

fn file_client(stub: &StubBackend, path: &PathBuf) -> ApiClient {
    let store = SessionStore::new(Arc::new(FileSessionStorage::new(path.clone())));
    ApiClient::new(&stub.config(), store).expect("client")
}

// ============================================================================
// Sign-in
// ============================================================================

#[tokio::test]
async fn test_login_sends_bearer_token_afterwards() {
    let stub = StubBackend::spawn().await;
    let client = stub.client();

    let response = sign_in(&client, " customer ", &SecretString::from("customer123"))
        .await
        .expect("sign in");
    assert_eq!(response.message, "Login successful");
    assert_eq!(response.data.role_id, Role::User);

    let user = client.current_user().await.expect("signed in");
    assert_eq!(user.username, "customer");

    let mut profile = ProfileScreen::new();
    profile.refresh(&client).await.expect("profile");

    let state = stub.state();
    let login = state.requests_to("/auth/login");
    assert_eq!(login.first().and_then(|r| r.authorization.clone()), None);
    let fetch = state.requests_to("/user/profile");
    assert_eq!(
        fetch.first().and_then(|r| r.authorization.as_deref()),
        Some("Bearer token-customer")
    );
}

#[tokio::test]
async fn test_wrong_password_keeps_session_empty() {
    let stub = StubBackend::spawn().await;
    let client = stub.client();

    let err = sign_in(&client, "customer", &SecretString::from("nope"))
        .await
        .expect_err("bad password");

    match err {
        MirrorError::Client(ClientError::Api { status, code, .. }) => {
            assert_eq!(status, 401);
            assert_eq!(code, "AUTH_001");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!client.session().is_authenticated().await);
    assert!(!client.demo_mode().is_active());
}

#[tokio::test]
async fn test_blank_credentials_never_reach_server() {
    let stub = StubBackend::spawn().await;
    let client = stub.client();

    let err = sign_in(&client, "  ", &SecretString::from("x"))
        .await
        .expect_err("blank username");
    assert!(matches!(err, MirrorError::Invalid(_)));
    assert_eq!(stub.request_count(), 0);
}

#[tokio::test]
async fn test_logout_clears_session() {
    let stub = StubBackend::spawn().await;
    let client = stub.signed_in("admin").await;

    client.logout().await.expect("logout");

    assert!(client.current_user().await.is_none());
    assert!(matches!(
        Access::SignedIn.check(&client).await,
        Err(MirrorError::NotSignedIn)
    ));
}

// ============================================================================
// Registration
// ============================================================================

fn registration(username: &str) -> RegisterRequest {
    RegisterRequest {
        username: username.to_string(),
        email: format!("{username}@example.com"),
        password: "hunter22".to_string(),
        confirm_password: "hunter22".to_string(),
        name: "New Shopper".to_string(),
        phone: String::new(),
        shipping_address: String::new(),
    }
}

#[tokio::test]
async fn test_register_without_token_stays_signed_out() {
    let stub = StubBackend::spawn().await;
    let client = stub.client();

    let response = register(&client, &registration("newbie"))
        .await
        .expect("register");

    assert_eq!(response.data.username, "newbie");
    assert!(!client.session().is_authenticated().await);
    assert!(stub.state().profiles.iter().any(|p| p.username == "newbie"));
}

#[tokio::test]
async fn test_register_duplicate_reports_server_message() {
    let stub = StubBackend::spawn().await;

    let err = register(&stub.client(), &registration("customer"))
        .await
        .expect_err("duplicate");

    assert_eq!(err.message(), "Username already exists");
}

#[tokio::test]
async fn test_register_mismatched_passwords_refused_locally() {
    let stub = StubBackend::spawn().await;
    let mut form = registration("newbie");
    form.confirm_password = "hunter23".to_string();

    let err = register(&stub.client(), &form).await.expect_err("mismatch");

    assert!(matches!(err, MirrorError::Invalid(_)));
    assert_eq!(stub.request_count(), 0);
}

// ============================================================================
// Profile
// ============================================================================

#[tokio::test]
async fn test_profile_save_adopts_server_copy() {
    let stub = StubBackend::spawn().await;
    let client = stub.signed_in("customer").await;
    let mut screen = ProfileScreen::new();

    let update = ProfileUpdate {
        phone: Some("0901234567".to_string()),
        shipping_address: Some("7 Le Loi, District 1".to_string()),
        ..ProfileUpdate::default()
    };
    screen.save(&client, &update).await.expect("save");

    let profile = screen.profile().expect("loaded");
    assert_eq!(profile.phone.as_deref(), Some("0901234567"));
    assert_eq!(profile.name.as_deref(), Some("customer account"));
}

#[tokio::test]
async fn test_change_password_with_wrong_current_password() {
    let stub = StubBackend::spawn().await;
    let client = stub.signed_in("customer").await;
    let mut screen = ProfileScreen::new();
    let mut form = ChangePasswordRequest {
        current_password: "wrong".to_string(),
        new_password: "longer-secret".to_string(),
        confirm_password: "longer-secret".to_string(),
    };

    let err = screen
        .change_password(&client, &form)
        .await
        .expect_err("wrong current password");
    assert_eq!(err.message(), "Current password is incorrect");

    form.current_password = "customer123".to_string();
    screen
        .change_password(&client, &form)
        .await
        .expect("change password");
    assert_eq!(screen.mirror().message(), Some("Password changed successfully"));
}

// ============================================================================
// Role gating
// ============================================================================

#[tokio::test]
async fn test_customer_denied_back_office_without_network() {
    let stub = StubBackend::spawn().await;
    let client = stub.signed_in("customer").await;
    let before = stub.request_count();

    let mut products = ProductListScreen::new(ProductScope::Admin, 10);
    let err = products.refresh(&client).await.expect_err("admin only");
    assert!(matches!(err, MirrorError::AccessDenied("admin")));

    let mut orders = OrderListScreen::new(OrderScope::Staff, 10);
    let err = orders.refresh(&client).await.expect_err("staff only");
    assert!(matches!(err, MirrorError::AccessDenied("staff")));

    assert_eq!(stub.request_count(), before);
}

#[tokio::test]
async fn test_staff_reaches_staff_but_not_admin() {
    let stub = StubBackend::spawn().await;
    let client = stub.signed_in("staff").await;

    let mut staff = ProductListScreen::new(ProductScope::Staff, 5);
    staff.refresh(&client).await.expect("staff products");
    assert_eq!(staff.page().map(|p| p.items.len()), Some(5));

    let mut admin = ProductListScreen::new(ProductScope::Admin, 5);
    assert!(matches!(
        admin.refresh(&client).await,
        Err(MirrorError::AccessDenied("admin"))
    ));
}

#[tokio::test]
async fn test_server_still_enforces_roles() {
    let stub = StubBackend::spawn().await;
    let client = stub.signed_in("customer").await;

    let err = client
        .admin_list_categories()
        .await
        .expect_err("forbidden");

    assert_eq!(err.status(), Some(403));
    assert_eq!(err.message(), "Access denied");
}

// ============================================================================
// Persistence
// ============================================================================

#[tokio::test]
async fn test_session_survives_restart() {
    let stub = StubBackend::spawn().await;
    let path = session_path("restart");
    let _ = std::fs::remove_file(&path);

    let first = file_client(&stub, &path);
    first
        .login("admin", &SecretString::from("admin123"))
        .await
        .expect("login");
    assert!(path.exists());

    let second = file_client(&stub, &path);
    let restored = second.session().restore().await.expect("restore");
    assert_eq!(restored.map(|u| u.role), Some(Role::Admin));
    assert_eq!(
        Access::Admin.check(&second).await.expect("admin"),
        Role::Admin
    );

    second.logout().await.expect("logout");
    assert!(!path.exists());

    let third = file_client(&stub, &path);
    assert!(third.session().restore().await.expect("restore").is_none());
}

#[tokio::test]
async fn test_unwritable_session_file_fails_login_cleanly() {
    let stub = StubBackend::spawn().await;
    let blocker = std::env::temp_dir().join(format!("gearhub-it-{}-blocker", std::process::id()));
    std::fs::write(&blocker, b"not a directory").expect("write blocker");
    let path = blocker.join("session.json");

    let client = file_client(&stub, &path);
    let err = client
        .login("customer", &SecretString::from("customer123"))
        .await
        .expect_err("session cannot be saved");

    assert!(matches!(err, ClientError::Storage(_)));
    assert!(!client.session().is_authenticated().await);
    assert!(client.current_user().await.is_none());
    let _ = std::fs::remove_file(&blocker);
}

#[tokio::test]
async fn test_corrupt_session_file_is_reported() {
    let stub = StubBackend::spawn().await;
    let path = session_path("corrupt");
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).expect("create dir");
    }
    std::fs::write(&path, b"{not json").expect("write");

    let client = file_client(&stub, &path);
    let err = client.session().restore().await.expect_err("corrupt");

    assert!(err.to_string().contains("corrupt"));
    assert!(!client.session().is_authenticated().await);
    let _ = std::fs::remove_file(&path);
}
