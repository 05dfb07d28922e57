//! Sign-in, registration and session commands.

use gearhub_client::ApiClient;
use gearhub_client::mirror;
use gearhub_core::models::RegisterRequest;
use secrecy::SecretString;

use super::{CommandError, note_demo};

/// Sign in and persist the session.
pub async fn login(client: &ApiClient, username: &str, password: String) -> Result<(), CommandError> {
    let password = SecretString::from(password);
    let response = mirror::sign_in(client, username, &password).await?;
    tracing::info!(
        "{} Signed in as {} ({})",
        response.message,
        response.data.username,
        response.data.role_id
    );
    note_demo(client);
    Ok(())
}

/// Create an account. Signs in when the backend issues a token right away.
pub async fn register(client: &ApiClient, form: &RegisterRequest) -> Result<(), CommandError> {
    let response = mirror::register(client, form).await?;
    if client.session().is_authenticated().await {
        tracing::info!("Account {} created and signed in", response.data.username);
    } else {
        tracing::info!(
            "Account {} created; sign in with `gearhub login`",
            response.data.username
        );
    }
    Ok(())
}

pub async fn logout(client: &ApiClient) -> Result<(), CommandError> {
    client.logout().await?;
    tracing::info!("Signed out");
    Ok(())
}

pub async fn whoami(client: &ApiClient) {
    match client.current_user().await {
        Some(user) => tracing::info!(
            "{} <{}> (user {}, {})",
            user.display_name(),
            user.email,
            user.user_id,
            user.role
        ),
        None => tracing::info!("Not signed in"),
    }
}
