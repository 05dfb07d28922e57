//! Profile commands.

use gearhub_client::ApiClient;
use gearhub_client::mirror::ProfileScreen;
use gearhub_core::models::{ChangePasswordRequest, Profile, ProfileUpdate};

use super::CommandError;

fn print_profile(profile: &Profile) {
    tracing::info!("{} (user {})", profile.username, profile.user_id);
    tracing::info!("  Name:    {}", profile.name.as_deref().unwrap_or("-"));
    tracing::info!("  Email:   {}", profile.email);
    tracing::info!("  Phone:   {}", profile.phone.as_deref().unwrap_or("-"));
    tracing::info!(
        "  Address: {}",
        profile.shipping_address.as_deref().unwrap_or("-")
    );
}

pub async fn show(client: &ApiClient) -> Result<(), CommandError> {
    let mut screen = ProfileScreen::new();
    screen.refresh(client).await?;
    if let Some(profile) = screen.profile() {
        print_profile(profile);
    }
    Ok(())
}

pub async fn update(client: &ApiClient, update: &ProfileUpdate) -> Result<(), CommandError> {
    let mut screen = ProfileScreen::new();
    screen.save(client, update).await?;
    if let Some(profile) = screen.profile() {
        print_profile(profile);
    }
    Ok(())
}

pub async fn change_password(
    client: &ApiClient,
    form: &ChangePasswordRequest,
) -> Result<(), CommandError> {
    let mut screen = ProfileScreen::new();
    screen.change_password(client, form).await?;
    tracing::info!(
        "{}",
        screen.mirror().message().unwrap_or("Password changed")
    );
    Ok(())
}
