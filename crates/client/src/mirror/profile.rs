//! Profile screen plus the sign-in and registration forms.

use gearhub_core::ApiResponse;
use gearhub_core::models::{
    ChangePasswordRequest, LoginResponse, Profile, ProfileUpdate, RegisterRequest, RegisterResponse,
};
use gearhub_core::validation::{validate_password_change, validate_registration};
use secrecy::{ExposeSecret, SecretString};

use super::{Access, Mirror, MirrorError};
use crate::client::ApiClient;

/// Submit the sign-in form.
///
/// # Errors
///
/// Returns `MirrorError::Invalid` for a blank field, or the client error.
pub async fn sign_in(
    client: &ApiClient,
    username: &str,
    password: &SecretString,
) -> Result<ApiResponse<LoginResponse>, MirrorError> {
    if username.trim().is_empty() {
        return Err(gearhub_core::validation::ValidationError::Required("username").into());
    }
    if password.expose_secret().is_empty() {
        return Err(gearhub_core::validation::ValidationError::Required("password").into());
    }
    Ok(client.login(username.trim(), password).await?)
}

/// Submit the registration form. The form is validated locally first.
///
/// # Errors
///
/// Returns `MirrorError::Invalid` or the client error.
pub async fn register(
    client: &ApiClient,
    form: &RegisterRequest,
) -> Result<ApiResponse<RegisterResponse>, MirrorError> {
    validate_registration(form)?;
    Ok(client.register(form).await?)
}

/// The signed-in user's profile.
#[derive(Debug, Default)]
pub struct ProfileScreen {
    mirror: Mirror<Profile>,
}

impl ProfileScreen {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            mirror: Mirror::new(),
        }
    }

    #[must_use]
    pub const fn mirror(&self) -> &Mirror<Profile> {
        &self.mirror
    }

    #[must_use]
    pub const fn profile(&self) -> Option<&Profile> {
        self.mirror.data()
    }

    /// # Errors
    ///
    /// Returns `MirrorError::NotSignedIn` without any network call, or the
    /// fetch error.
    pub async fn refresh(&mut self, client: &ApiClient) -> Result<(), MirrorError> {
        Access::SignedIn.check(client).await?;
        let generation = self.mirror.begin_fetch();
        let result = client.get_profile().await;
        self.mirror.settle(generation, result).map(|_| ())
    }

    /// Save edits; the profile the server returns replaces the local copy.
    ///
    /// # Errors
    ///
    /// Returns `MirrorError::InvalidInput` for an empty update,
    /// `MirrorError::NotSignedIn`, or the server error.
    pub async fn save(&mut self, client: &ApiClient, update: &ProfileUpdate) -> Result<(), MirrorError> {
        if update.is_empty() {
            return Err(self
                .mirror
                .refuse(MirrorError::InvalidInput("nothing to update".to_string())));
        }
        Access::SignedIn.check(client).await?;
        self.mirror.begin_mutation()?;
        let result = client.update_profile(update).await;
        let response = self.mirror.end_mutation(result)?;
        self.mirror.set_loaded(response.data);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns a validation error, `MirrorError::NotSignedIn`, or the server
    /// error (for example a wrong current password).
    pub async fn change_password(
        &mut self,
        client: &ApiClient,
        form: &ChangePasswordRequest,
    ) -> Result<(), MirrorError> {
        if let Err(err) = validate_password_change(form) {
            return Err(self.mirror.refuse(err.into()));
        }
        Access::SignedIn.check(client).await?;
        self.mirror.begin_mutation()?;
        let result = client.change_password(form).await;
        self.mirror.end_mutation(result).map(|_| ())
    }
}
