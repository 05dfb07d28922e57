//! Authentication and profile operations.

use gearhub_core::ApiResponse;
use gearhub_core::models::{
    ChangePasswordRequest, LoginRequest, LoginResponse, Profile, ProfileUpdate, RegisterRequest,
    RegisterResponse,
};
use secrecy::{ExposeSecret, SecretString};
use tracing::instrument;

use super::ApiClient;
use crate::error::ClientError;
use crate::fallback;

impl ApiClient {
    /// Log in and start a session.
    ///
    /// When the backend is unavailable and the demo fallback is enabled, the
    /// credentials are checked against the demo accounts instead and demo
    /// mode is switched on.
    ///
    /// # Errors
    ///
    /// Returns the transport error, or `ClientError::Demo` when the demo
    /// accounts reject the credentials.
    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<ApiResponse<LoginResponse>, ClientError> {
        let request = LoginRequest {
            username: username.to_string(),
            password: password.expose_secret().to_string(),
        };

        let response = match self.transport().post("/auth/login", &request).await {
            Ok(response) => response,
            Err(err) if self.should_fall_back(&err) => {
                tracing::warn!(error = %err, "login failed, trying demo accounts");
                let response = fallback::login(username, password.expose_secret())?;
                self.inner.demo.activate();
                response
            }
            Err(err) => return Err(err),
        };

        self.inner.session.set_on_login(&response.data).await?;
        tracing::info!(user_id = %response.data.user_id, role = %response.data.role_id, "logged in");
        Ok(response)
    }

    /// Create an account. Starts a session if the backend returns a token.
    ///
    /// # Errors
    ///
    /// Returns the transport error; there is no demo fallback.
    #[instrument(skip(self, form), fields(username = %form.username))]
    pub async fn register(
        &self,
        form: &RegisterRequest,
    ) -> Result<ApiResponse<RegisterResponse>, ClientError> {
        let response: ApiResponse<RegisterResponse> =
            self.transport().post("/auth/register", form).await?;
        self.inner.session.set_on_register(&response.data).await?;
        Ok(response)
    }

    /// End the session locally.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Storage` if the stored session cannot be removed.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), ClientError> {
        self.inner.session.clear_on_logout().await?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns the transport error.
    #[instrument(skip(self))]
    pub async fn get_profile(&self) -> Result<ApiResponse<Profile>, ClientError> {
        self.transport().get("/user/profile", &[]).await
    }

    /// # Errors
    ///
    /// Returns the transport error.
    #[instrument(skip(self, update))]
    pub async fn update_profile(
        &self,
        update: &ProfileUpdate,
    ) -> Result<ApiResponse<Profile>, ClientError> {
        self.transport().put("/user/profile", update).await
    }

    /// # Errors
    ///
    /// Returns the transport error.
    #[instrument(skip(self, form))]
    pub async fn change_password(
        &self,
        form: &ChangePasswordRequest,
    ) -> Result<ApiResponse<()>, ClientError> {
        self.transport()
            .send_unit(
                reqwest::Method::PUT,
                "/user/change-password",
                crate::transport::Body::json(form)?,
            )
            .await
    }
}
