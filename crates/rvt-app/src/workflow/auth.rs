use rvt_client::{
    ApiClient, ApiResult, Session,
    metrics::record_auth_event,
    models::{LoginResponse, RegisteredUser},
    operations::auth,
};

use crate::{
    error::ValidationError,
    validation::{validate_login, validate_register},
};

pub const LOGIN_INVALID_RESPONSE: &str = "Login failed. Invalid response from server.";
pub const REGISTER_INVALID_RESPONSE: &str = "Registration failed. Invalid response from server.";
pub const REGISTER_SUCCESS: &str = "Registration successful! Please login.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Login,
    Register,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthStatus {
    Idle,
    Submitting,
    Error(String),
    Success(String),
}

/// Login / register form controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthForm {
    mode: AuthMode,
    status: AuthStatus,
}

impl AuthForm {
    pub const fn new(mode: AuthMode) -> Self {
        Self {
            mode,
            status: AuthStatus::Idle,
        }
    }

    pub const fn mode(&self) -> AuthMode {
        self.mode
    }

    pub const fn status(&self) -> &AuthStatus {
        &self.status
    }

    pub const fn is_submitting(&self) -> bool {
        matches!(self.status, AuthStatus::Submitting)
    }

    /// Show the other form; any message from the previous one is dropped
    pub fn switch(&mut self, mode: AuthMode) {
        self.mode = mode;
        self.status = AuthStatus::Idle;
    }

    pub fn begin_login(&mut self, email: &str, password: &str) -> Result<(), ValidationError> {
        self.begin(AuthMode::Login, || validate_login(email, password))
    }

    pub fn begin_register(
        &mut self,
        email: &str,
        password: &str,
        confirm: &str,
    ) -> Result<(), ValidationError> {
        self.begin(AuthMode::Register, || {
            validate_register(email, password, confirm)
        })
    }

    fn begin(
        &mut self,
        mode: AuthMode,
        validate: impl FnOnce() -> Result<(), ValidationError>,
    ) -> Result<(), ValidationError> {
        if self.is_submitting() {
            return Err(ValidationError::Busy);
        }

        self.mode = mode;
        if let Err(e) = validate() {
            self.status = AuthStatus::Error(e.to_string());
            return Err(e);
        }

        self.status = AuthStatus::Submitting;
        Ok(())
    }

    /// Apply a login result. Returns the token once it is stored in `session`.
    pub fn finish_login(
        &mut self,
        result: ApiResult<LoginResponse>,
        session: &Session,
    ) -> Option<String> {
        let token = match result {
            Ok(LoginResponse {
                access_token: Some(token),
                ..
            }) if !token.is_empty() => token,
            Ok(_) => {
                tracing::warn!("Login response carried no access token");
                return self.fail_login(LOGIN_INVALID_RESPONSE.to_string());
            }
            Err(failure) => return self.fail_login(failure.detail()),
        };

        if let Err(e) = session.set_token(&token) {
            tracing::error!("Failed to store session token: {e}");
            return self.fail_login(e.to_string());
        }

        record_auth_event("login", true);
        self.status = AuthStatus::Success("Login successful".to_string());
        Some(token)
    }

    fn fail_login(&mut self, detail: String) -> Option<String> {
        record_auth_event("login", false);
        self.status = AuthStatus::Error(detail);
        None
    }

    /// Apply a register result. Returns `true` when the view should move on
    /// to the login form. The session is never touched.
    pub fn finish_register(&mut self, result: ApiResult<RegisteredUser>) -> bool {
        let (status, created) = match result {
            Ok(RegisteredUser { id: Some(id), .. }) => {
                tracing::info!(%id, "Account created");
                (AuthStatus::Success(REGISTER_SUCCESS.to_string()), true)
            }
            Ok(_) => (
                AuthStatus::Error(REGISTER_INVALID_RESPONSE.to_string()),
                false,
            ),
            Err(failure) => (AuthStatus::Error(failure.detail()), false),
        };

        record_auth_event("register", created);
        self.status = status;
        created
    }

    pub async fn login(
        &mut self,
        client: &ApiClient,
        email: &str,
        password: &str,
    ) -> Result<Option<String>, ValidationError> {
        self.begin_login(email, password)?;
        let result = auth::login(email, password).send(client).await;
        Ok(self.finish_login(result, client.session()))
    }

    pub async fn register(
        &mut self,
        client: &ApiClient,
        email: &str,
        password: &str,
        confirm: &str,
    ) -> Result<bool, ValidationError> {
        self.begin_register(email, password, confirm)?;
        let result = auth::register(email, password).send(client).await;
        Ok(self.finish_register(result))
    }
}
