//! Login and logout

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::{SessionAuth, SessionUser};
use crate::client::ApiClient;
use crate::envelope::unwrap_data;
use crate::error::{ApiError, Error, ErrorKind, Result};

const LOGIN_PATH: &str = "/auth/login";

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

/// Body of a successful login
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(alias = "accessToken")]
    pub token: String,
    pub user: SessionUser,
}

/// Session lifecycle against `/auth/*`
#[derive(Debug, Clone)]
pub struct AuthService {
    client: ApiClient,
    session: SessionAuth,
}

impl AuthService {
    pub fn new(client: ApiClient, session: SessionAuth) -> Self {
        Self { client, session }
    }

    pub fn session(&self) -> &SessionAuth {
        &self.session
    }

    /// Exchange credentials for a token and persist it.
    pub async fn login(&self, username: &str, password: &str) -> Result<SessionUser> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(ApiError::new(ErrorKind::Validation, "Username and password are required").into());
        }

        let body = self
            .client
            .post(LOGIN_PATH, &LoginRequest { username: username.trim(), password })
            .await?;
        let data = unwrap_data(body)?;
        let login: LoginResponse = serde_json::from_value(data).map_err(ApiError::decode)?;

        self.session.save(&login.token, &login.user).map_err(Error::Io)?;
        info!(username = %login.user.username, "Logged in");
        Ok(login.user)
    }

    /// Forget the stored session. No request is sent.
    pub fn logout(&self) -> Result<()> {
        self.session.clear()?;
        info!("Logged out");
        Ok(())
    }

    pub fn current_user(&self) -> Option<SessionUser> {
        self.session.current_user()
    }
}
