// Authentication endpoints
//
// `auth/login` exchanges credentials for a bearer token. The token is
// handed back to the caller; storing it is the config layer's job.

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::types::{LoginRequest, LoginResponse, UserResponse};

impl ApiClient {
    /// Exchange username/password for a bearer token.
    ///
    /// `POST auth/login`
    pub async fn login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<LoginResponse, Error> {
        debug!(username, "logging in");
        let body = LoginRequest {
            username,
            password: password.expose_secret(),
        };
        self.post("auth/login", &body).await.map_err(|e| match e {
            Error::Api { status, message } if status == 400 || status == 403 || status == 422 => {
                Error::Authentication { message }
            }
            Error::SessionExpired | Error::MissingToken => Error::Authentication {
                message: "invalid username or password".into(),
            },
            other => other,
        })
    }

    /// The user the current token belongs to.
    ///
    /// `GET auth/me`
    pub async fn current_user(&self) -> Result<UserResponse, Error> {
        self.get("auth/me").await
    }
}
