//! Sign-in, sign-up and sign-out as the screens drive them.

use anyhow::Result;
use tracing::{error, info};

use super::session::{SessionError, SessionStore, User};
use crate::api::{ApiClient, ApiError};
use crate::models::{AccountUser, SignInCredentials, SignUpData};
use crate::routes::Route;

/// Shown when a failure carries no more specific explanation
const GENERIC_LOGIN_FAILURE: &str = "Login failed. Please check your credentials.";

const MISSING_CREDENTIALS: &str = "Email and password required";

const GENERIC_SIGNUP_FAILURE: &str = "Registration failed. Please try again.";

/// Shown on the sign-in screen after a successful registration
pub const REGISTERED: &str = "Registration successful! Please sign in.";

/// Exchange credentials for a token and start a session.
///
/// The session is only touched once the backend has accepted the credentials,
/// so a rejected login leaves the previous state intact.
pub async fn sign_in(
    api: &ApiClient,
    session: &SessionStore,
    credentials: &SignInCredentials,
) -> Result<User> {
    if credentials.email.is_empty() || credentials.password.is_empty() {
        return Err(anyhow::anyhow!(MISSING_CREDENTIALS));
    }

    let response = match api.sign_in(credentials).await {
        Ok(response) => response,
        Err(e) => {
            error!(error = %e, "Login failed");
            return Err(e);
        }
    };

    let user = User::new(credentials.email.clone());
    session
        .login(user.clone(), response.access)
        .map_err(|e| match e {
            SessionError::EmptyToken => {
                ApiError::InvalidResponse("token endpoint returned an empty access token".to_string())
            }
        })?;

    info!(email = %user.email, "Login successful");
    Ok(user)
}

/// Register an account. The session is not touched; the new user signs in
/// afterwards, so on success this reports the sign-in route.
pub async fn sign_up(api: &ApiClient, data: &SignUpData) -> Result<(AccountUser, Route)> {
    if let Some(field) = data.missing_field() {
        anyhow::bail!("{} is required", capitalize(field));
    }

    match api.sign_up(data).await {
        Ok(account) => {
            info!(email = %account.email, "Account registered");
            Ok((account, Route::SignIn))
        }
        Err(e) => {
            error!(error = %e, "Registration failed");
            Err(e)
        }
    }
}

fn capitalize(field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// End the session and report where navigation should go next.
pub fn sign_out(session: &SessionStore) -> Route {
    session.logout();
    Route::SignIn
}

/// Turn a sign-in failure into text for the sign-in screen
pub fn login_error_message(err: &anyhow::Error) -> String {
    match err.downcast_ref::<ApiError>() {
        Some(api_error) => api_error.login_message(),
        None if err.to_string() == MISSING_CREDENTIALS => MISSING_CREDENTIALS.to_string(),
        None => GENERIC_LOGIN_FAILURE.to_string(),
    }
}

/// Turn a sign-up failure into text for the sign-up screen
pub fn signup_error_message(err: &anyhow::Error) -> String {
    match err.downcast_ref::<ApiError>() {
        Some(api_error) => api_error.signup_message(),
        None if err.to_string().ends_with(" is required") => err.to_string(),
        None => GENERIC_SIGNUP_FAILURE.to_string(),
    }
}
