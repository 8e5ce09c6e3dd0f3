//! Auth route handlers.
//!
//! Thin glue over the backend's token issuance: the login form forwards
//! credentials to `POST /api/auth/login` and stores the issued bearer
//! token in the session. Checkout and order routes read it from there.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use arana_core::Email;

use crate::api::ApiError;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::state::AppState;

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
    pub next: Option<String>,
}

/// Login page query parameters.
#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub next: Option<String>,
}

/// Display the login page.
#[instrument]
pub async fn login_page(Query(query): Query<LoginQuery>) -> LoginTemplate {
    LoginTemplate {
        error: None,
        next: sanitize_next(query.next),
    }
}

/// Log in against the backend and store the issued token in the session.
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let next = sanitize_next(form.next);

    let Ok(email) = Email::parse(&form.email) else {
        return Ok(LoginTemplate {
            error: Some("Please enter a valid email address".to_string()),
            next,
        }
        .into_response());
    };

    match state.api().login(&email, &form.password).await {
        Ok(issued) => {
            set_current_user(
                &session,
                &CurrentUser {
                    id: issued.user_id,
                    email: issued.email,
                    token: issued.token,
                },
            )
            .await?;

            Ok(Redirect::to(next.as_deref().unwrap_or("/products")).into_response())
        }
        Err(ApiError::Unauthorized) => Ok(LoginTemplate {
            error: Some("Invalid email or password".to_string()),
            next,
        }
        .into_response()),
        Err(e) => Err(AppError::Api(e)),
    }
}

/// Log out: drop the credential, keep the cart.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Redirect> {
    clear_current_user(&session).await?;
    Ok(Redirect::to("/"))
}

/// Only allow same-site relative redirect targets.
fn sanitize_next(next: Option<String>) -> Option<String> {
    next.filter(|n| n.starts_with('/') && !n.starts_with("//"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_next_allows_relative_paths() {
        assert_eq!(
            sanitize_next(Some("/cart".to_string())),
            Some("/cart".to_string())
        );
    }

    #[test]
    fn test_sanitize_next_rejects_external_targets() {
        assert_eq!(sanitize_next(Some("https://evil.example".to_string())), None);
        assert_eq!(sanitize_next(Some("//evil.example".to_string())), None);
    }
}
