use axum::{
    Json,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{ApiError, AppState};
use crate::db::{Role, UserInput};
use crate::session::{Claims, SESSION_COOKIE};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Serialize)]
pub struct MeResponse {
    pub user: SessionUser,
}

#[derive(Serialize)]
pub struct SessionUser {
    pub email: String,
    pub name: String,
    pub role: Role,
}

/// Verified identity attached to the request by the auth gate.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub email: String,
    pub name: String,
    pub role: Role,
}

impl From<Claims> for AuthContext {
    fn from(claims: Claims) -> Self {
        Self {
            email: claims.sub,
            name: claims.name,
            role: claims.role,
        }
    }
}

// ============================================================================
// Middleware
// ============================================================================

/// Session gate for the JSON API: extracts the session cookie, verifies the
/// token, and attaches [`AuthContext`] for downstream handlers. Missing,
/// malformed, expired, and badly signed tokens are indistinguishable to the
/// caller.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    let Some(cookie) = jar.get(SESSION_COOKIE) else {
        return Err(ApiError::Unauthorized("Not authenticated".to_string()));
    };

    let Some(claims) = state.sessions().verify(cookie.value()) else {
        return Err(ApiError::Unauthorized("Not authenticated".to_string()));
    };

    tracing::Span::current().record("user_id", claims.sub.as_str());
    request.extensions_mut().insert(AuthContext::from(claims));

    Ok(next.run(request).await)
}

const PROTECTED_PAGES: &[&str] = &["/dashboard", "/members", "/warranty", "/expired"];
const ENTRY_PAGES: &[&str] = &["/login", "/register"];

fn path_matches(path: &str, roots: &[&str]) -> bool {
    roots
        .iter()
        .any(|root| path == *root || path.strip_prefix(root).is_some_and(|r| r.starts_with('/')))
}

/// Navigation gate for the static UI paths.
///
/// Already-authenticated visitors are bounced from the login/register pages
/// to the dashboard; anonymous visitors are bounced from protected pages to
/// the login page. Everything else falls through to the static files.
pub async fn page_gate(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();

    let authenticated = jar
        .get(SESSION_COOKIE)
        .and_then(|cookie| state.sessions().verify(cookie.value()))
        .is_some();

    if path_matches(&path, ENTRY_PAGES) {
        if authenticated {
            return Redirect::to("/dashboard").into_response();
        }
        return next.run(request).await;
    }

    if path_matches(&path, PROTECTED_PAGES) && !authenticated {
        return Redirect::to("/login").into_response();
    }

    next.run(request).await
}

// ============================================================================
// Handlers
// ============================================================================

fn message_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(MessageResponse {
            message: message.to_string(),
        }),
    )
        .into_response()
}

/// POST /api/login
/// Verify credentials and set the session cookie.
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Response {
    let (Some(email), Some(password)) = (
        payload.email.as_deref().map(str::trim).filter(|s| !s.is_empty()),
        payload.password.as_deref().filter(|s| !s.is_empty()),
    ) else {
        return message_response(StatusCode::BAD_REQUEST, "Email and password are required");
    };

    // Unknown email and wrong password take the same exit.
    let is_valid = match state
        .store()
        .verify_user_password(email, password)
        .await
    {
        Ok(valid) => valid,
        Err(e) => {
            tracing::error!("Credential verification failed: {e}");
            return message_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error");
        }
    };

    if !is_valid {
        return message_response(StatusCode::UNAUTHORIZED, "Invalid credentials");
    }

    let user = match state.store().get_user_by_email(email).await {
        Ok(Some(user)) => user,
        Ok(None) => return message_response(StatusCode::UNAUTHORIZED, "Invalid credentials"),
        Err(e) => {
            tracing::error!("User lookup failed: {e}");
            return message_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error");
        }
    };

    let token = match state.sessions().issue(&user.email, &user.name, user.role) {
        Ok(token) => token,
        Err(e) => {
            tracing::error!("Token issuance failed: {e}");
            return message_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error");
        }
    };

    tracing::info!("Login successful for {}", user.email);

    let cookie = session_cookie(
        token,
        state.config().server.secure_cookies,
        state.sessions().ttl_seconds(),
    );

    (
        jar.add(cookie),
        Json(MessageResponse {
            message: "Login successful".to_string(),
        }),
    )
        .into_response()
}

/// GET /api/logout
/// Delete the session cookie. The token itself stays valid until expiry.
pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    let removal = Cookie::build((SESSION_COOKIE, "")).path("/").build();

    (
        jar.remove(removal),
        Json(MessageResponse {
            message: "Logout successful".to_string(),
        }),
    )
}

/// GET /api/me
/// Return the identity bound into the current session token.
pub async fn me(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    let claims = jar
        .get(SESSION_COOKIE)
        .and_then(|cookie| state.sessions().verify(cookie.value()));

    match claims {
        Some(claims) => Json(MeResponse {
            user: SessionUser {
                email: claims.sub,
                name: claims.name,
                role: claims.role,
            },
        })
        .into_response(),
        None => message_response(StatusCode::UNAUTHORIZED, "Unauthorized"),
    }
}

/// POST /api/register
/// Create an account. Duplicate emails are rejected with 409.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Response {
    let (Some(name), Some(email), Some(password), Some(role)) = (
        payload.name.as_deref().map(str::trim).filter(|s| !s.is_empty()),
        payload.email.as_deref().map(str::trim).filter(|s| !s.is_empty()),
        payload.password.as_deref().filter(|s| !s.is_empty()),
        payload.role.as_deref().map(str::trim).filter(|s| !s.is_empty()),
    ) else {
        return message_response(
            StatusCode::BAD_REQUEST,
            "Name, email, password, and role are required",
        );
    };

    let Some(role) = Role::parse(role) else {
        return message_response(StatusCode::BAD_REQUEST, "Role must be admin or user");
    };

    match state.store().get_user_by_email(email).await {
        Ok(Some(_)) => return message_response(StatusCode::CONFLICT, "User already exists"),
        Ok(None) => {}
        Err(e) => {
            tracing::error!("User lookup failed: {e}");
            return message_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error");
        }
    }

    let input = UserInput {
        name: name.to_string(),
        email: email.to_string(),
        role,
    };

    match state
        .store()
        .create_user(input, password, &state.config().security)
        .await
    {
        Ok(user) => {
            tracing::info!("Registered new user {}", user.email);
            message_response(StatusCode::CREATED, "User created successfully")
        }
        Err(e) => {
            tracing::error!("User creation failed: {e}");
            message_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn session_cookie(token: String, secure: bool, max_age_seconds: i64) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .path("/")
        .max_age(time::Duration::seconds(max_age_seconds))
        .build()
}
