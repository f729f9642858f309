//! Session cookie handling and the two route gates
//!
//! The cookie only carries an opaque token; the user id lives in the
//! server-side session file.

use axum::extract::{Request, State};
use axum::http::header::COOKIE;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use tracing::warn;

use crate::domain::CurrentUser;

use super::state::AppState;

pub const SESSION_COOKIE: &str = "bookshelf_session";

/// Token from the request's session cookie, if any
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, token)| token.to_string())
        .filter(|token| !token.is_empty())
}

/// `Set-Cookie` value for a freshly issued session
pub fn session_cookie(token: &str) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, token)
}

/// `Set-Cookie` value that clears the session cookie
pub fn expired_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}

/// Resolve the logged-in user for a request
///
/// A session store failure counts as logged out.
pub fn current_user(state: &AppState, headers: &HeaderMap) -> Option<CurrentUser> {
    let token = session_token(headers)?;
    match state.context.sessions.load(&token) {
        Ok(Some(session)) => session.user_id.map(|user_id| CurrentUser { user_id }),
        Ok(None) => None,
        Err(e) => {
            warn!("Failed to load session: {}", e);
            None
        }
    }
}

/// Gate for member routes: anonymous requests go to the login page
pub async fn require_authenticated(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    match current_user(&state, request.headers()) {
        Some(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        None => Redirect::to("/").into_response(),
    }
}

/// Gate for guest routes: logged-in users go to the search page
pub async fn redirect_if_authenticated(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if current_user(&state, request.headers()).is_some() {
        return Redirect::to("/index").into_response();
    }
    next.run(request).await
}
