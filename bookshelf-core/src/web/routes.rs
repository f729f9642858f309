use axum::extract::{Path, State};
use axum::http::header::SET_COOKIE;
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::{Extension, Form, Json};
use serde::Deserialize;
use tracing::{info, warn};

use crate::adapters::file_sessions::SessionData;
use crate::domain::result::Error;
use crate::domain::{BookApiRecord, CurrentUser};
use crate::services::catalog::NO_SUCH_BOOK;
use crate::services::LogEvent;

use super::error::{ApiError, PageError};
use super::pages;
use super::session::{expired_session_cookie, session_cookie, session_token};
use super::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchForm {
    pub search: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ReviewForm {
    pub score: String,
    pub review: String,
}

/// Book ids that are not integers name no book
fn parse_book_id(raw: &str) -> Result<i64, PageError> {
    raw.parse()
        .map_err(|_| PageError(Error::not_found(NO_SUCH_BOOK)))
}

pub async fn login_page() -> Html<String> {
    Html(pages::login_page(None))
}

pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<Credentials>,
) -> Result<Response, PageError> {
    let user = match state.context.auth_service.login(&form.username, &form.password) {
        Ok(user) => user,
        Err(e) => {
            state.record(LogEvent::new("login_failed").with_route("/"));
            return Err(e.into());
        }
    };

    // Rotate: never reuse a token the client arrived with
    if let Some(old) = session_token(&headers) {
        if let Err(e) = state.context.sessions.destroy(&old) {
            warn!("Failed to discard previous session: {}", e);
        }
    }
    let token = state.context.sessions.create(&SessionData::for_user(user.id))?;

    info!(user_id = user.id, "User logged in");
    state.record(LogEvent::new("login_succeeded").with_route("/").with_user(user.id));

    Ok(([(SET_COOKIE, session_cookie(&token))], Redirect::to("/index")).into_response())
}

pub async fn register_page() -> Html<String> {
    Html(pages::register_page())
}

pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<Credentials>,
) -> Result<Html<String>, PageError> {
    match state.context.auth_service.register(&form.username, &form.password) {
        Ok(user) => {
            info!(user_id = user.id, "User registered");
            state.record(LogEvent::new("user_registered").with_route("/register").with_user(user.id));
            Ok(Html(pages::login_page(Some("Registration complete, please log in."))))
        }
        Err(e) => {
            state.record(LogEvent::new("registration_rejected").with_route("/register"));
            Err(e.into())
        }
    }
}

pub async fn index() -> Html<String> {
    Html(pages::index_page())
}

pub async fn search(
    State(state): State<AppState>,
    Form(form): Form<SearchForm>,
) -> Result<Html<String>, PageError> {
    let books = state.context.catalog_service.search(&form.search)?;
    Ok(Html(pages::search_results_page(form.search.trim(), &books)))
}

pub async fn book_detail(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(raw_id): Path<String>,
) -> Result<Html<String>, PageError> {
    let book_id = parse_book_id(&raw_id)?;
    match state.context.rating_service.book_detail(book_id).await {
        Ok(detail) => Ok(Html(pages::book_page(&detail))),
        Err(e) => {
            if let Error::Upstream(msg) = &e {
                state.record(
                    LogEvent::new("rating_lookup_failed")
                        .with_route("/books/{id}")
                        .with_user(user.user_id)
                        .with_error(msg.clone()),
                );
            }
            Err(e.into())
        }
    }
}

pub async fn submit_review(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(raw_id): Path<String>,
    Form(form): Form<ReviewForm>,
) -> Result<Response, PageError> {
    let book_id = parse_book_id(&raw_id)?;
    let result = state
        .context
        .review_service
        .submit(user.user_id, book_id, &form.score, &form.review);

    match result {
        Ok(review) => {
            info!(user_id = user.user_id, book_id, score = review.score, "Review submitted");
            state.record(
                LogEvent::new("review_submitted")
                    .with_route("/books/{id}")
                    .with_user(user.user_id),
            );
            Ok(Redirect::to(&format!("/books/{}", book_id)).into_response())
        }
        Err(e) => {
            state.record(
                LogEvent::new("review_rejected")
                    .with_route("/books/{id}")
                    .with_user(user.user_id),
            );
            Err(e.into())
        }
    }
}

pub async fn api_lookup(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(isbn): Path<String>,
) -> Result<Json<BookApiRecord>, ApiError> {
    match state.context.rating_service.api_record(&isbn).await {
        Ok(record) => Ok(Json(record)),
        Err(e) => {
            if let Error::Upstream(msg) = &e {
                state.record(
                    LogEvent::new("rating_lookup_failed")
                        .with_route("/api/{isbn}")
                        .with_user(user.user_id)
                        .with_error(msg.clone()),
                );
            }
            Err(e.into())
        }
    }
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = session_token(&headers) {
        if let Err(e) = state.context.sessions.destroy(&token) {
            warn!("Failed to delete session: {}", e);
        }
    }
    state.record(LogEvent::new("logout").with_route("/logout"));

    ([(SET_COOKIE, expired_session_cookie())], Redirect::to("/")).into_response()
}
