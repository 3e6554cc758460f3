use std::convert::Infallible;
use std::error::Error;

use axum::{
    extract::{FromRequestParts, Path, Query, State},
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::controller::{
    ActionError, CatalogController, DetailController, DetailOutcome, LoadState, Notice,
    ReadingListsController,
};
use crate::models::SortKey;
use crate::pages::{CatalogPage, DetailPage, MessagePage, ReadingListsPage, WriteReviewPage};
use crate::repo::Backend;

pub const LOGIN_PATH: &str = "/login";
pub const NOT_FOUND_PATH: &str = "/not-found";

#[derive(Clone)]
struct AppState<B> {
    backend: B,
}

pub fn build_app<E, B>(backend: B) -> Router
where
    E: Error + Send + Sync + 'static,
    B: Backend<E>,
{
    Router::new()
        .route("/books", get(list_books::<E, B>))
        .route("/books/{id}", get(book_detail::<E, B>))
        .route("/books/{id}/review", get(write_review::<E, B>))
        .route("/books/{id}/reviews", post(submit_review::<E, B>))
        .route("/books/{id}/reading-list", post(add_to_reading_list::<E, B>))
        .route("/reading-lists", get(reading_lists::<E, B>))
        .route(LOGIN_PATH, get(login))
        .route(NOT_FOUND_PATH, get(not_found))
        .with_state(AppState { backend })
        .layer(TraceLayer::new_for_http())
}

/// Bearer token from the `Authorization` header, if any.
struct AccessToken(Option<String>);

impl<S> FromRequestParts<S> for AccessToken
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(bearer_token)
            .map(str::to_string);

        Ok(AccessToken(token))
    }
}

/// The credential of an `Authorization` value using the bearer scheme. The
/// scheme name is matched without regard to case.
fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim_start().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[derive(Debug, Default, Deserialize)]
struct CatalogParams {
    q: Option<String>,
    sort: Option<String>,
    page: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddToListForm {
    list_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReviewForm {
    rating: u8,
    #[serde(default)]
    comment: String,
}

async fn list_books<E, B>(
    State(state): State<AppState<B>>,
    AccessToken(token): AccessToken,
    Query(params): Query<CatalogParams>,
) -> (StatusCode, Json<CatalogPage>)
where
    E: Error + Send + Sync + 'static,
    B: Backend<E>,
{
    let (repo, _) = state.backend.bind(token);
    let mut controller = CatalogController::<E, _>::new(repo);
    controller.mount().await;

    // Query and sort reset the page, so the page goes last.
    if let Some(query) = params.q {
        controller.set_query(query);
    }
    if let Some(sort) = params.sort {
        controller.set_sort(SortKey::parse(&sort));
    }
    controller.go_to_page(params.page.unwrap_or(1));

    let page = CatalogPage::render(&controller);
    info!(
        "Showing {} of {} matching books",
        page.books.len(),
        page.total_matches
    );

    (load_status(controller.state()), Json(page))
}

async fn book_detail<E, B>(
    State(state): State<AppState<B>>,
    AccessToken(token): AccessToken,
    Path(id): Path<String>,
) -> Response
where
    E: Error + Send + Sync + 'static,
    B: Backend<E>,
{
    let (repo, sessions) = state.backend.bind(token);
    let mut controller = DetailController::<E, _, _>::new(repo, sessions);

    if let Err(response) = loaded(controller.load(&id).await, controller.notices()) {
        return response;
    }

    Json(DetailPage::render(&controller)).into_response()
}

async fn write_review<E, B>(
    State(state): State<AppState<B>>,
    AccessToken(token): AccessToken,
    Path(id): Path<String>,
) -> Response
where
    E: Error + Send + Sync + 'static,
    B: Backend<E>,
{
    let (repo, sessions) = state.backend.bind(token);
    let mut controller = DetailController::<E, _, _>::new(repo, sessions);

    if let Err(response) = loaded(controller.load(&id).await, controller.notices()) {
        return response;
    }

    match controller.require_session().await {
        Ok(session) => Json(WriteReviewPage::new(id, session.user_id)).into_response(),
        Err(e) => action_failed(e, controller.notices()),
    }
}

async fn submit_review<E, B>(
    State(state): State<AppState<B>>,
    AccessToken(token): AccessToken,
    Path(id): Path<String>,
    Json(form): Json<ReviewForm>,
) -> Response
where
    E: Error + Send + Sync + 'static,
    B: Backend<E>,
{
    let (repo, sessions) = state.backend.bind(token);
    let mut controller = DetailController::<E, _, _>::new(repo, sessions);

    if let Err(response) = loaded(controller.load(&id).await, controller.notices()) {
        return response;
    }

    match controller.submit_review(form.rating, &form.comment).await {
        Ok(()) => (
            StatusCode::CREATED,
            Json(DetailPage::render(&controller)),
        )
            .into_response(),
        Err(e) => action_failed(e, controller.notices()),
    }
}

async fn add_to_reading_list<E, B>(
    State(state): State<AppState<B>>,
    AccessToken(token): AccessToken,
    Path(id): Path<String>,
    Json(form): Json<AddToListForm>,
) -> Response
where
    E: Error + Send + Sync + 'static,
    B: Backend<E>,
{
    let (repo, sessions) = state.backend.bind(token);
    let mut controller = DetailController::<E, _, _>::new(repo, sessions);

    if let Err(response) = loaded(controller.load(&id).await, controller.notices()) {
        return response;
    }

    match controller.add_to_reading_list(form.list_id.as_deref()).await {
        Ok(()) => Json(DetailPage::render(&controller)).into_response(),
        Err(e) => action_failed(e, controller.notices()),
    }
}

async fn reading_lists<E, B>(
    State(state): State<AppState<B>>,
    AccessToken(token): AccessToken,
) -> Response
where
    E: Error + Send + Sync + 'static,
    B: Backend<E>,
{
    let (repo, sessions) = state.backend.bind(token);
    let mut controller = ReadingListsController::<E, _, _>::new(repo, sessions);

    match controller.load().await {
        Ok(()) => Json(ReadingListsPage::render(&controller)).into_response(),
        Err(e) => action_failed(e, controller.notices()),
    }
}

async fn login() -> (StatusCode, Json<MessagePage>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(MessagePage::new("Sign in to continue", &[])),
    )
}

async fn not_found() -> (StatusCode, Json<MessagePage>) {
    (
        StatusCode::NOT_FOUND,
        Json(MessagePage::new("Book not found", &[])),
    )
}

fn load_status(state: LoadState) -> StatusCode {
    match state {
        LoadState::Failed => StatusCode::BAD_GATEWAY,
        _ => StatusCode::OK,
    }
}

/// Turns a detail load that did not produce a book into the response to send.
fn loaded(outcome: DetailOutcome, notices: &[Notice]) -> Result<(), Response> {
    match outcome {
        DetailOutcome::Loaded => Ok(()),
        DetailOutcome::NotFound => Err(Redirect::to(NOT_FOUND_PATH).into_response()),
        DetailOutcome::Failed => Err((
            StatusCode::BAD_GATEWAY,
            Json(MessagePage::new("Failed to load book details", notices)),
        )
            .into_response()),
        DetailOutcome::Cancelled => Err(StatusCode::SERVICE_UNAVAILABLE.into_response()),
    }
}

fn action_failed<E: Error>(err: ActionError<E>, notices: &[Notice]) -> Response {
    match err {
        ActionError::AuthRequired => Redirect::to(LOGIN_PATH).into_response(),
        ActionError::Validation(message) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(MessagePage::new(message, notices)),
        )
            .into_response(),
        ActionError::Backend(e) => (
            StatusCode::BAD_GATEWAY,
            Json(MessagePage::new(e.to_string(), notices)),
        )
            .into_response(),
        ActionError::Cancelled => StatusCode::SERVICE_UNAVAILABLE.into_response(),
    }
}
