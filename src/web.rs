use axum::Router;
use axum::extract::{Form, Path, State};
use axum::response::{Html, Json, Redirect};
use axum::routing::{get, post};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use crate::app::render::{render_page, render_shelf};
use crate::app::store::ViewState;
use crate::app::view::View;

#[derive(Clone)]
struct AppState {
    view: View,
}

/// Browser-facing routes. Every POST answers `303 See Other` back to `/`.
pub fn router(view: View) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/shelf", get(shelf))
        .route("/healthz", get(|| async { "ok\n" }))
        .route("/api/state", get(view_state))
        .route("/fetch", post(fetch_book))
        .route("/books/:book_id/analyze", post(analyze_book))
        .route("/books/:book_id/toggle", post(toggle_analysis))
        .route("/notification/dismiss", post(dismiss_notification))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { view })
}

async fn index(State(state): State<AppState>) -> Html<String> {
    let snapshot = state.view.snapshot();
    Html(render_page(&snapshot, state.view.notification_ttl()))
}

async fn shelf(State(state): State<AppState>) -> Html<String> {
    let snapshot = state.view.snapshot();
    Html(render_shelf(&snapshot, state.view.notification_ttl()))
}

async fn view_state(State(state): State<AppState>) -> Json<ViewState> {
    Json(ViewState::clone(&state.view.snapshot()))
}

#[derive(Debug, Deserialize)]
struct FetchForm {
    #[serde(default)]
    book_id: String,
}

async fn fetch_book(State(state): State<AppState>, Form(form): Form<FetchForm>) -> Redirect {
    if state.view.fetch_book(&form.book_id).is_none() {
        tracing::debug!(input = %form.book_id, "fetch not issued");
    }
    Redirect::to("/")
}

async fn analyze_book(State(state): State<AppState>, Path(book_id): Path<String>) -> Redirect {
    if state.view.analyze_book(&book_id).is_none() {
        tracing::debug!(book_id = %book_id, "analysis not issued");
    }
    Redirect::to("/")
}

async fn toggle_analysis(State(state): State<AppState>, Path(book_id): Path<String>) -> Redirect {
    state.view.toggle_analysis(&book_id);
    Redirect::to("/")
}

#[derive(Debug, Deserialize)]
struct DismissForm {
    id: u64,
}

async fn dismiss_notification(
    State(state): State<AppState>,
    Form(form): Form<DismissForm>,
) -> Redirect {
    state.view.dismiss_notification(form.id);
    Redirect::to("/")
}
