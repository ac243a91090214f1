use askama::Template;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Form, Json, Router,
};
use chrono::Utc;
use chrono_tz::Asia::Taipei;
use serde::Deserialize;
use serde_json::{json, Value};
use shared::watchlist::parse_tickers;
use shared::{
    build_table, csv_filename, export_csv, IndexTemplate, ResultsTemplate, ScanMode, Scanner,
    WatchlistSelectTemplate, WatchlistTemplate,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

#[derive(Clone)]
pub struct AppState {
    scanner: Arc<Scanner>,
}

impl AppState {
    pub fn new(scanner: Scanner) -> Self {
        Self {
            scanner: Arc::new(scanner),
        }
    }
}

/// Handler error: unknown modes are 404, everything else a 500
pub enum AppError {
    NotFound(String),
    Internal(anyhow::Error),
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        AppError::Internal(err.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, message).into_response(),
            AppError::Internal(err) => {
                error!("Request failed: {:#}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Internal error: {}", err),
                )
                    .into_response()
            }
        }
    }
}

type AppResult<T> = Result<T, AppError>;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/run/:mode", get(run_scan))
        .route("/watchlist", get(show_watchlist).post(save_watchlist))
        .route("/watchlist/select", get(select_watchlist))
        .route("/download/:mode", get(download_csv))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn parse_mode(raw: &str) -> AppResult<ScanMode> {
    raw.parse()
        .map_err(|e: shared::models::UnknownScanMode| AppError::NotFound(e.to_string()))
}

async fn index() -> AppResult<Html<String>> {
    Ok(Html(IndexTemplate::new().render()?))
}

async fn run_scan(
    State(state): State<AppState>,
    Path(mode): Path<String>,
) -> AppResult<Html<String>> {
    let mode = parse_mode(&mode)?;
    let outcome = state.scanner.run(mode).await?;
    let table = build_table(&outcome, mode);
    let page = ResultsTemplate::new(mode, table, outcome.scan_time);
    Ok(Html(page.render()?))
}

async fn show_watchlist(State(state): State<AppState>) -> AppResult<Html<String>> {
    let content = state.scanner.store().read_raw()?;
    let tickers = parse_tickers(&content);
    let ticker_details = state.scanner.watchlist_names(&tickers).await;
    Ok(Html(WatchlistTemplate::new(content, ticker_details).render()?))
}

#[derive(Debug, Deserialize)]
struct WatchlistForm {
    watchlist_content: String,
}

async fn save_watchlist(
    State(state): State<AppState>,
    Form(form): Form<WatchlistForm>,
) -> AppResult<Redirect> {
    state.scanner.store().write_raw(&form.watchlist_content)?;
    Ok(Redirect::to("/watchlist"))
}

async fn select_watchlist() -> AppResult<Html<String>> {
    Ok(Html(WatchlistSelectTemplate::new().render()?))
}

async fn download_csv(
    State(state): State<AppState>,
    Path(mode): Path<String>,
) -> AppResult<Response> {
    let mode = parse_mode(&mode)?;
    let outcome = state.scanner.run(mode).await?;
    let body = export_csv(&outcome)?;
    let filename = csv_filename(mode, &Utc::now().with_timezone(&Taipei));
    info!("Serving {} ({} rows)", filename, outcome.rows.len());

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment;filename={}", filename),
            ),
        ],
        body,
    )
        .into_response())
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
