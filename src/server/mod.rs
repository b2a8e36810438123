pub mod handlers;
pub mod pages;

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower::{
    ServiceBuilder,
    limit::{ConcurrencyLimit, ConcurrencyLimitLayer},
    make::Shared,
};
use tracing::info;

use crate::{
    color::SummaryService,
    config::Settings,
    error::AppError,
    storage::{CsvLog, ResultStore},
};

#[derive(Clone)]
pub struct AppState {
    pub summarizer: SummaryService,
    pub store: ResultStore,
    pub csv_log: Arc<CsvLog>,
    pub history_limit: u32,
}

impl AppState {
    pub fn new(store: ResultStore, csv_log: CsvLog, history_limit: u32) -> Self {
        Self {
            summarizer: SummaryService::new(),
            store,
            csv_log: Arc::new(csv_log),
            history_limit,
        }
    }
}

pub fn router(state: AppState, settings: &Settings) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/analyze", post(handlers::analyze))
        .route("/health", get(handlers::health))
        .route("/history", get(handlers::history))
        .route("/download/csv", get(handlers::download_csv))
        .layer(DefaultBodyLimit::max(settings.max_upload_bytes))
        .with_state(state)
}

/// The full router behind one semaphore shared by every route.
pub fn service(state: AppState, settings: &Settings) -> ConcurrencyLimit<Router> {
    ServiceBuilder::new()
        .layer(ConcurrencyLimitLayer::new(settings.max_concurrent_requests))
        .service(router(state, settings))
}

pub struct Server {
    settings: Settings,
    state: AppState,
}

impl Server {
    pub fn new(settings: Settings, state: AppState) -> Self {
        Self { settings, state }
    }

    pub async fn start(self) -> Result<(), AppError> {
        let address = self.settings.bind_address();
        info!("Starting color summarizer on {}", address);
        let listener = TcpListener::bind(&address)
            .await
            .map_err(|e| AppError::Bind(e, self.settings.port))?;
        let app = service(self.state, &self.settings);
        axum::serve(listener, Shared::new(app)).await?;
        Ok(())
    }
}
