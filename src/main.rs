use color_summarizer::{
    config::Settings,
    error::AppError,
    server::{AppState, Server},
    storage::{CsvLog, ResultStore},
};
use tracing::{Level, error};

fn init_logging(level: Level) {
    tracing_subscriber::fmt().with_max_level(level).init();
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let settings = Settings::load()?;
    init_logging(settings.level()?);

    let store = ResultStore::open(&settings.db_path).await?;
    let csv_log = CsvLog::new(settings.csv_path.clone());
    let state = AppState::new(store, csv_log, settings.history_limit);

    Server::new(settings, state)
        .start()
        .await
        .inspect_err(|e| error!("Server stopped: {}", e))
}
