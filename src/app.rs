use std::error::Error;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::infrastructure::bootstrap;
use crate::infrastructure::config::AppConfig;
use crate::interfaces::http::start_server;

pub fn run() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::load()?;

    // RUST_LOG, when set, wins over the configured filter
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_filter.as_str()));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    actix_web::rt::System::new().block_on(async move {
        let state = bootstrap::setup(&config).await?;

        let (host, port) = config.bind_addr();
        info!(%host, port, max_datasets = config.max_datasets, "Starting HTTP server");

        start_server(state, &config)?.await?;
        info!("HTTP server stopped");
        Ok::<(), Box<dyn Error>>(())
    })
}
