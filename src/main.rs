use std::process::ExitCode;

use chrono::Utc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod api;
mod config;
mod models;
mod services;
mod store;

use api::alpha_vantage::AlphaVantageClient;
use api::sendgrid::SendGridClient;
use config::Settings;
use services::batch_service::BatchOrchestrator;
use services::chart_service::PlottersRenderer;
use services::email_service::SendGridDispatcher;
use services::price_service::CachedPriceSource;
use store::SeriesCache;

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("market_digest=debug,reqwest=warn")),
        )
        .with_target(true)
        .init();

    info!("📊 Starting market digest...");

    // Configuration problems stop the run before any symbol is touched
    let settings = match Settings::from_env() {
        Ok(s) => s,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let annotations = match config::load_annotations() {
        Ok(a) => a,
        Err(e) => {
            error!("Invalid annotation table: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let instruments = config::load_instruments();
    info!("Loaded settings: {:?}", settings);

    let source = CachedPriceSource::new(
        AlphaVantageClient::new(settings.data_source_api_key.clone(), settings.output_size),
        SeriesCache::new(&settings.data_dir),
    );
    let renderer = PlottersRenderer::new(&settings.output_dir);
    let dispatcher = SendGridDispatcher::new(
        SendGridClient::new(settings.email_service_api_key.clone()),
        settings.sender_email.clone(),
        settings.recipient_email.clone(),
    );

    let orchestrator = BatchOrchestrator::new(
        source,
        renderer,
        dispatcher,
        settings.prefer_cache,
        Utc::now().date_naive(),
    );

    let report = orchestrator.run(&instruments, &annotations).await;

    for skipped in &report.skipped {
        warn!("{} skipped: {:?}", skipped.symbol, skipped.reason);
    }

    match &report.delivery {
        Ok(status) => {
            info!(
                "✅ Digest delivered ({} chart(s) attached, status {})",
                report.attached, status
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Error sending email: {}", e);
            ExitCode::FAILURE
        }
    }
}
