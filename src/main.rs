use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use product_search::api::{AppState, build_app};
use product_search::config::{Backend, Config};
use product_search::fetch::HttpFetcher;
use product_search::search::ProductSearch;
use product_search::sources::{SerpApiSource, WalmartSource};
use product_search::traits::{Fetcher, ProductSource};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::new()?);
    let source: Arc<dyn ProductSource> = match config.backend {
        Backend::Walmart => Arc::new(WalmartSource::new(fetcher, config.fetch_limits)),
        Backend::SerpApi => {
            let api_key = config.serpapi_key.clone().unwrap_or_default();
            Arc::new(
                SerpApiSource::new(fetcher, api_key, config.fetch_limits)
                    .with_locale(&config.serpapi_country, &config.serpapi_language),
            )
        }
    };

    let search = ProductSearch::new(source, config.demo_on_empty);
    info!("Starting {} Product Search API", search.source_name());

    let app = build_app(AppState {
        search,
        style: config.response_style,
    });

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    info!("Product Search API running on http://localhost:{}", config.port);
    info!("Try: http://localhost:{}/search?q=laptop", config.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Received shutdown signal, starting graceful shutdown");
}
