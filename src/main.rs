use clap::Parser;

use cartrade::config::Config;
use cartrade::logging::init_logging;
use cartrade::router;

#[tokio::main]
async fn main() {
    let config = Config::parse();
    init_logging();

    let app = match router::app(&config) {
        Ok(app) => app,
        Err(err) => {
            tracing::error!(%err, "failed to build the backend client");
            std::process::exit(1);
        }
    };

    let listener = match tokio::net::TcpListener::bind(config.listen).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(%err, listen = %config.listen, "failed to bind");
            std::process::exit(1);
        }
    };
    tracing::info!(
        listen = %config.listen,
        backend = %config.backend_url,
        variant = %config.variant,
        "serving demo front end"
    );
    if let Err(err) = axum::serve(listener, app).await {
        tracing::error!(%err, "server stopped");
        std::process::exit(1);
    }
}
