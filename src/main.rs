use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;

use authd::configuration::get_configuration;
use authd::startup::run;
use authd::store::PgSessionStore;
use authd::sweeper::Sweeper;
use authd::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    init_telemetry();

    tracing::info!("starting credential service");

    let configuration = match get_configuration() {
        Ok(config) => {
            tracing::info!("configuration loaded");
            config
        }
        Err(e) => {
            tracing::error!("failed to read configuration: {}", e);
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "configuration error",
            ));
        }
    };

    let connection_string = configuration.database.connection_string();
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&connection_string)
        .await
        .map_err(|e| {
            tracing::error!("failed to create connection pool: {}", e);
            std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "database connection error",
            )
        })?;

    tracing::info!("database connection pool created");

    let store = Arc::new(PgSessionStore::new(pool));

    let sweeper = Sweeper::start(
        store.clone(),
        Duration::from_secs(configuration.auth.sweep_interval_seconds),
    );
    tracing::info!(
        interval_seconds = configuration.auth.sweep_interval_seconds,
        "expiry sweeper started"
    );

    let address = format!("127.0.0.1:{}", configuration.application.port);
    let listener = TcpListener::bind(&address)?;
    tracing::info!("server listening on {}", address);

    let server = run(listener, store, configuration.auth)?;
    let result = server.await;

    tracing::info!("server stopped; stopping sweeper");
    sweeper.stop().await;

    result
}
