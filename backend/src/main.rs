//! Dashboard entry-point: loads configuration, connects the document store,
//! and serves the HTTP adapter.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

mod server;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use actix_web::web;
use mockable::{DefaultEnv, Env};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use dashboard::inbound::http::health::HealthState;
use dashboard::inbound::http::session_config::{BuildMode, session_settings_from_env};
use dashboard::outbound::persistence::{
    MongoCollectionAccessor, MongoConnectionManager, MongoConnector, MongoSettings,
};
use server::{ServerConfig, create_server};

const BIND_ADDR_ENV: &str = "DASHBOARD_BIND_ADDR";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const CONNECT_RETRY: Duration = Duration::from_secs(5);

fn bind_addr(env: &impl Env) -> std::io::Result<SocketAddr> {
    let raw = env
        .string(BIND_ADDR_ENV)
        .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_owned());
    raw.parse().map_err(|error| {
        std::io::Error::other(format!("{BIND_ADDR_ENV}={raw} is not a socket address: {error}"))
    })
}

/// Mark the server ready once the store answers, retrying in the background.
async fn await_store(manager: Arc<MongoConnectionManager>, health: web::Data<HealthState>) {
    loop {
        match manager.connect().await {
            Ok(_) => {
                health.mark_ready();
                return;
            }
            Err(error) => {
                warn!(%error, retry_in = ?CONNECT_RETRY, "document store not reachable yet");
                tokio::time::sleep(CONNECT_RETRY).await;
            }
        }
    }
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(error) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(%error, "tracing init failed");
    }

    let env = DefaultEnv::new();
    let session = session_settings_from_env(&env, BuildMode::from_debug_assertions())
        .map_err(std::io::Error::other)?;
    let connection = MongoSettings::load_from_env()
        .and_then(|raw| raw.resolve())
        .map_err(std::io::Error::other)?;
    info!(
        database = %connection.database,
        max_pool_size = connection.max_pool_size,
        "document store configured"
    );

    let manager = Arc::new(MongoConnectionManager::new(MongoConnector, connection));
    let accessor = Arc::new(MongoCollectionAccessor::new(Arc::clone(&manager)));
    let config = ServerConfig::new(session, bind_addr(&env)?, accessor);
    info!(bind_addr = %config.bind_addr(), "starting dashboard");

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config)?;
    actix_web::rt::spawn(await_store(Arc::clone(&manager), health_state.clone()));

    let outcome = server.await;
    manager.close().await;
    outcome
}
