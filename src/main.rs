use boilerplate::application::keys::rotate::RotateKeysUseCase;
use boilerplate::config::Config;
use boilerplate::domain::keys::KeyType;
use boilerplate::infrastructure::db::{self, PoolSettings};
use boilerplate::infrastructure::state::AppState;
use boilerplate::infrastructure::{logging, scheduler};
use boilerplate::presentation;

use std::future::Future;
use std::net::SocketAddr;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    let _log_guard = logging::init(&config.log_dir)?;

    run(config, async {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("Shutdown signal received");
    })
    .await
}

async fn run<F>(config: Config, shutdown_signal: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let (listener, state) = bootstrap(config).await?;
    let rotation = spawn_key_rotation(&state);

    let app = presentation::router::app(state);
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    rotation.abort();
    Ok(())
}

async fn bootstrap(config: Config) -> anyhow::Result<(tokio::net::TcpListener, AppState)> {
    let pool = db::create_pool(config.connect_options()?, &PoolSettings::from(&config)).await?;
    db::run_migrations(&pool).await?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let state = AppState::new(pool, config)?;

    // A fresh database gets its first keys up front instead of on the first login.
    for key_type in [KeyType::Access, KeyType::Refresh] {
        state.keys.current_key(key_type).await?;
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    Ok((listener, state))
}

fn spawn_key_rotation(state: &AppState) -> tokio::task::JoinHandle<()> {
    let keys = state.keys.clone();
    let access_days = state.config.key_access_retention_days;
    let refresh_days = state.config.key_refresh_retention_days;

    scheduler::spawn_monthly("key-rotation", move || {
        let use_case = RotateKeysUseCase::new(keys.clone(), access_days, refresh_days);
        async move {
            if let Err(e) = use_case.execute().await {
                tracing::error!("Key rotation failed: {:?}", e);
            }
        }
    })
}
