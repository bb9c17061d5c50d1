use anyhow::{Context, Result};
use clap::Parser;
use homewatch::api::{self, AppState};
use homewatch::cache::LatestReadings;
use homewatch::config;
use homewatch::db;
use homewatch::poller::{self, Collectors};
use homewatch::sources::{Notifier, TelegramNotifier};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Path to YAML config file
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,

    /// Print an example configuration and exit
    #[arg(long)]
    print_example_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();
    if args.print_example_config {
        print!("{}", config::example());
        return Ok(());
    }

    let cfg = config::load(Some(&args.config))?;
    cfg.ensure_dirs()?;

    let pool = db::init_pool(&cfg.database_url()).await?;
    db::run_migrations(&pool).await?;

    let cache = Arc::new(LatestReadings::new());
    for reading in db::latest_reading_per_source(&pool).await? {
        cache.update(reading).await;
    }

    let collectors = Collectors::from_config(&cfg)?;
    let notifier: Option<Arc<dyn Notifier>> = if cfg.telegram.enabled {
        Some(Arc::new(TelegramNotifier::new(&cfg.telegram.bot_token, cfg.telegram.chat_id)))
    } else {
        None
    };
    if collectors.weather.is_none() && collectors.sensor.is_none() {
        warn!("no reading source enabled; only pushed ESP32 data will be recorded");
    }

    let jobs = poller::spawn_all(&cfg, &pool, &cache, &collectors, notifier);

    let bind = cfg.http.bind.clone();
    let app = api::build_router(AppState::new(pool, cache, collectors, cfg));
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;
    info!(%bind, jobs = jobs.len(), "homewatch listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server failed")?;

    for job in jobs {
        job.abort();
    }
    info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(?err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
