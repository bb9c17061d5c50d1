use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::Parser;
use homewatch::{auth, config, db};
use tracing::info;

/// Create a dashboard user, or reset the password of an existing one.
#[derive(Parser, Debug)]
struct Args {
    /// Path to YAML config
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,

    /// Username to create or reset
    username: String,

    /// New password; read from HOMEWATCH_PASSWORD when omitted
    #[arg(long)]
    password: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();
    let password = match args.password {
        Some(p) => p,
        None => std::env::var("HOMEWATCH_PASSWORD")
            .map_err(|_| anyhow!("pass --password or set HOMEWATCH_PASSWORD"))?,
    };

    let cfg = config::load(Some(&args.config))?;
    cfg.ensure_dirs()?;
    let pool = db::init_pool(&cfg.database_url()).await?;
    db::run_migrations(&pool).await?;

    let id = auth::set_password(&pool, &args.username, &password).await?;
    info!(user_id = id, username = %args.username.trim(), "user saved");
    println!("user '{}' saved (id {id})", args.username.trim());
    Ok(())
}
