//! Laurel - achievement verification service

use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use laurel::{
    config::{Args, LogFormat},
    db::{MongoClient, MongoContentStore, SqliteStatusStore},
    directory::{Directory, MongoDirectory, StaticDirectory},
    server::{self, AppState},
    store::{ContentStore, MemoryContentStore},
    AchievementService,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("laurel={},info", args.log_level).into());
    match args.log_format {
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }

    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    info!("======================================");
    info!("  Laurel - Achievement Verification");
    info!("======================================");
    info!("Listen: {}", args.listen);
    info!("Mode: {}", if args.dev_mode { "DEVELOPMENT" } else { "PRODUCTION" });
    info!("MongoDB: {} (db '{}')", args.mongodb_uri, args.mongodb_db);
    info!("Status DB: {}", args.status_db_path.display());
    info!("Request timeout: {} ms", args.request_timeout_ms);
    info!("======================================");

    let jwt = args.jwt_validator()?;

    let status = Arc::new(SqliteStatusStore::open(&args.status_db_path)?);

    // MongoDB is optional in dev mode
    let (content, directory, backend): (Arc<dyn ContentStore>, Arc<dyn Directory>, &'static str) =
        match MongoClient::new(&args.mongodb_uri, &args.mongodb_db).await {
            Ok(client) => {
                info!("MongoDB connected successfully");
                (
                    Arc::new(MongoContentStore::new(&client).await?) as Arc<dyn ContentStore>,
                    Arc::new(MongoDirectory::new(&client).await?) as Arc<dyn Directory>,
                    "mongodb",
                )
            }
            Err(e) if args.dev_mode => {
                warn!("MongoDB connection failed (dev mode, using in-memory stores): {}", e);
                (
                    Arc::new(MemoryContentStore::new()) as Arc<dyn ContentStore>,
                    Arc::new(StaticDirectory::with_default_grants()) as Arc<dyn Directory>,
                    "memory",
                )
            }
            Err(e) => {
                error!("MongoDB connection failed: {}", e);
                std::process::exit(1);
            }
        };

    let service = AchievementService::new(content, status, Arc::clone(&directory));
    let state = Arc::new(AppState::new(args, service, jwt, directory, backend));

    server::run(state).await?;

    Ok(())
}
