use innkeep::{
    api::{start_api_server, ApiState},
    config::{AppConfig, ObservabilityConfig},
    observability::init_tracing,
    storage::{create_pool, run_migrations},
    Result, APP_NAME, VERSION,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // .env must be loaded before anything reads the environment.
    dotenvy::dotenv().ok();

    let observability_config = ObservabilityConfig::from_env();
    init_tracing(&observability_config)?;

    info!(
        app_name = APP_NAME,
        version = VERSION,
        "Starting Innkeep property management backend"
    );

    let config = AppConfig::from_env()?;
    info!(
        environment = ?config.environment,
        address = %config.server.bind_address(),
        database = %config.database.url,
        "Configuration loaded"
    );

    let pool = create_pool(&config.database).await?;

    if config.database.auto_migrate {
        run_migrations(&pool).await?;
        info!("Database migrations applied");
    }

    let state = ApiState::with_sqlx(pool, config.auth.clone());
    start_api_server(config.server, state).await
}
