use dotenvy::dotenv;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use wedding_ledger::{
    Result,
    commands::console,
    config::{database, settings},
    core::LedgerService,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // 2. Load .env file; variables may also be set externally
    dotenv().ok();

    // 3. Load settings (config.toml is optional)
    let settings = settings::load_default_settings()
        .inspect_err(|e| error!("Failed to load settings: {}", e))?;

    // 4. Open the database and make sure the table exists
    let database_url = database::resolve_database_url(&settings);
    let db = database::create_connection(&database_url)
        .await
        .inspect_err(|e| error!("Failed to open database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {}", e))?;

    // 5. Hand control to the console
    let ledger = LedgerService::new(db);
    let stdin = std::io::stdin();
    console::run_console(&ledger, &settings, stdin.lock(), std::io::stdout()).await
}
