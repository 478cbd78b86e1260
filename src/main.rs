use settleboard::db::load_csv_file;
use settleboard::engine::SystemClock;
use settleboard::{
    api, init_db, Config, Dashboard, DataSource, DataSourceConfig, PostgrestDataSource,
    Repository,
};
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let port = config.port;

    let (source, source_kind): (Arc<dyn DataSource>, &'static str) = match &config.data_source
    {
        DataSourceConfig::Postgrest {
            url,
            api_key,
            table,
        } => {
            tracing::info!(%url, %table, "Using PostgREST data source");
            (
                Arc::new(PostgrestDataSource::new(
                    url.clone(),
                    api_key.clone(),
                    table.clone(),
                )),
                "postgrest",
            )
        }
        DataSourceConfig::Sqlite {
            database_path,
            seed_csv_path,
        } => {
            let pool = match init_db(database_path).await {
                Ok(p) => p,
                Err(e) => {
                    eprintln!("Failed to initialize database: {}", e);
                    std::process::exit(1);
                }
            };
            let repo = Repository::new(pool);

            if let Some(path) = seed_csv_path {
                if let Err(e) = load_csv_file(&repo, path).await {
                    eprintln!("Failed to seed database: {}", e);
                    std::process::exit(1);
                }
            }

            (Arc::new(repo), "sqlite")
        }
    };

    let dashboard = match Dashboard::new(source, Arc::new(SystemClock), config.page_size) {
        Ok(d) => Arc::new(d),
        Err(e) => {
            eprintln!("Failed to create dashboard: {}", e);
            std::process::exit(1);
        }
    };

    // Create router
    let app = api::create_router(api::AppState::new(dashboard, source_kind));

    // Bind to address
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!("Server listening on {}", addr);

    // Run server
    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}
