use anyhow::Result;
use clap::{Parser, Subcommand};
use sqlx::migrate::MigrateDatabase;
use tower_http::trace::TraceLayer;

use canteen::cli::user::{self, Role};
use canteen::routes::{AppState, router};

/// canteen - school cafeteria management backend
#[derive(Parser)]
#[command(name = "canteen")]
#[command(about = "School cafeteria management backend", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Server host address (overrides config file)
        #[arg(long)]
        host: Option<String>,

        /// Server port (overrides config file)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Run database migrations
    Migrate,
    /// Drop database if exists and recreate with migrations
    Reset,
    /// Manage user accounts
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
}

#[derive(Subcommand)]
enum UserCommands {
    /// Create an account; the first admin is bootstrapped this way
    Create {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// Grant the admin role
        #[arg(long)]
        admin: bool,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        lastname: Option<String>,
    },
    /// Change an existing account's role
    SetRole {
        #[arg(long)]
        email: String,
        #[arg(long, value_enum)]
        role: Role,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = canteen::config::Config::load(cli.config.clone())?;
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    canteen::observability::init_tracing(&config.log.level)?;

    match cli.command {
        Commands::Serve { host, port } => serve_command(config, host, port).await,
        Commands::Migrate => migrate_command(config).await,
        Commands::Reset => reset_command(config).await,
        Commands::User { command } => match command {
            UserCommands::Create {
                email,
                password,
                admin,
                name,
                lastname,
            } => {
                let role = if admin { Role::Admin } else { Role::User };
                user::create(config, email, password, role, name, lastname).await
            }
            UserCommands::SetRole { email, role } => user::set_role(config, email, role).await,
        },
    }
}

#[tracing::instrument(skip(config))]
async fn serve_command(
    config: canteen::config::Config,
    host_override: Option<String>,
    port_override: Option<u16>,
) -> Result<()> {
    tracing::info!("Starting canteen server...");

    let host = host_override.unwrap_or_else(|| config.server.host.clone());
    let port = port_override.unwrap_or(config.server.port);

    let pool = canteen::db::create_pool(&config.database.url, config.database.max_connections)
        .await?;

    let state = AppState {
        config: config.clone(),
        pool,
    };

    let app = router(state).layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}

#[tracing::instrument(skip(config))]
async fn migrate_command(config: canteen::config::Config) -> Result<()> {
    tracing::info!("Running database migrations...");

    if !sqlx::Sqlite::database_exists(&config.database.url).await? {
        tracing::info!("Database does not exist, creating: {}", config.database.url);
        sqlx::Sqlite::create_database(&config.database.url).await?;
    }

    let pool = canteen::db::create_pool(&config.database.url, 1).await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    tracing::info!("Migrations completed successfully");

    Ok(())
}

#[tracing::instrument(skip(config))]
async fn reset_command(config: canteen::config::Config) -> Result<()> {
    tracing::info!("Resetting database...");

    if sqlx::Sqlite::database_exists(&config.database.url).await? {
        tracing::warn!("Dropping existing database: {}", config.database.url);
        sqlx::Sqlite::drop_database(&config.database.url).await?;
        tracing::info!("Database dropped successfully");
    } else {
        tracing::info!("Database does not exist, nothing to drop");
    }

    migrate_command(config).await?;

    tracing::info!("Database reset completed successfully");

    Ok(())
}
