use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use sea_orm::DatabaseConnection;
use tracing::info;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use treeminder::config::ServerConfig;
use treeminder::database::{establish_connection, get_database_url, setup_database};
use treeminder::server;
use treeminder::services::{AdminService, ImportService};

const DEFAULT_DATABASE: &str = "treeminder.db";

#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    #[clap(short, long, global = true)]
    log_level: Option<String>,
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Serve {
        /// YAML file with port, database and cors_origin
        #[clap(short, long)]
        config: Option<PathBuf>,
        #[clap(short, long)]
        port: Option<u16>,
        #[clap(short, long)]
        database: Option<String>,
        #[clap(long)]
        cors_origin: Option<String>,
    },
    Db {
        #[clap(subcommand)]
        command: DbCommands,
    },
    /// Load records from a GeoJSON FeatureCollection
    Import {
        #[clap(subcommand)]
        command: ImportCommands,
        #[clap(short, long, global = true, default_value = DEFAULT_DATABASE)]
        database: String,
    },
    Project {
        #[clap(subcommand)]
        command: ProjectCommands,
        #[clap(short, long, global = true, default_value = DEFAULT_DATABASE)]
        database: String,
    },
    User {
        #[clap(subcommand)]
        command: UserCommands,
        #[clap(short, long, global = true, default_value = DEFAULT_DATABASE)]
        database: String,
    },
}

#[derive(Subcommand, Debug)]
enum DbCommands {
    Init {
        #[clap(short, long, default_value = DEFAULT_DATABASE)]
        database: String,
    },
    Migrate {
        #[clap(subcommand)]
        direction: server::MigrateDirection,
        #[clap(short, long, default_value = DEFAULT_DATABASE)]
        database: String,
    },
}

#[derive(Subcommand, Debug)]
enum ImportCommands {
    Tenements {
        file: PathBuf,
    },
    Parcels {
        file: PathBuf,
    },
    Prospects {
        file: PathBuf,
        #[clap(long)]
        project: String,
    },
}

#[derive(Subcommand, Debug)]
enum ProjectCommands {
    Create {
        slug: String,
        name: String,
        #[clap(long)]
        description: Option<String>,
    },
    LinkTenement {
        slug: String,
        permit_id: String,
    },
}

#[derive(Subcommand, Debug)]
enum UserCommands {
    /// Create a user and print its API token
    Create { username: String },
    /// Give a user read access to a project
    Grant {
        username: String,
        slug: String,
        /// Also allow writes
        #[clap(long)]
        write: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    setup_logging(&args.log_level);

    match args.command {
        Commands::Serve {
            config,
            port,
            database,
            cors_origin,
        } => {
            let config = match config {
                Some(path) => {
                    info!("Loading configuration from {}", path.display());
                    ServerConfig::load(&path)?
                }
                None => ServerConfig::default(),
            }
            .with_overrides(port, database, cors_origin);

            info!("Starting server on port {}", config.port);
            server::start_server(&config).await?;
        }
        Commands::Db { command } => match command {
            DbCommands::Init { database } => {
                info!("Initializing database: {}", database);
                server::migrate_database(&database, server::MigrateDirection::Up).await?;
            }
            DbCommands::Migrate {
                direction,
                database,
            } => {
                info!("Running database migration: {:?}", direction);
                server::migrate_database(&database, direction).await?;
            }
        },
        Commands::Import { command, database } => {
            let importer = ImportService::new(open_database(&database).await?);
            let count = match command {
                ImportCommands::Tenements { file } => importer.import_tenements(&file).await?,
                ImportCommands::Parcels { file } => importer.import_parcels(&file).await?,
                ImportCommands::Prospects { file, project } => {
                    importer.import_prospects(&file, &project).await?
                }
            };
            println!("Imported {} records", count);
        }
        Commands::Project { command, database } => {
            let admin = AdminService::new(open_database(&database).await?);
            match command {
                ProjectCommands::Create {
                    slug,
                    name,
                    description,
                } => {
                    let project = admin.create_project(&slug, &name, description).await?;
                    println!("Created project {} ({})", project.slug, project.id);
                }
                ProjectCommands::LinkTenement { slug, permit_id } => {
                    admin.link_tenement(&slug, &permit_id).await?;
                    println!("Linked {} to {}", permit_id, slug);
                }
            }
        }
        Commands::User { command, database } => {
            let admin = AdminService::new(open_database(&database).await?);
            match command {
                UserCommands::Create { username } => {
                    let user = admin.create_user(&username).await?;
                    println!("{}", user.api_token);
                }
                UserCommands::Grant {
                    username,
                    slug,
                    write,
                } => {
                    admin.grant(&username, &slug, write).await?;
                    println!("Granted {} access to {}", username, slug);
                }
            }
        }
    }

    Ok(())
}

async fn open_database(path: &str) -> Result<DatabaseConnection> {
    let db = establish_connection(&get_database_url(Some(path))).await?;
    setup_database(&db).await?;
    Ok(db)
}

fn setup_logging(log_level: &Option<String>) {
    let log_level = match log_level
        .as_ref()
        .unwrap_or(&"info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(format!("handlebars=off,{}", log_level)))
        .without_time()
        .init();
}
