mod import;
mod summary;

use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use leadpulse_core::{load_vocabulary, AppConfig, ConfigError, ImportPolicy, Vocabulary};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "leadpulse")]
#[command(about = "Import and summarize outbound campaign CSV exports")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the detected format of each file
    Detect {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Parse files and merge them into a user's stored data
    Import {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Owner of the imported leads and metrics
        #[arg(long, env = "LEADPULSE_USER")]
        user: String,
        /// Campaign for hybrid rows without a campaign column (defaults to the file stem)
        #[arg(long)]
        campaign: Option<String>,
        /// Sending profile for hybrid metrics without a profile column
        #[arg(long)]
        profile: Option<String>,
        /// Override LEADPULSE_IMPORT_POLICY (accumulate | replace-batch)
        #[arg(long, value_parser = parse_policy)]
        policy: Option<ImportPolicy>,
        /// Require the full three-follow-up hybrid layout
        #[arg(long)]
        strict: bool,
        /// Parse and merge in memory without touching the database
        #[arg(long)]
        dry_run: bool,
    },
    /// Summarize metrics from files, or from the database when no files are given
    Summary {
        files: Vec<PathBuf>,
        /// Read stored metrics for this user (required without files)
        #[arg(long, env = "LEADPULSE_USER")]
        user: Option<String>,
        /// First day to include (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Last day to include (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Database operations
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check the database connection
    Ping,
    /// Apply pending migrations
    Migrate,
}

fn parse_policy(raw: &str) -> Result<ImportPolicy, String> {
    raw.parse()
}

fn load_vocab(config: &AppConfig) -> anyhow::Result<Vocabulary> {
    match &config.vocabulary_path {
        Some(path) => load_vocabulary(path)
            .with_context(|| format!("failed to load vocabulary from {}", path.display())),
        None => Ok(Vocabulary::builtin()),
    }
}

async fn connect(config: &AppConfig) -> anyhow::Result<sqlx::PgPool> {
    leadpulse_db::connect_pool_from_config(config)
        .await
        .context("failed to connect to database")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = leadpulse_core::load_app_config();
    let log_level = config.as_ref().map_or("info", |c| c.log_level.as_str());
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(log_level))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Some(command) => run(command, config).await,
        None => {
            println!("leadpulse: no command given (try --help)");
            Ok(())
        }
    }
}

/// Dispatches one command. `detect` never reads settings, so a bad
/// environment only fails the commands that need it.
async fn run(command: Commands, config: Result<AppConfig, ConfigError>) -> anyhow::Result<()> {
    match command {
        Commands::Detect { files } => import::run_detect(&files)?,
        Commands::Import {
            files,
            user,
            campaign,
            profile,
            policy,
            strict,
            dry_run,
        } => {
            let config = config?;
            let vocab = load_vocab(&config)?;
            let pool = if dry_run {
                None
            } else {
                Some(connect(&config).await?)
            };
            let options = import::ImportOptions {
                user: &user,
                campaign: campaign.as_deref(),
                profile: profile.as_deref(),
                policy: policy.unwrap_or(config.import_policy),
                strict_layout: strict || config.strict_layout,
            };
            import::run_import(pool.as_ref(), &vocab, &files, &options).await?;
        }
        Commands::Summary {
            files,
            user,
            from,
            to,
            json,
        } => {
            let config = config?;
            let vocab = load_vocab(&config)?;
            let range = summary::date_range(from, to)?;
            let metrics = if files.is_empty() {
                let user = user.context("--user is required when no files are given")?;
                let pool = connect(&config).await?;
                leadpulse_db::list_campaign_metrics(&pool, &user).await?
            } else {
                summary::metrics_from_files(&files, &vocab, config.strict_layout)?
            };
            summary::print_summary(&vocab, &metrics, range.as_ref(), json)?;
        }
        Commands::Db { command } => {
            let pool = connect(&config?).await?;
            match command {
                DbCommands::Ping => {
                    leadpulse_db::ping(&pool).await?;
                    println!("database ok");
                }
                DbCommands::Migrate => {
                    let applied = leadpulse_db::run_migrations(&pool).await?;
                    println!("applied {applied} migration(s)");
                }
            }
        }
    }

    Ok(())
}
