#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use propdata_rs::{
    account::{AccountError, DEFAULT_KEY_NAME},
    auth::{Role, Tier},
    config::Config,
    init_env,
    storage::Property,
    utils::logger,
    AppContext,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about = "Metered property listing API", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Issue an API key, registering the account first if it is new
    IssueKey {
        #[arg(long)]
        user_id: String,

        #[arg(long)]
        email: String,

        /// Key name, used when the account already exists
        #[arg(long, default_value = DEFAULT_KEY_NAME)]
        name: String,

        #[arg(long, default_value = "free")]
        tier: Tier,
    },
    /// Load property rows from a JSON array
    Import {
        #[arg(short, long)]
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_env();
    let args = Args::parse();
    let config = Config::from_env()?;

    let _guard = logger::init(config.log_dir.clone())?;
    ensure_sqlite_dir(&config.database_url)?;

    info!("Opening database...");
    let ctx = Arc::new(AppContext::open(&config.database_url, config.tier_policy).await?);

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(ctx, &config).await,
        Command::IssueKey {
            user_id,
            email,
            name,
            tier,
        } => issue_key(&ctx, &user_id, &email, &name, tier).await,
        Command::Import { file } => import(&ctx, &file).await,
    }
}

async fn serve(ctx: Arc<AppContext>, config: &Config) -> Result<()> {
    for (tier, limit) in config.tier_policy.iter() {
        info!(tier = %tier, limit, "quota");
    }

    match propdata_rs::web::start_server(ctx, config.http_addr()).await {
        Ok(_) => info!("Server stopped gracefully"),
        Err(e) => {
            error!("Server error: {}", e);
            return Err(e);
        }
    }
    Ok(())
}

async fn issue_key(ctx: &AppContext, user_id: &str, email: &str, name: &str, tier: Tier) -> Result<()> {
    let key = match ctx.accounts.require_profile(user_id).await {
        Ok(profile) => {
            if profile.tier != tier {
                ctx.accounts.set_tier(user_id, tier).await?;
            }
            ctx.accounts.issue_key(user_id, name).await?
        }
        Err(AccountError::Unauthenticated) => {
            let (_, key) = ctx
                .accounts
                .register_as(user_id, email, None, Role::User, tier)
                .await?;
            key
        }
        Err(e) => return Err(e.into()),
    };

    info!(key_id = %key.id, tier = %key.tier, limit = key.usage_limit, "issued key");
    println!("{}", key.token);
    Ok(())
}

async fn import(ctx: &AppContext, file: &Path) -> Result<()> {
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let properties: Vec<Property> = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse {}", file.display()))?;

    let total = properties.len();
    let inserted = ctx.properties.insert_many(properties).await?;
    info!(total, inserted, "imported properties");
    Ok(())
}

/// SQLite will not create missing parent directories on its own.
fn ensure_sqlite_dir(database_url: &str) -> Result<()> {
    let Some(path) = database_url.strip_prefix("sqlite:") else {
        return Ok(());
    };
    let path = path.trim_start_matches("//");
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() || path == ":memory:" {
        return Ok(());
    }
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
