use account_service::{AccountService, AccountServiceConfig};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

/// Account Service CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Set the log level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Database URL (overrides DATABASE_URL and the DB_* variables)
    #[arg(short, long)]
    database_url: Option<String>,

    /// Database pool size
    #[arg(short, long)]
    pool_size: Option<u32>,

    /// Commands
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the accounts table
    CreateTable,
    /// Drop the accounts table
    DropTable,
    /// Open an account for an existing user
    CreateAccount {
        /// Owning user ID
        #[arg(short, long)]
        user_id: Uuid,
    },
    /// Show one account by account number
    Get {
        /// Account number
        #[arg(short, long)]
        account_no: Uuid,
    },
    /// Show the account owned by a user
    GetByUser {
        /// Owning user ID
        #[arg(short, long)]
        user_id: Uuid,
    },
    /// List every account owned by a user
    ListByUser {
        /// Owning user ID
        #[arg(short, long)]
        user_id: Uuid,
    },
    /// List all accounts
    List,
    /// Check database connectivity
    Ping,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!(
            "account_service={level},common={level}",
            level = cli.log_level
        )))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = AccountServiceConfig::from_env()?;
    if let Some(url) = cli.database_url {
        config.database_url = Some(url);
    }
    if let Some(pool_size) = cli.pool_size {
        config.db_pool_size = pool_size;
    }

    let service = AccountService::with_config(&config).await?;

    if let Err(err) = run(&service, cli.command).await {
        error!("Command failed: {}", err);
        return Err(err);
    }

    Ok(())
}

async fn run(service: &AccountService, command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::CreateTable => {
            service.create_account_table().await?;
            info!("Created accounts table");
        }
        Commands::DropTable => {
            service.drop_accounts_table().await?;
            info!("Dropped accounts table");
        }
        Commands::CreateAccount { user_id } => {
            let account_no = service.create_account(user_id).await?;
            println!("{}", account_no);
        }
        Commands::Get { account_no } => {
            let account = service.get_by_account_no(account_no).await?;
            print_json(&account)?;
        }
        Commands::GetByUser { user_id } => {
            let account = service.get_account_by_user_id(user_id).await?;
            print_json(&account)?;
        }
        Commands::ListByUser { user_id } => {
            let accounts = service.get_accounts_by_user_id(user_id).await?;
            print_json(&accounts)?;
        }
        Commands::List => {
            let accounts = service.get_all_accounts().await?;
            print_json(&accounts)?;
        }
        Commands::Ping => {
            service.ping().await?;
            info!("Database is reachable");
        }
    }

    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", render_json(value)?);
    Ok(())
}

fn render_json<T: serde::Serialize>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use common::decimal::Amount;
    use common::model::account::Account;

    use super::*;

    #[test]
    fn test_render_account_as_json() {
        let account = Account::new(Uuid::new_v4(), Uuid::new_v4(), Amount::ZERO, Amount::from(500));

        let json = render_json(&vec![account.clone()]).unwrap();
        let parsed: Vec<Account> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, vec![account]);
    }

    #[test]
    fn test_unserializable_output_is_an_error() {
        // JSON object keys must be strings
        let value: HashMap<(u8, u8), u8> = HashMap::from([((1, 2), 3)]);

        assert!(render_json(&value).is_err());
        assert!(print_json(&value).is_err());
    }
}
