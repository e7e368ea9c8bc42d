//! Fogon CLI - migrations, seed data and operator tasks.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations (schema + session store)
//! fogon-cli migrate
//!
//! # Insert a demo menu
//! fogon-cli seed
//!
//! # Set or show the delivery fee
//! fogon-cli config delivery-fee 5000
//! fogon-cli config show
//!
//! # Create or promote a staff account
//! fogon-cli staff create --phone "+57 300 123 4567" --name "Ana" --role admin
//! ```
//!
//! # Environment Variables
//!
//! - `FOGON_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "fogon-cli")]
#[command(author, version, about = "Fogon CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Insert a demo menu and business configuration
    Seed,
    /// Business configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Manage staff accounts
    Staff {
        #[command(subcommand)]
        action: StaffAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Set the delivery fee (whole pesos)
    DeliveryFee {
        /// New fee
        amount: u32,
    },
    /// Show the current configuration
    Show,
}

#[derive(Subcommand)]
enum StaffAction {
    /// Create a staff account, or promote the customer with that phone
    Create {
        /// Phone number (normalized before storing)
        #[arg(short, long)]
        phone: String,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// Role (`staff` or `admin`)
        #[arg(short, long, default_value = "staff")]
        role: String,
    },
}

#[tokio::main]
async fn main() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "fogon_cli=info,fogon_server=info".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed => commands::seed::run().await?,
        Commands::Config { action } => match action {
            ConfigAction::DeliveryFee { amount } => {
                commands::config::set_delivery_fee(amount).await?;
            }
            ConfigAction::Show => commands::config::show().await?,
        },
        Commands::Staff { action } => match action {
            StaffAction::Create { phone, name, role } => {
                commands::staff::create(&phone, &name, &role).await?;
            }
        },
    }
    Ok(())
}
