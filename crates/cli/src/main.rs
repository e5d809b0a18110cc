//! Nagoyameshi CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations (schema and session table)
//! nm-cli migrate
//!
//! # Create a member who can log in and save favorites
//! nm-cli member create -e taro@example.com -n "Taro" -p "correct horse"
//!
//! # Load stores and categories from YAML
//! nm-cli seed stores crates/cli/seeds/stores.yaml
//! ```
//!
//! # Environment Variables
//!
//! - `NAGOYAMESHI_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "nm-cli")]
#[command(author, version, about = "Nagoyameshi CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage members
    Member {
        #[command(subcommand)]
        action: MemberAction,
    },
    /// Load seed data
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum MemberAction {
    /// Create a new member
    Create {
        /// Member email address
        #[arg(short, long)]
        email: String,

        /// Member display name
        #[arg(short, long)]
        name: String,

        /// Initial password (min 8 characters)
        #[arg(short, long)]
        password: String,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Insert stores and categories from a YAML file
    Stores {
        /// Path to the YAML file
        file: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Member { action } => match action {
            MemberAction::Create {
                email,
                name,
                password,
            } => {
                commands::member::create(&email, &name, &password).await?;
            }
        },
        Commands::Seed { target } => match target {
            SeedTarget::Stores { file } => commands::seed::stores(&file).await?,
        },
    }
    Ok(())
}
