//! Storecast CLI - Database migrations and account management.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! storecast migrate
//!
//! # Make an existing account an admin, or back to a client
//! storecast profile promote -e admin@example.com
//! storecast profile demote -e admin@example.com
//!
//! # Create an invite link
//! storecast invite create -e new@example.com -r client
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `profile` - Switch an account's role
//! - `invite` - Create invite links

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "storecast")]
#[command(author, version, about = "Storecast CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage account roles
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// Manage invites
    Invite {
        #[command(subcommand)]
        action: InviteAction,
    },
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Give an account the admin role
    Promote {
        /// Account email address
        #[arg(short, long)]
        email: String,
    },
    /// Give an account the client role
    Demote {
        /// Account email address
        #[arg(short, long)]
        email: String,
    },
}

#[derive(Subcommand)]
enum InviteAction {
    /// Create an invite and print its acceptance URL
    Create {
        /// Email address to invite
        #[arg(short, long)]
        email: String,

        /// Role for the new account (`client`, `admin`)
        #[arg(short, long, default_value = "client")]
        role: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Profile { action } => match action {
            ProfileAction::Promote { email } => {
                commands::profile::set_role(&email, storecast_core::Role::Admin).await?;
            }
            ProfileAction::Demote { email } => {
                commands::profile::set_role(&email, storecast_core::Role::Client).await?;
            }
        },
        Commands::Invite { action } => match action {
            InviteAction::Create { email, role } => {
                let url = commands::invite::create(&email, &role).await?;
                #[allow(clippy::print_stdout)]
                {
                    println!("{url}");
                }
            }
        },
    }
    Ok(())
}
