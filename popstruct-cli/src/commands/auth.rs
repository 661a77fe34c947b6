//! Auth command handlers

use anyhow::Result;
use clap::Subcommand;
use colored::*;

use crate::config::Config;

/// Auth subcommands
#[derive(Subcommand)]
pub enum AuthCommands {
    /// Log in and store the session
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long, env = "POPSTRUCT_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account
    Signup {
        #[arg(short, long)]
        email: String,

        #[arg(short, long, env = "POPSTRUCT_PASSWORD", hide_env_values = true)]
        password: String,

        /// Display name
        #[arg(long)]
        full_name: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show the logged-in account
    Whoami,
}

pub async fn handle_auth_command(command: AuthCommands, config: &Config) -> Result<()> {
    let client = config.client();

    match command {
        AuthCommands::Login { email, password } => {
            client.login(&email, &password).await?;
            println!("{} Logged in as {}", "✓".green(), email.bold());
        }
        AuthCommands::Signup {
            email,
            password,
            full_name,
        } => {
            client
                .signup(&email, &password, full_name.as_deref())
                .await?;
            println!("{} Account created for {}", "✓".green(), email.bold());
        }
        AuthCommands::Logout => {
            client.logout()?;
            println!("{} Logged out", "✓".green());
        }
        AuthCommands::Whoami => {
            let user = client.me().await?;
            println!("{}", "Account:".bold());
            println!("  Email: {}", user.email.cyan());
            if let Some(name) = &user.full_name {
                println!("  Name:  {}", name);
            }
            println!("  Plan:  {}", user.subscription_tier);
            if user.is_admin {
                println!("  Role:  {}", "admin".yellow());
            }
        }
    }

    Ok(())
}
