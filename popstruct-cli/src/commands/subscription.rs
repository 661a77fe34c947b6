//! Subscription command handlers

use anyhow::Result;
use clap::Subcommand;
use colored::*;
use popstruct_core::dto::subscription::VerifyPayment;

use crate::config::Config;

/// Subscription subcommands
#[derive(Subcommand)]
pub enum SubscriptionCommands {
    /// Show the current plan and job quota
    Status,
    /// Create a payment order for the premium plan
    CreateOrder {
        /// Amount in the smallest currency unit
        amount: u64,
    },
    /// Confirm a completed payment
    Verify {
        #[arg(long)]
        order_id: String,

        #[arg(long)]
        payment_id: String,

        #[arg(long)]
        signature: String,
    },
}

pub async fn handle_subscription_command(
    command: SubscriptionCommands,
    config: &Config,
) -> Result<()> {
    let client = config.client();

    match command {
        SubscriptionCommands::Status => {
            let status = client.subscription_status().await?;

            println!("{}", "Subscription:".bold());
            println!("  Plan:      {}", status.subscription_tier.to_string().cyan());
            println!("  Jobs used: {}", status.jobs_used);
            match status.remaining() {
                Some(remaining) => println!("  Remaining: {}", remaining),
                None => println!("  Remaining: {}", "unlimited".green()),
            }
            if status.needs_upgrade {
                println!(
                    "\n{}",
                    "Job limit reached. Upgrade to premium to keep running analyses.".yellow()
                );
            }
        }
        SubscriptionCommands::CreateOrder { amount } => {
            let order = client.create_order(amount).await?;

            println!("{}", "Payment order:".bold());
            println!("  Order ID: {}", order.order_id.cyan());
            println!("  Amount:   {} {}", order.amount, order.currency);
            println!("  Key ID:   {}", order.key_id);
        }
        SubscriptionCommands::Verify {
            order_id,
            payment_id,
            signature,
        } => {
            let verification = client
                .verify_payment(&VerifyPayment {
                    order_id,
                    payment_id,
                    signature,
                })
                .await?;

            if !verification.success {
                anyhow::bail!(
                    "Payment verification failed: {}",
                    verification.message.unwrap_or_default()
                );
            }

            println!(
                "{} {}",
                "✓".green(),
                verification
                    .message
                    .unwrap_or_else(|| "Payment verified".to_string())
            );
            if let Some(tier) = verification.subscription_tier {
                println!("  Plan: {}", tier.to_string().cyan());
            }
        }
    }

    Ok(())
}
