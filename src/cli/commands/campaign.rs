use anyhow::bail;
use clap::Subcommand;
use serde_json::json;

use crate::cli::config::CliConfig;
use crate::cli::utils::{output_collection, output_error, output_success};
use crate::cli::OutputFormat;
use crate::client::{CampaignClient, ClientError};
use crate::database::models::{Campaign, CampaignStatus};

#[derive(Subcommand)]
pub enum CampaignCommands {
    #[command(about = "List the team's campaigns")]
    List,

    #[command(about = "Create a campaign")]
    Create {
        #[arg(help = "Campaign name")]
        name: String,
        #[arg(long, help = "Initial status: draft, active, or completed (default: draft)")]
        status: Option<String>,
    },

    #[command(about = "Transition a campaign's status")]
    SetStatus {
        #[arg(help = "Campaign id")]
        id: i64,
        #[arg(help = "New status: draft, active, or completed")]
        status: String,
    },
}

pub async fn handle(cmd: CampaignCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = CliConfig::from_env();
    let mut client = CampaignClient::new(config.base_url.clone(), config.session_token.clone());

    match cmd {
        CampaignCommands::List => match client.campaigns().await {
            Ok(campaigns) => output_collection(
                &output_format,
                "campaigns",
                &campaigns,
                "No campaigns yet",
                describe,
            ),
            Err(e) => report(e, &output_format),
        },
        CampaignCommands::Create { name, status } => {
            let status = status.as_deref().map(parse_status).transpose()?;
            match client.create(&name, status).await {
                Ok(campaign) => output_success(
                    &output_format,
                    &format!("Created campaign {} ({})", campaign.id, campaign.name),
                    Some(json!({ "campaign": campaign })),
                ),
                Err(e) => report(e, &output_format),
            }
        }
        CampaignCommands::SetStatus { id, status } => {
            let status = parse_status(&status)?;
            match client.set_status(id, status).await {
                Ok(campaign) => output_success(
                    &output_format,
                    &format!("Campaign {} is now {}", campaign.id, campaign.status),
                    Some(json!({ "campaign": campaign })),
                ),
                Err(e) => report(e, &output_format),
            }
        }
    }
}

fn parse_status(raw: &str) -> anyhow::Result<CampaignStatus> {
    match CampaignStatus::parse(raw) {
        Some(status) => Ok(status),
        None => bail!("invalid status '{}', expected draft, active, or completed", raw),
    }
}

fn describe(campaign: &Campaign) -> String {
    format!(
        "#{:<4} {:<30} {:<10} (updated {})",
        campaign.id,
        campaign.name,
        campaign.status,
        campaign.updated_at.format("%Y-%m-%d %H:%M")
    )
}

fn report(error: ClientError, output_format: &OutputFormat) -> anyhow::Result<()> {
    output_error(output_format, &error.to_string())?;
    std::process::exit(1);
}
