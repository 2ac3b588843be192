use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use wire::{ContactForm, remote::PortfolioClient};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Base URL including any route prefix.
    #[arg(long, default_value = "http://localhost:1111")]
    url: String,

    /// Bearer token sent with every request.
    #[arg(long, env = "PORTFOLIO_TOKEN")]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Submit a contact form.
    Contact {
        name: String,
        email: String,
        subject: String,
        message: String,
    },

    /// Record one project view. Never fails, like the site.
    View { project_id: String, title: String },

    /// List contact submissions.
    Contacts,

    /// List project analytics.
    Analytics,

    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let client = match args.token {
        Some(token) => PortfolioClient::new(args.url).with_api_key(token),
        None => PortfolioClient::new(args.url),
    };

    match args.command {
        Command::Contact {
            name,
            email,
            subject,
            message,
        } => {
            let form = ContactForm {
                name,
                email,
                subject,
                message,
            };
            client.submit_contact_form(&form).await?;
            println!("Submitted");
        }
        Command::View { project_id, title } => {
            client.track_project_view(&project_id, &title).await;
            println!("Sent");
        }
        Command::Contacts => print(&client.contact_submissions().await?)?,
        Command::Analytics => print(&client.project_analytics().await?)?,
        Command::Health => print(&client.health().await?)?,
    }

    Ok(())
}

fn print<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);

    Ok(())
}
