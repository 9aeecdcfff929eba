use std::path::PathBuf;

use clap::{Parser, Subcommand};
use config_cache_client::ConfigClient;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "config-cli")]
#[command(about = "Management CLI for a config-cache server", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Bearer token for admin routes.
    #[arg(short, long)]
    key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a config document
    Get { name: String },
    /// Replace a config document with the contents of a file
    Update { name: String, file: PathBuf },
    /// Check server status
    Status,
    /// List resident configs and cache counters
    Stats,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let http = reqwest::Client::new();

    match cli.command {
        Commands::Get { name } => {
            let client = ConfigClient::new(http, &cli.url)?;
            let data = client.get(&name).await?;
            match serde_json::from_slice::<Value>(&data) {
                Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
                Err(_) => println!("{}", String::from_utf8_lossy(&data)),
            }
        }
        Commands::Update { name, file } => {
            let client = ConfigClient::new(http, &cli.url)?;
            let data = std::fs::read(&file)?;
            client.update(&name, data).await?;
            println!("Updated {name}");
        }
        Commands::Status => {
            let res = http
                .get(format!("{}/admin/status", cli.url.trim_end_matches('/')))
                .headers(admin_headers(cli.key.as_deref())?)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Stats => {
            let res = http
                .get(format!("{}/admin/stats", cli.url.trim_end_matches('/')))
                .headers(admin_headers(cli.key.as_deref())?)
                .send()
                .await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

fn admin_headers(key: Option<&str>) -> Result<HeaderMap, Box<dyn std::error::Error>> {
    let mut headers = HeaderMap::new();
    if let Some(key) = key {
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {key}"))?);
    }
    Ok(headers)
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: Admin API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
