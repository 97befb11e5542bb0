use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "obs-cli")]
#[command(about = "Inspection CLI for the observability core", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:9090")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check service status
    Status,
    /// Print metrics in exposition text format
    Metrics,
    /// Print the JSON metrics snapshot
    Snapshot,
    /// List active alerts and alert history
    Alerts,
    /// Show every span of a trace
    Trace { trace_id: String },
    /// Show a single span
    Span { span_id: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let path = match &cli.command {
        Commands::Status => "/health".to_string(),
        Commands::Metrics => "/metrics".to_string(),
        Commands::Snapshot => "/metrics/json".to_string(),
        Commands::Alerts => "/alerts".to_string(),
        Commands::Trace { trace_id } => format!("/traces/{}", trace_id),
        Commands::Span { span_id } => format!("/spans/{}", span_id),
    };

    let res = client.get(format!("{}{}", cli.url, path)).send().await?;
    match cli.command {
        Commands::Metrics => print_text(res).await,
        _ => print_response(res).await,
    }
}

async fn print_text(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    if !status.is_success() {
        eprintln!("Error: inspection API returned status {}", status);
        eprintln!("Response: {}", text);
        return Ok(());
    }
    print!("{}", text);
    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: inspection API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
