use clap::{Parser, Subcommand};
use reqwest::Client;
use serde::Deserialize;
use std::error::Error;

mod doctor;
mod show;

#[derive(clap::Parser, Debug)]
struct Args {
    /// Base URL of the hostsnapd service
    #[clap(long, default_value = "http://127.0.0.1:8080")]
    url: String,

    /// Disable colorized output
    #[clap(long)]
    no_color: bool,

    /// Subcommands
    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq)]
enum Command {
    /// Print the current snapshot (default)
    Show,
    /// Check daemon health and capture errors
    Doctor,
    /// Print daemon counters
    Status,
}

#[derive(Deserialize, Debug)]
struct Status {
    uptime_s: u64,
    requests_total: u64,
    capture_failures: u64,
    capture_timeouts: u64,
    render_errors: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let client = Client::new();
    if args.no_color {
        colored::control::set_override(false);
    }

    match args.command.unwrap_or(Command::Show) {
        Command::Show => show::run_show(&client, &args.url).await?,
        Command::Doctor => doctor::run_doctor(&client, &args.url).await?,
        Command::Status => {
            let status: Status = client
                .get(format!("{}/status", args.url))
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;
            println!(
                "{:<10} {:<10} {:<10} {:<10} {}",
                "uptime_s", "requests", "failures", "timeouts", "render_errors"
            );
            println!(
                "{:<10} {:<10} {:<10} {:<10} {}",
                status.uptime_s,
                status.requests_total,
                status.capture_failures,
                status.capture_timeouts,
                status.render_errors
            );
        }
    }
    Ok(())
}
