use colored::*;
use reqwest::Client;
use serde::Deserialize;
use std::error::Error;

#[derive(Deserialize, Debug)]
struct HealthResponse {
    #[allow(dead_code)]
    status: String,
}

#[derive(Deserialize, Debug)]
struct StatusResponse {
    version: String,
    uptime_s: u64,
    timeout_ms: u64,
    commands: Vec<String>,
    requests_total: u64,
    capture_failures: u64,
    capture_timeouts: u64,
    render_errors: u64,
}

pub async fn run_doctor(client: &Client, url: &str) -> Result<(), Box<dyn Error>> {
    println!("{}", "🩺 Hostsnap Doctor".bold().cyan());
    println!("{}", "Checking daemon health...".dimmed());
    println!();

    let mut all_good = true;

    // 1. Connectivity
    print!("• Daemon Connectivity: ");
    match client.get(format!("{}/healthz", url)).send().await {
        Ok(resp) => {
            if resp.status().is_success() {
                if resp.json::<HealthResponse>().await.is_ok() {
                    println!("{}", "OK".green());
                } else {
                    println!("{}", "OK (Invalid JSON)".yellow());
                }
            } else {
                println!("{}", format!("FAIL (Status {})", resp.status()).red());
                all_good = false;
            }
        }
        Err(e) => {
            println!("{}", format!("FAIL ({})", e).red());
            println!("  → Is hostsnapd running? Try 'systemctl status hostsnapd'");
            return Ok(());
        }
    }

    // 2. Status
    print!("• Daemon Status:       ");
    let resp = client
        .get(format!("{}/status", url))
        .send()
        .await
        .and_then(|resp| resp.error_for_status());
    let status: StatusResponse = match resp {
        Ok(resp) => match resp.json().await {
            Ok(status) => status,
            Err(e) => {
                println!("{}", format!("FAIL (Invalid JSON: {})", e).red());
                return Ok(());
            }
        },
        Err(e) => {
            println!("{}", format!("FAIL ({})", e).red());
            return Ok(());
        }
    };
    println!("{}", format!("OK (v{})", status.version).green());

    print!("• Uptime:              ");
    if status.uptime_s < 60 {
        println!("{}", format!("{}s (Just started)", status.uptime_s).yellow());
    } else {
        println!("{}", format!("{}s", status.uptime_s).green());
    }

    print!("• Commands:            ");
    println!("{}", status.commands.join(", "));

    print!("• Capture Timeout:     ");
    println!("{}", format!("{} ms", status.timeout_ms).green());

    print!("• Requests Served:     ");
    println!("{}", status.requests_total.to_string().green());

    // 3. Capture health
    print!("• Capture Failures:    ");
    if status.capture_failures > 0 {
        println!("{}", format!("{} (Check binaries)", status.capture_failures).red());
        all_good = false;
    } else {
        println!("{}", "0".green());
    }

    print!("• Capture Timeouts:    ");
    if status.capture_timeouts > 0 {
        println!("{}", format!("{} (Slow host?)", status.capture_timeouts).yellow());
    } else {
        println!("{}", "0".green());
    }

    print!("• Render Errors:       ");
    if status.render_errors > 0 {
        println!("{}", status.render_errors.to_string().red());
        all_good = false;
    } else {
        println!("{}", "0".green());
    }

    println!();
    if all_good {
        println!("{}", "✅ Daemon is healthy.".bold().green());
    } else {
        println!("{}", "⚠️  Daemon has issues. See above.".bold().yellow());
    }

    Ok(())
}
