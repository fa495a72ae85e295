use colored::*;
use reqwest::Client;
use serde::Deserialize;
use std::error::Error;

#[derive(Debug, Deserialize)]
pub struct SnapshotResponse {
    pub captured_at: String,
    pub commands: Vec<SlotResponse>,
}

#[derive(Debug, Deserialize)]
pub struct SlotResponse {
    pub label: String,
    pub command: String,
    pub status: SlotStatus,
    pub output: Option<String>,
    pub stderr: Option<String>,
    pub exit_status: Option<i32>,
    #[serde(default)]
    pub truncated: bool,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    Ok,
    Failed,
}

pub async fn run_show(client: &Client, url: &str) -> Result<(), Box<dyn Error>> {
    let snapshot: SnapshotResponse = client
        .get(format!("{}/snapshot.json", url))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    println!("{}", format!("Snapshot at {}", snapshot.captured_at).dimmed());
    for slot in &snapshot.commands {
        println!();
        println!("{} {}", slot.label.bold().cyan(), format!("({})", slot.command).dimmed());
        print!("{}", render_slot(slot));
    }
    Ok(())
}

fn render_slot(slot: &SlotResponse) -> String {
    let mut out = String::new();
    match slot.status {
        SlotStatus::Ok => {
            let output = slot.output.as_deref().unwrap_or_default();
            out.push_str(output);
            if !output.is_empty() && !output.ends_with('\n') {
                out.push('\n');
            }
            if slot.truncated {
                out.push_str(&format!("{}\n", "(output truncated)".yellow()));
            }
            match slot.exit_status {
                Some(0) => {}
                Some(code) => out.push_str(&format!("{}\n", format!("exit status {code}").yellow())),
                None => out.push_str(&format!("{}\n", "terminated by signal".yellow())),
            }
            if let Some(stderr) = slot.stderr.as_deref().filter(|_| slot.exit_status != Some(0)) {
                out.push_str(&format!("{}\n", stderr.trim_end().red()));
            }
        }
        SlotStatus::Failed => {
            let error = slot.error.as_deref().unwrap_or("unknown error");
            out.push_str(&format!("{}\n", format!("capture failed: {error}").red()));
        }
    }
    out
}
