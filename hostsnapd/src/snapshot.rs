use crate::capture::{CaptureError, CaptureLimits, CommandResult, CommandRunner, CommandSpec, capture_command};
use crate::metrics::Metrics;
use chrono::{DateTime, Utc};
use log::warn;
use serde::Serialize;

/// One command's slot in a snapshot.
#[derive(Debug, Clone)]
pub struct Slot {
    pub spec: CommandSpec,
    pub outcome: Result<CommandResult, CaptureError>,
}

/// Captured output of every configured command for a single request.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub captured_at: DateTime<Utc>,
    pub slots: Vec<Slot>,
}

impl Snapshot {
    pub fn failures(&self) -> usize {
        self.slots.iter().filter(|s| s.outcome.is_err()).count()
    }
}

/// Runs `commands` in order. Never fails: a command that cannot be captured
/// leaves its error in the slot and the next command still runs.
pub async fn take_snapshot(
    runner: &dyn CommandRunner,
    commands: &[CommandSpec],
    limits: &CaptureLimits,
    metrics: &Metrics,
) -> Snapshot {
    let captured_at = Utc::now();
    let mut slots = Vec::with_capacity(commands.len());

    for spec in commands {
        let outcome = capture_command(runner, spec, limits).await;
        match &outcome {
            Ok(_) => metrics.inc_captures_ok(),
            Err(err) => {
                warn!("[snapshot] {err}");
                if err.is_timeout() {
                    metrics.inc_capture_timeouts();
                } else {
                    metrics.inc_capture_failures();
                }
            }
        }
        slots.push(Slot {
            spec: *spec,
            outcome,
        });
    }

    Snapshot { captured_at, slots }
}

#[derive(Debug, Serialize)]
pub(crate) struct SnapshotView<'a> {
    pub captured_at: String,
    pub commands: Vec<SlotView<'a>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SlotView<'a> {
    pub id: &'static str,
    pub label: &'static str,
    pub command: String,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stderr: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_status: Option<i32>,
    pub truncated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<'a> SlotView<'a> {
    fn new(slot: &'a Slot) -> Self {
        let mut view = SlotView {
            id: slot.spec.id,
            label: slot.spec.label,
            command: slot.spec.command_line(),
            status: "ok",
            output: None,
            stderr: None,
            exit_status: None,
            truncated: false,
            elapsed_ms: None,
            error_kind: None,
            error: None,
        };
        match &slot.outcome {
            Ok(result) => {
                view.output = Some(&result.output);
                view.stderr = (!result.stderr.is_empty()).then_some(result.stderr.as_str());
                view.exit_status = result.exit_status;
                view.truncated = result.truncated;
                view.elapsed_ms = Some(result.elapsed_ms);
            }
            Err(err) => {
                view.status = "failed";
                view.error_kind = Some(err.kind());
                view.error = Some(err.to_string());
            }
        }
        view
    }
}

impl Snapshot {
    pub(crate) fn view(&self) -> SnapshotView<'_> {
        SnapshotView {
            captured_at: self.captured_at.to_rfc3339(),
            commands: self.slots.iter().map(SlotView::new).collect(),
        }
    }
}
