//! Snapshot rendering
//!
//! Pure functions of a [`Snapshot`]: nothing here spawns processes, so the
//! page can be tested with fixture results alone. Captured output is treated
//! as untrusted text and escaped before it lands inside `<pre>`.

use crate::snapshot::{Slot, Snapshot};
use crate::ui::PAGE_TEMPLATE;
use std::fmt::Write;
use thiserror::Error;

pub const DEFAULT_TITLE: &str = "miRNAselector";

/// Markers every page template must carry. `{{title}}` and `{{captured_at}}`
/// are filled when present.
const REQUIRED_SLOTS: [&str; 1] = ["sections"];

/// Text that opens a failed slot's placeholder.
pub const UNAVAILABLE_PREFIX: &str = "capture failed:";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("page template has no {{{{{0}}}}} slot")]
    MissingSlot(&'static str),
    #[error("failed to serialize snapshot: {0}")]
    Json(#[from] serde_json::Error),
}

/// Escapes text for use in HTML element content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    out
}

#[derive(Debug, Clone)]
pub struct PageRenderer {
    template: String,
    title: String,
}

impl Default for PageRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_TITLE)
    }
}

impl PageRenderer {
    pub fn new(title: impl Into<String>) -> Self {
        Self::with_template(PAGE_TEMPLATE, title)
    }

    pub fn with_template(template: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            title: title.into(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Fills the page template with one section per slot, in slot order.
    pub fn render_snapshot(&self, snapshot: &Snapshot) -> Result<String, RenderError> {
        for name in REQUIRED_SLOTS {
            if !self.template.contains(&marker(name)) {
                return Err(RenderError::MissingSlot(name));
            }
        }

        let title = escape_html(&self.title);
        let captured_at = escape_html(&snapshot.captured_at.to_rfc3339());
        let sections = render_sections(&snapshot.slots);

        Ok(fill(&self.template, |name| match name {
            "title" => Some(title.as_str()),
            "captured_at" => Some(captured_at.as_str()),
            "sections" => Some(sections.as_str()),
            _ => None,
        }))
    }
}

/// Structured rendering of the same snapshot.
pub fn render_json(snapshot: &Snapshot) -> Result<String, RenderError> {
    Ok(serde_json::to_string_pretty(&snapshot.view())?)
}

fn marker(name: &str) -> String {
    format!("{{{{{name}}}}}")
}

/// Single-pass substitution of `{{name}}` markers. Substituted text is never
/// rescanned, so markers inside captured output stay literal.
fn fill<'a>(template: &str, lookup: impl Fn(&str) -> Option<&'a str>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after = &rest[open + 2..];
        match after.find("}}") {
            Some(close) => match lookup(&after[..close]) {
                Some(value) => {
                    out.push_str(value);
                    rest = &after[close + 2..];
                }
                None => {
                    out.push_str("{{");
                    rest = after;
                }
            },
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

fn render_sections(slots: &[Slot]) -> String {
    let mut html = String::new();
    for slot in slots {
        render_slot(&mut html, slot);
    }
    html
}

fn render_slot(html: &mut String, slot: &Slot) {
    let spec = &slot.spec;
    let _ = writeln!(
        html,
        "  <section id=\"{}\" class=\"snapshot-slot\">",
        escape_html(spec.id)
    );
    let _ = writeln!(
        html,
        "    <h3>{} <small><code>{}</code></small></h3>",
        escape_html(spec.label),
        escape_html(&spec.command_line())
    );

    match &slot.outcome {
        Ok(result) => {
            let _ = writeln!(html, "    <pre>{}</pre>", pre_body(&result.output));
            if result.truncated {
                html.push_str("    <p class=\"snapshot-note\">output truncated</p>\n");
            }
            if !result.success() {
                let note = match result.exit_status {
                    Some(code) => format!("exit status {code}"),
                    None => "terminated by signal".to_string(),
                };
                let _ = writeln!(html, "    <p class=\"snapshot-note\">{note}</p>");
                if !result.stderr.is_empty() {
                    let _ = writeln!(
                        html,
                        "    <pre class=\"snapshot-stderr\">{}</pre>",
                        pre_body(&result.stderr)
                    );
                }
            }
        }
        Err(err) => {
            let _ = writeln!(
                html,
                "    <pre class=\"snapshot-unavailable\">{} {}</pre>",
                UNAVAILABLE_PREFIX,
                escape_html(&err.to_string())
            );
        }
    }

    html.push_str("  </section>\n");
}

/// HTML parsers drop one newline directly after `<pre>`; pad so a leading
/// newline in the output survives.
fn pre_body(text: &str) -> String {
    let escaped = escape_html(text);
    if escaped.starts_with('\n') {
        format!("\n{escaped}")
    } else {
        escaped
    }
}
