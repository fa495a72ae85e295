pub mod api;
pub mod capture;
pub mod config;
pub mod metrics;
pub mod render;
pub mod snapshot;
pub mod ui;

pub use api::{AppState, router};
pub use capture::{
    CaptureError, CaptureLimits, CommandResult, CommandRunner, CommandSpec, SystemRunner,
    capture_command, default_commands,
};
pub use config::{CaptureConfig, Config, ConfigError, LoggingConfig, PageConfig, ServerConfig};
pub use metrics::Metrics;
pub use render::{PageRenderer, RenderError, escape_html, render_json};
pub use snapshot::{Slot, Snapshot, take_snapshot};
