// ABOUTME: Output formatting for CLI feedback and dispatch results.
// ABOUTME: Supports normal (tables), quiet (ids only), and JSON lines output modes.

use dockpanel::dispatch::{OperationError, Payload};
use dockpanel::runtime::{ContainerSummary, ImageSummary, StatsSnapshot};
use serde::Serialize;
use std::time::Instant;

/// Output mode for CLI feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputMode {
    /// Human-friendly tables and progress messages
    Normal,
    /// Minimal output for scripts (ids and raw text only)
    Quiet,
    /// JSON lines
    Json,
}

/// Handles CLI output based on the configured mode.
pub struct Output {
    mode: OutputMode,
    start_time: Option<Instant>,
}

impl Output {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            start_time: None,
        }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Start timing an operation.
    pub fn start_timer(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Get elapsed time since timer started.
    pub fn elapsed_secs(&self) -> f64 {
        self.start_time
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    /// Print a progress message (suppressed in quiet/json mode).
    pub fn progress(&self, message: &str) {
        if self.mode == OutputMode::Normal {
            println!("{message}");
        }
    }

    /// Print a success message with optional timing.
    pub fn success(&self, message: &str) {
        match self.mode {
            OutputMode::Normal => {
                let elapsed = self.elapsed_secs();
                if elapsed > 0.0 {
                    println!("{message} ({:.1}s)", elapsed);
                } else {
                    println!("{message}");
                }
            }
            OutputMode::Quiet => println!("{message}"),
            OutputMode::Json => self.emit_json(&JsonEvent {
                event: "success",
                message: Some(message),
                error_kind: None,
                result: None,
                duration_secs: self.duration(),
            }),
        }
    }

    /// Print a dispatch result in the current mode.
    pub fn payload(&self, payload: &Payload) {
        match self.mode {
            OutputMode::Normal => match payload {
                Payload::Done(message) => self.success(message),
                Payload::Created { short_id, .. } => {
                    self.success(&format!("Started container {short_id}"))
                }
                other => print!("{}", render_normal(other)),
            },
            OutputMode::Quiet => print!("{}", render_quiet(payload)),
            OutputMode::Json => self.emit_json(&JsonEvent {
                event: "result",
                message: None,
                error_kind: None,
                result: Some(payload),
                duration_secs: self.duration(),
            }),
        }
    }

    /// Print a failed dispatch, keeping its kind in JSON mode.
    pub fn operation_error(&self, error: &OperationError) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => eprintln!("Error: {error}"),
            OutputMode::Json => {
                let message = error.to_string();
                self.emit_json_err(&JsonEvent {
                    event: "error",
                    message: Some(&message),
                    error_kind: Some(error.kind()),
                    result: None,
                    duration_secs: self.duration(),
                });
            }
        }
    }

    /// Print an error message.
    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => {
                eprintln!("Error: {message}");
            }
            OutputMode::Json => self.emit_json_err(&JsonEvent {
                event: "error",
                message: Some(message),
                error_kind: None,
                result: None,
                duration_secs: self.duration(),
            }),
        }
    }

    fn duration(&self) -> Option<f64> {
        self.start_time.map(|_| self.elapsed_secs())
    }

    fn emit_json(&self, event: &JsonEvent<'_>) {
        if let Ok(json) = serde_json::to_string(event) {
            println!("{json}");
        }
    }

    fn emit_json_err(&self, event: &JsonEvent<'_>) {
        if let Ok(json) = serde_json::to_string(event) {
            eprintln!("{json}");
        }
    }
}

#[derive(Serialize)]
struct JsonEvent<'a> {
    event: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_kind: Option<dockpanel::dispatch::OperationErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<&'a Payload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_secs: Option<f64>,
}

/// Human rendering: tables for listings, labelled values for stats.
pub fn render_normal(payload: &Payload) -> String {
    match payload {
        Payload::Containers(containers) => container_table(containers),
        Payload::Images(images) => image_table(images),
        Payload::Stats(stats) => stats_lines(stats),
        Payload::Done(message) => format!("{message}\n"),
        Payload::Created { short_id, .. } => format!("Started container {short_id}\n"),
        Payload::Text(text) => with_newline(text),
    }
}

/// Script rendering: one id per line for listings, raw numbers for stats.
pub fn render_quiet(payload: &Payload) -> String {
    match payload {
        Payload::Containers(containers) => containers
            .iter()
            .map(|c| format!("{}\n", c.id))
            .collect(),
        Payload::Images(images) => images.iter().map(|i| format!("{}\n", i.id)).collect(),
        Payload::Stats(stats) => format!("{:.2} {}\n", stats.memory_mb, stats.cpu_total_usage),
        Payload::Done(message) => format!("{message}\n"),
        Payload::Created { id, .. } => format!("{id}\n"),
        Payload::Text(text) => with_newline(text),
    }
}

fn with_newline(text: &str) -> String {
    if text.is_empty() || text.ends_with('\n') {
        text.to_string()
    } else {
        format!("{text}\n")
    }
}

fn container_table(containers: &[ContainerSummary]) -> String {
    let rows: Vec<[String; 4]> = containers
        .iter()
        .map(|c| {
            let image = if c.image_tags.is_empty() {
                c.image.clone()
            } else {
                c.image_tags.join(", ")
            };
            [c.short_id.clone(), c.name.clone(), image, c.status.clone()]
        })
        .collect();
    table(["CONTAINER ID", "NAME", "IMAGE", "STATUS"], &rows)
}

fn image_table(images: &[ImageSummary]) -> String {
    let rows: Vec<[String; 3]> = images
        .iter()
        .map(|i| {
            let tags = if i.tags.is_empty() {
                "<none>".to_string()
            } else {
                i.tags.join(", ")
            };
            let size = format!("{:.1} MB", i.size as f64 / (1u64 << 20) as f64);
            [i.short_id.clone(), tags, size]
        })
        .collect();
    table(["IMAGE ID", "TAGS", "SIZE"], &rows)
}

fn stats_lines(stats: &StatsSnapshot) -> String {
    format!(
        "Memory usage: {:.2} MB\nCPU total usage: {}\n",
        stats.memory_mb, stats.cpu_total_usage
    )
}

/// Left-aligned columns separated by three spaces, last column unpadded.
fn table<const N: usize>(headers: [&str; N], rows: &[[String; N]]) -> String {
    let mut widths = headers.map(str::len);
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let mut out = String::new();
    let mut push_row = |cells: Vec<&str>| {
        let last = cells.len() - 1;
        for (i, cell) in cells.iter().enumerate() {
            if i == last {
                out.push_str(cell);
            } else {
                out.push_str(&format!("{:<width$}   ", cell, width = widths[i]));
            }
        }
        out.push('\n');
    };

    push_row(headers.to_vec());
    for row in rows {
        push_row(row.iter().map(String::as_str).collect());
    }
    out
}
