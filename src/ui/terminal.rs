//! Line-driven front end.
//!
//! Stdin is read on a dedicated thread and forwarded over a flume channel so
//! the event loop can await input alongside load results. Prompts read the
//! next line from the same channel.

use std::io::{self, BufRead, Write};
use std::thread;

use flume::{Receiver, Sender};
use tracing::{debug, warn};

use crate::engine::{Displayed, Interaction, MediaBackend, PreviewState, QueueController};
use crate::models::MediaKind;

/// Terminal state shared between the event loop and the prompts.
pub struct Terminal<W: Write> {
    input: Receiver<String>,
    out: W,
}

impl Terminal<io::Stdout> {
    /// Starts the stdin reader thread.
    pub fn stdio() -> Self {
        let (tx, rx) = flume::unbounded();
        thread::Builder::new()
            .name("stdin-reader".into())
            .spawn(move || read_lines(io::stdin().lock(), tx))
            .map_err(|e| warn!("Failed to start stdin reader: {}", e))
            .ok();
        Self::new(rx, io::stdout())
    }
}

fn read_lines<R: BufRead>(reader: R, tx: Sender<String>) {
    for line in reader.lines() {
        match line {
            Ok(line) => {
                if tx.send(line).is_err() {
                    break;
                }
            }
            Err(e) => {
                warn!("Failed to read input: {}", e);
                break;
            }
        }
    }
    debug!("Input closed");
}

impl<W: Write> Terminal<W> {
    pub fn new(input: Receiver<String>, out: W) -> Self {
        Self { input, out }
    }

    /// Next input line, or `None` once input is closed.
    pub async fn next_line(&mut self) -> Option<String> {
        self.input.recv_async().await.ok()
    }

    pub fn input(&self) -> &Receiver<String> {
        &self.input
    }

    #[cfg(test)]
    pub fn out(&self) -> &W {
        &self.out
    }

    pub fn print(&mut self, line: &str) {
        if let Err(e) = writeln!(self.out, "{line}").and_then(|_| self.out.flush()) {
            warn!("Failed to write output: {}", e);
        }
    }

    pub fn notice(&mut self, message: &str) {
        self.print(&format!("! {message}"));
    }

    pub fn render<B: MediaBackend>(&mut self, queue: &QueueController<B>, zoom_percent: u32) {
        for line in status_lines(queue, zoom_percent) {
            self.print(&line);
        }
    }
}

impl<W: Write> Interaction for Terminal<W> {
    async fn pick_folder(&mut self, title: &str) -> Option<String> {
        self.print(&format!("{title} (empty line cancels):"));
        let line = self.next_line().await?;
        let path = line.trim();
        (!path.is_empty()).then(|| path.to_string())
    }

    async fn confirm(&mut self, title: &str, description: &str) -> bool {
        self.print(&format!("{title} {description} [y/N]"));
        match self.next_line().await {
            Some(answer) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
            None => false,
        }
    }
}

/// Text rendition of the current screen.
pub fn status_lines<B: MediaBackend>(queue: &QueueController<B>, zoom_percent: u32) -> Vec<String> {
    let mut lines = Vec::new();

    let Some(source) = queue.source() else {
        lines.push("No source folder. Use :source <path> or :pick".to_string());
        return lines;
    };

    if queue.is_done() {
        lines.push(format!("All done! Nothing left to sort in {source}"));
        if let Some(entry) = queue.history().peek() {
            lines.push(format!("Ctrl+Z undoes: {}", entry.description()));
        }
        return lines;
    }

    let total = queue.items().len();
    let index = queue.current_index();
    let filename = queue.current().unwrap_or_default();
    let kind = MediaKind::from_filename(filename);
    let mut header = format!(
        "[{}/{}] {} ({}) {}%",
        index + 1,
        total,
        filename,
        kind.label(),
        zoom_percent
    );
    let (dx, dy) = queue.viewport().translation();
    if (dx, dy) != (0.0, 0.0) {
        header.push_str(&format!(" pan {dx:.0},{dy:.0}"));
    }
    lines.push(header);

    if let Some(shown) = queue.displayed() {
        lines.push(preview_line(shown));
        if let Some(meta) = &shown.metadata {
            for (label, value) in meta.rows() {
                lines.push(format!("  {label}: {value}"));
            }
        } else if shown.metadata_loaded {
            lines.push("  No metadata".to_string());
        }
    }

    lines.push(strip_line(queue));

    for (slot, dest) in queue.destinations().iter().enumerate() {
        lines.push(format!("  {}: {}", slot + 1, dest));
    }
    lines
}

fn preview_line(shown: &Displayed) -> String {
    match &shown.preview {
        PreviewState::Loading => "  Loading...".to_string(),
        PreviewState::Ready(preview) if shown.shows_backdrop() => {
            format!("  {} (backdrop)", preview.describe())
        }
        PreviewState::Ready(preview) => format!("  {}", preview.describe()),
        PreviewState::Unavailable(reason) => format!("  No preview: {reason}"),
    }
}

fn strip_line<B: MediaBackend>(queue: &QueueController<B>) -> String {
    let window = queue.window();
    let current = window.current_offset(queue.current_index());
    let mut parts = Vec::with_capacity(window.items.len() + 2);
    if window.has_more_before {
        parts.push("...".to_string());
    }
    for (offset, name) in window.items.iter().enumerate() {
        if Some(offset) == current {
            parts.push(format!("[{name}]"));
        } else {
            parts.push(name.clone());
        }
    }
    if window.has_more_after {
        parts.push("...".to_string());
    }
    parts.join(" ")
}
