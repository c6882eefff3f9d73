use std::cell::Cell;
use std::io::Write;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::engine::viewport::{BUTTON_STEP, MIN_SCALE};
use crate::engine::{DeleteOutcome, EngineResult, MediaBackend, QueueController};
use crate::models::{Settings, SettingsStore, ShortcutAction, SortBy, SortOrder};
use crate::ui::keybindings::resolve;
use crate::ui::{KeyAction, KeyPress, RebindCapture, Terminal};

/// Frame interval for the zoom-reset settle animation.
const FRAME: Duration = Duration::from_millis(16);

const HELP: &[&str] = &[
    "Keys: type a key name (ArrowRight, Delete, 1..9, Ctrl+z) and press Enter",
    ":source <path> | :pick            set the source folder",
    ":dest add [path] | :dest rm <n|path>",
    ":filter <ext> | :group <common|raw|video>",
    ":sort <name|date|size> [asc|desc]",
    ":bind <next|prev|delete>          then type the new key",
    ":zoom in|out|reset | :wheel <dy> | :pan <dx> <dy>",
    ":jump <n> | :help | :quit",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct App<B: MediaBackend, W: Write> {
    store: SettingsStore,
    settings: Settings,
    queue: QueueController<B>,
    terminal: Terminal<W>,
    rebind: RebindCapture,
    zoom_percent: Rc<Cell<u32>>,
}

impl<B: MediaBackend, W: Write> App<B, W> {
    pub fn new(backend: Arc<B>, store: SettingsStore, terminal: Terminal<W>) -> Result<Self> {
        let settings = Settings::load(&store)?;
        let mut queue = QueueController::new(backend, settings.filter.clone());

        let zoom_percent = Rc::new(Cell::new(queue.viewport().percent()));
        let readout = Rc::clone(&zoom_percent);
        queue.viewport_mut().connect_scale_changed(move |percent| {
            debug!(percent, "Zoom changed");
            readout.set(percent);
        });

        Ok(Self {
            store,
            settings,
            queue,
            terminal,
            rebind: RebindCapture::new(),
            zoom_percent,
        })
    }

    /// Event loop: input lines, load results and animation frames.
    pub async fn run(&mut self, initial_source: Option<String>) {
        if let Some(source) = initial_source {
            let result = self.queue.set_source(source).await;
            self.report(result);
        }
        self.render();

        let input = self.terminal.input().clone();
        let events = self.queue.load_events();
        let mut frames = tokio::time::interval(FRAME);
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                line = input.recv_async() => {
                    let Ok(line) = line else { break };
                    if self.handle_line(&line).await == Flow::Quit {
                        break;
                    }
                    self.render();
                }
                event = events.recv() => {
                    let Ok(event) = event else { break };
                    if self.queue.accept_load(event) {
                        self.render();
                    }
                }
                _ = frames.tick(), if self.queue.viewport().is_settling() => {
                    self.queue.viewport_mut().tick(FRAME.as_secs_f64());
                }
            }
        }
        info!("Exiting");
    }

    fn render(&mut self) {
        let zoom = self.zoom_percent.get();
        self.terminal.render(&self.queue, zoom);
    }

    fn report<T>(&mut self, result: EngineResult<T>) {
        if let Err(e) = result {
            self.terminal.notice(&e.to_string());
        }
    }

    pub async fn handle_line(&mut self, line: &str) -> Flow {
        let line = line.trim();

        if self.rebind.is_active() {
            if line == ":cancel" {
                self.rebind.cancel();
                return Flow::Continue;
            }
            self.capture_binding(line);
            return Flow::Continue;
        }

        if line.is_empty() {
            return Flow::Continue;
        }

        match line.strip_prefix(':') {
            Some(command) => self.handle_command(command).await,
            None => {
                if let Some(press) = KeyPress::parse(line) {
                    self.handle_key(&press).await;
                }
                Flow::Continue
            }
        }
    }

    fn capture_binding(&mut self, line: &str) {
        let Some(press) = KeyPress::parse(line) else {
            return;
        };
        let Some(action) = self.rebind.capture(&press, &mut self.settings.shortcuts) else {
            if let Some(waiting) = self.rebind.listening() {
                self.terminal
                    .notice(&format!("{line} can't be bound; press a plain key for {waiting}"));
            }
            return;
        };
        info!("Bound {} to {}", action, press.key);
        if let Err(e) = self.settings.save_shortcuts(&self.store) {
            warn!("Failed to save shortcuts: {:#}", e);
            self.terminal.notice("Could not save shortcuts");
        }
    }

    pub async fn handle_key(&mut self, press: &KeyPress) {
        let action = resolve(
            press,
            &self.settings.shortcuts,
            self.queue.destinations().len(),
            self.queue.is_done(),
        );
        let Some(action) = action else {
            debug!("Unbound key {:?}", press.key);
            return;
        };

        match action {
            KeyAction::Next => {
                self.queue.next();
            }
            KeyAction::Prev => {
                self.queue.prev();
            }
            KeyAction::Delete => match self.queue.delete_current(&mut self.terminal).await {
                Ok(DeleteOutcome::Deleted) | Ok(DeleteOutcome::Nothing) => {}
                Ok(DeleteOutcome::Declined) => debug!("Delete cancelled"),
                Err(e) => self.terminal.notice(&e.to_string()),
            },
            KeyAction::Undo => match self.queue.undo().await {
                Ok(Some(filename)) => self.terminal.notice(&format!("Restored {filename}")),
                Ok(None) => self.terminal.notice("Nothing to undo"),
                Err(e) => self.terminal.notice(&e.to_string()),
            },
            KeyAction::MoveTo(slot) => {
                let result = self.queue.move_to_slot(slot).await;
                self.report(result);
            }
        }
    }

    async fn handle_command(&mut self, command: &str) -> Flow {
        let mut args = command.split_whitespace();
        let Some(name) = args.next() else {
            return Flow::Continue;
        };
        let rest: Vec<&str> = args.collect();

        match (name, rest.as_slice()) {
            ("quit" | "q", _) => return Flow::Quit,
            ("help", _) => {
                for line in HELP {
                    self.terminal.print(line);
                }
            }
            ("source", [..]) if !rest.is_empty() => {
                let result = self.queue.set_source(rest.join(" ")).await;
                self.report(result);
            }
            ("pick", _) => {
                let result = self.queue.pick_source(&mut self.terminal).await;
                self.report(result);
            }
            ("dest", ["add"]) => {
                if !self.queue.pick_destination(&mut self.terminal).await {
                    self.terminal.notice("No destination added");
                }
            }
            ("dest", ["add", path @ ..]) => {
                if !self.queue.add_destination(path.join(" ")) {
                    self.terminal.notice("Destination already listed");
                }
            }
            ("dest", ["rm", target @ ..]) if !target.is_empty() => {
                let target = target.join(" ");
                let folder = match target.parse::<usize>() {
                    Ok(slot) => self.queue.destinations().for_slot(slot).map(str::to_string),
                    Err(_) => Some(target),
                };
                let removed = folder.is_some_and(|f| self.queue.remove_destination(&f));
                if !removed {
                    self.terminal.notice("No such destination");
                }
            }
            ("filter", [ext]) => {
                let result = self.queue.toggle_extension(ext).await;
                self.filter_changed(result);
            }
            ("group", [group]) => {
                let result = self.queue.toggle_group(group).await;
                self.filter_changed(result);
            }
            ("sort", [by, order @ ..]) if order.len() <= 1 => {
                let sort_by = by.parse::<SortBy>();
                let sort_order = match order.first() {
                    Some(o) => o.parse::<SortOrder>(),
                    None => Ok(self.queue.filter().sort_order),
                };
                match (sort_by, sort_order) {
                    (Ok(by), Ok(order)) => {
                        let result = self.queue.set_sort(by, order).await;
                        self.filter_changed(result);
                    }
                    (Err(e), _) | (_, Err(e)) => self.terminal.notice(&e.to_string()),
                }
            }
            ("bind", [action]) => match action.parse::<ShortcutAction>() {
                Ok(action) => {
                    self.rebind.begin(action);
                    self.terminal
                        .print(&format!("Press the new key for {action} (:cancel to keep it)"));
                }
                Err(e) => self.terminal.notice(&e.to_string()),
            },
            ("zoom", ["in"]) => {
                self.queue.viewport_mut().zoom_in(BUTTON_STEP);
            }
            ("zoom", ["out"]) => {
                self.queue.viewport_mut().zoom_out(BUTTON_STEP);
            }
            ("zoom", ["reset"]) => self.queue.viewport_mut().reset_zoom(),
            ("wheel", [dy]) => match dy.parse::<f64>() {
                Ok(dy) => {
                    self.queue.viewport_mut().wheel(dy);
                }
                Err(_) => self.terminal.notice("Usage: :wheel <dy>"),
            },
            ("pan", [dx, dy]) => match (dx.parse::<f64>(), dy.parse::<f64>()) {
                (Ok(dx), Ok(dy)) => {
                    if !self.queue.viewport_mut().pan_by(dx, dy) {
                        self.terminal
                            .notice(&format!("Zoom past {:.0}% to pan", MIN_SCALE * 100.0));
                    }
                }
                _ => self.terminal.notice("Usage: :pan <dx> <dy>"),
            },
            ("jump", [n]) => match n.parse::<usize>() {
                Ok(n) if n >= 1 => {
                    self.queue.jump_to(n - 1);
                }
                _ => self.terminal.notice("Usage: :jump <n>"),
            },
            _ => self
                .terminal
                .notice(&format!("Unknown command :{command} (:help lists commands)")),
        }
        Flow::Continue
    }

    /// Persists the sort/filter defaults after a successful change.
    fn filter_changed(&mut self, result: EngineResult<bool>) {
        if let Err(e) = result {
            self.terminal.notice(&e.to_string());
            return;
        }
        if self.settings.filter == *self.queue.filter() {
            return;
        }
        self.settings.filter = self.queue.filter().clone();
        if let Err(e) = self.settings.save_filter(&self.store) {
            warn!("Failed to save sort/filter defaults: {:#}", e);
            self.terminal.notice("Could not save sort/filter defaults");
        }
    }
}

#[cfg(test)]
impl<B: MediaBackend, W: Write> App<B, W> {
    pub fn queue(&self) -> &QueueController<B> {
        &self.queue
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> &SettingsStore {
        &self.store
    }

    pub fn terminal(&self) -> &Terminal<W> {
        &self.terminal
    }

    pub fn zoom_percent(&self) -> u32 {
        self.zoom_percent.get()
    }
}
