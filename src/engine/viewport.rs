//! Zoom and pan state for the item on screen.
//!
//! At rest the scale is 1 and the translation is pinned to the origin. Panning
//! is only accepted while zoomed. Zooming back out to 1 (or `reset_zoom`) lets
//! the translation settle towards the origin over successive `tick` calls,
//! while switching items snaps everything back at once.

/// Minimum zoom scale allowed
pub const MIN_SCALE: f64 = 1.0;
/// Maximum zoom scale allowed
pub const MAX_SCALE: f64 = 8.0;
/// Zoom step for one wheel notch
pub const WHEEL_STEP: f64 = 0.25;
/// Zoom step for the zoom in/out controls
pub const BUTTON_STEP: f64 = 0.5;
/// Decay rate (per second) of the translation while settling.
const SETTLE_RATE: f64 = 12.0;
/// Below this distance (px) the translation snaps to the origin.
const SETTLE_EPSILON: f64 = 0.5;

/// Callback receiving the rounded zoom percentage after every change.
pub type ScaleChangedCallback = Box<dyn FnMut(u32)>;

pub struct Viewport {
    scale: f64,
    translate_x: f64,
    translate_y: f64,
    settling: bool,
    on_scale_changed: Option<ScaleChangedCallback>,
}

impl std::fmt::Debug for Viewport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Viewport")
            .field("scale", &self.scale)
            .field("translate_x", &self.translate_x)
            .field("translate_y", &self.translate_y)
            .field("settling", &self.settling)
            .field("on_scale_changed", &"<closure>")
            .finish()
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new()
    }
}

impl Viewport {
    pub fn new() -> Self {
        Self {
            scale: MIN_SCALE,
            translate_x: 0.0,
            translate_y: 0.0,
            settling: false,
            on_scale_changed: None,
        }
    }

    /// Connect callback for the zoom percentage readout
    pub fn connect_scale_changed<F>(&mut self, callback: F)
    where
        F: FnMut(u32) + 'static,
    {
        self.on_scale_changed = Some(Box::new(callback));
    }

    #[cfg(test)]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn translation(&self) -> (f64, f64) {
        (self.translate_x, self.translate_y)
    }

    pub fn is_zoomed(&self) -> bool {
        self.scale > MIN_SCALE
    }

    /// True while the translation is still animating back to the origin.
    pub fn is_settling(&self) -> bool {
        self.settling
    }

    pub fn percent(&self) -> u32 {
        (self.scale * 100.0).round() as u32
    }

    pub fn zoom_in(&mut self, step: f64) -> bool {
        self.zoom_by(step.abs())
    }

    pub fn zoom_out(&mut self, step: f64) -> bool {
        self.zoom_by(-step.abs())
    }

    /// Wheel zoom: scrolling up (negative delta) zooms in by one step.
    pub fn wheel(&mut self, delta_y: f64) -> bool {
        if delta_y == 0.0 || delta_y.is_nan() {
            return false;
        }
        self.zoom_by(-delta_y.signum() * WHEEL_STEP)
    }

    fn zoom_by(&mut self, delta: f64) -> bool {
        let new_scale = (self.scale + delta).clamp(MIN_SCALE, MAX_SCALE);
        if (new_scale - self.scale).abs() < f64::EPSILON {
            return false;
        }
        self.scale = new_scale;
        if !self.is_zoomed() {
            self.begin_settle();
        }
        self.notify();
        true
    }

    /// Back to 1x, with the translation animating home.
    pub fn reset_zoom(&mut self) {
        let changed = self.is_zoomed();
        self.scale = MIN_SCALE;
        self.begin_settle();
        if changed {
            self.notify();
        }
    }

    /// Drag-to-translate. Ignored at rest.
    pub fn pan_by(&mut self, dx: f64, dy: f64) -> bool {
        if !self.is_zoomed() {
            return false;
        }
        self.translate_x += dx;
        self.translate_y += dy;
        self.settling = false;
        true
    }

    /// Advances the settle animation by `dt` seconds. Returns true while still moving.
    pub fn tick(&mut self, dt: f64) -> bool {
        if !self.settling {
            return false;
        }
        let factor = (-dt.max(0.0) * SETTLE_RATE).exp();
        self.translate_x *= factor;
        self.translate_y *= factor;
        if self.translate_x.hypot(self.translate_y) < SETTLE_EPSILON {
            self.translate_x = 0.0;
            self.translate_y = 0.0;
            self.settling = false;
        }
        self.settling
    }

    /// Instant reset for a newly displayed item, never animated.
    pub fn reset_for_new_item(&mut self) {
        let changed = self.is_zoomed();
        self.scale = MIN_SCALE;
        self.translate_x = 0.0;
        self.translate_y = 0.0;
        self.settling = false;
        if changed {
            self.notify();
        }
    }

    fn begin_settle(&mut self) {
        self.settling = self.translate_x != 0.0 || self.translate_y != 0.0;
    }

    fn notify(&mut self) {
        let percent = self.percent();
        if let Some(callback) = self.on_scale_changed.as_mut() {
            callback(percent);
        }
    }
}
