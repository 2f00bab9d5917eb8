//! Wheel delta calibration.
//!
//! Wheel events report deltas in units whose pixel size differs between
//! platforms. The first few events are sampled: the scroll they caused is
//! read back after a delay and averaged into a pixels-per-unit estimate.
//! Once an estimate exists, the window is extended ahead of the scroll so
//! fast wheeling does not show unrendered space.

use tracing::{debug, trace};

use crate::Editor;
use crate::host::DomHost;
use crate::input::{WheelDeltaMode, WheelEvent};
use crate::timers::TimerKind;

use super::ScrollAxis;

/// Extra pixels rendered beyond the projected wheel scroll.
const WHEEL_PROJECTION_SLACK: f64 = 50.0;

#[derive(Clone, Copy, Debug, PartialEq)]
struct WheelSample {
    start_x: f64,
    start_y: f64,
    dx: f64,
    dy: f64,
}

/// Running pixels-per-unit estimate of one editor.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WheelCalibration {
    pixels_per_unit: Option<f64>,
    samples: u32,
    pending: Option<WheelSample>,
}

impl WheelCalibration {
    /// Start from an optional platform default.
    #[must_use]
    pub fn new(pixels_per_unit: Option<f64>) -> Self {
        Self {
            pixels_per_unit,
            samples: 0,
            pending: None,
        }
    }

    #[must_use]
    pub fn pixels_per_unit(&self) -> Option<f64> {
        self.pixels_per_unit
    }

    #[must_use]
    pub fn samples(&self) -> u32 {
        self.samples
    }

    #[must_use]
    pub fn is_sampling(&self) -> bool {
        self.pending.is_some()
    }

    /// Drop a sample in progress. Returns whether there was one.
    pub fn abort(&mut self) -> bool {
        self.pending.take().is_some()
    }

    /// Fold the scroll observed since the sample started into the
    /// estimate.
    pub fn complete(&mut self, scroll_left: f64, scroll_top: f64) -> Option<f64> {
        let sample = self.pending.take()?;
        let moved_x = scroll_left - sample.start_x;
        let moved_y = scroll_top - sample.start_y;
        let ratio = if moved_y != 0.0 && sample.dy != 0.0 {
            moved_y / sample.dy
        } else if moved_x != 0.0 && sample.dx != 0.0 {
            moved_x / sample.dx
        } else {
            return None;
        };
        let n = f64::from(self.samples);
        let next = (self.pixels_per_unit.unwrap_or(0.0) * n + ratio) / (n + 1.0);
        self.pixels_per_unit = Some(next);
        self.samples += 1;
        Some(next)
    }
}

impl<H: DomHost> Editor<H> {
    /// Handle a wheel event. Returns whether the platform's default
    /// scrolling should be suppressed.
    pub(crate) fn on_scroll_wheel(&mut self, event: &WheelEvent) -> bool {
        let (mut dx, mut dy) = (event.dx, event.dy);
        let mut pixels_per_unit = self.wheel.pixels_per_unit;
        if event.mode == WheelDeltaMode::Pixel {
            pixels_per_unit = Some(1.0);
        } else if event.mode == WheelDeltaMode::Page {
            let (width, height) = self.host.wrapper_size();
            dx *= width;
            dy *= height;
            pixels_per_unit = Some(1.0);
        }

        let scroller = self.host.scroller();
        let can_x = scroller.scroll_width > scroller.client_width;
        let can_y = scroller.scroll_height > scroller.client_height;
        if !((dx != 0.0 && can_x) || (dy != 0.0 && can_y)) {
            return false;
        }

        if dx != 0.0 {
            if let Some(ppu) = pixels_per_unit {
                if dy != 0.0 && can_y {
                    self.scroll_to(ScrollAxis::Vertical, (scroller.scroll_top + dy * ppu).max(0.0));
                }
                self.scroll_to(ScrollAxis::Horizontal, (scroller.scroll_left + dx * ppu).max(0.0));
                self.wheel.abort();
                self.timers.clear(TimerKind::WheelSample);
                return dy == 0.0 || can_y;
            }
        }

        if dy != 0.0 {
            if let Some(ppu) = pixels_per_unit {
                let pixels = dy * ppu;
                let mut top = self.display.scroll_top;
                let mut bottom = top + self.host.wrapper_size().1;
                if pixels < 0.0 {
                    top = (top + pixels - WHEEL_PROJECTION_SLACK).max(0.0);
                } else {
                    bottom = self
                        .display
                        .heights
                        .total()
                        .min(bottom + pixels + WHEEL_PROJECTION_SLACK);
                }
                trace!(top, bottom, "projecting wheel scroll");
                self.update_display_simple(crate::display::Viewport {
                    top: Some(top),
                    bottom: Some(bottom),
                    ensure: None,
                });
            }
        }

        if self.wheel.samples < self.options.wheel_sample_limit && event.mode != WheelDeltaMode::Pixel {
            match self.wheel.pending.as_mut() {
                Some(sample) => {
                    sample.dx += dx;
                    sample.dy += dy;
                }
                None => {
                    self.wheel.pending = Some(WheelSample {
                        start_x: scroller.scroll_left,
                        start_y: scroller.scroll_top,
                        dx,
                        dy,
                    });
                    let at = self.host.now() + self.options.wheel_sample_delay;
                    self.timers.set(TimerKind::WheelSample, at);
                }
            }
        }
        false
    }

    /// The wheel sample timer fired.
    pub(crate) fn finish_wheel_sample(&mut self) {
        let scroller = self.host.scroller();
        if let Some(ppu) = self.wheel.complete(scroller.scroll_left, scroller.scroll_top) {
            debug!(ppu, samples = self.wheel.samples, "wheel calibration sample");
        }
    }

    /// Current wheel calibration.
    #[must_use]
    pub fn wheel_calibration(&self) -> &WheelCalibration {
        &self.wheel
    }
}
