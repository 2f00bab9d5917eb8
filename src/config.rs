//! Editor configuration.

use std::time::Duration;

/// Which input adapter the editor drives.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InputStyle {
    /// Hidden text field that is polled and diffed against the last seen value.
    #[default]
    Textarea,
    /// Editable region where the host reports inserted text directly.
    ContentEditable,
}

/// Which scrollbar strategy the editor drives.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ScrollbarStyle {
    /// Host-native scrollbars sized from the viewport metrics.
    #[default]
    Native,
    /// No scrollbars; nothing is reserved at the edges.
    Null,
}

/// Editor options.
///
/// Values are read at the points where the display needs them, so changing
/// an option through [`crate::Editor::set_options`] takes effect on the next
/// flush.
#[derive(Clone, Debug, PartialEq)]
pub struct EditorOptions {
    /// Extra lines rendered above and below the visible area.
    pub viewport_margin: usize,
    /// Wrap long lines instead of scrolling horizontally.
    pub line_wrapping: bool,
    /// Show the line-number gutter.
    pub line_numbers: bool,
    /// Number shown for the first document line.
    pub first_line_number: usize,
    /// Gutter ids in display order, used to place gutter markers.
    pub gutters: Vec<String>,
    /// Keep the gutter fixed while scrolling horizontally.
    pub fixed_gutter: bool,
    /// Highlight worker budget per slice.
    pub work_time: Duration,
    /// Delay before the highlight worker resumes after a slice.
    pub work_delay: Duration,
    /// Interval between polls of the hidden input field.
    pub poll_interval: Duration,
    /// How long a finished composition waits before its text is applied.
    pub composition_settle: Duration,
    /// Delay before a blur is acted on, so refocusing clicks do not flicker.
    pub blur_delay: Duration,
    /// Pixels kept between the cursor and the edge when scrolling it into view.
    pub cursor_scroll_margin: f64,
    /// Starting wheel calibration, in pixels per reported wheel unit.
    pub wheel_pixels_per_unit: Option<f64>,
    /// Number of wheel samples averaged before calibration stops.
    pub wheel_sample_limit: u32,
    /// Time a wheel sample waits before reading the scroll it caused.
    pub wheel_sample_delay: Duration,
    /// Reject edits coming from input events.
    pub read_only: bool,
    /// Text shown in place of folded lines.
    pub fold_marker: String,
    /// Columns per tab stop.
    pub tab_size: usize,
    /// Input adapter selection.
    pub input_style: InputStyle,
    /// Scrollbar strategy selection.
    pub scrollbar_style: ScrollbarStyle,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            viewport_margin: 10,
            line_wrapping: false,
            line_numbers: false,
            first_line_number: 1,
            gutters: Vec::new(),
            fixed_gutter: true,
            work_time: Duration::from_millis(200),
            work_delay: Duration::from_millis(300),
            poll_interval: Duration::from_millis(100),
            composition_settle: Duration::from_millis(20),
            blur_delay: Duration::from_millis(150),
            cursor_scroll_margin: 0.0,
            wheel_pixels_per_unit: None,
            wheel_sample_limit: 20,
            wheel_sample_delay: Duration::from_millis(200),
            read_only: false,
            fold_marker: "\u{2194}".to_string(),
            tab_size: 4,
            input_style: InputStyle::Textarea,
            scrollbar_style: ScrollbarStyle::Native,
        }
    }
}

impl EditorOptions {
    /// Options with line numbers turned on.
    #[must_use]
    pub fn with_line_numbers() -> Self {
        Self {
            line_numbers: true,
            ..Self::default()
        }
    }

    /// Format the gutter label for a document line.
    #[must_use]
    pub fn line_number_for(&self, line: usize) -> String {
        (line + self.first_line_number).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = EditorOptions::default();
        assert_eq!(opts.viewport_margin, 10);
        assert_eq!(opts.wheel_sample_limit, 20);
        assert!(!opts.line_wrapping);
        assert_eq!(opts.input_style, InputStyle::Textarea);
    }

    #[test]
    fn test_line_number_for_uses_offset() {
        let mut opts = EditorOptions::with_line_numbers();
        assert_eq!(opts.line_number_for(0), "1");
        opts.first_line_number = 0;
        assert_eq!(opts.line_number_for(99), "99");
    }
}
