use std::collections::VecDeque;

use engine::{rgb, with_alpha, DrawSurface, Rect, Rgba, LINE_HEIGHT_PX};
use tracing::{info, warn};

/// Five seconds at the fixed 60 Hz tick.
pub(crate) const MESSAGE_TTL_TICKS: u32 = 300;
const FADE_TICKS: u32 = 60;
pub(crate) const MAX_MESSAGES: usize = 5;

const LINE_SPACING_PX: i32 = 25;
const BOTTOM_OFFSET_PX: i32 = 20;
const BACKGROUND_PADDING_PX: i32 = 5;
const INFO_COLOR: Rgba = rgb(255, 255, 255);
const WARNING_COLOR: Rgba = rgb(255, 200, 80);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Severity {
    Info,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Message {
    pub(crate) text: String,
    pub(crate) severity: Severity,
    ticks_left: u32,
}

impl Message {
    /// Fully opaque until the last second, then a linear fade.
    pub(crate) fn alpha(&self) -> u8 {
        if self.ticks_left >= FADE_TICKS {
            u8::MAX
        } else {
            (self.ticks_left * 255 / FADE_TICKS) as u8
        }
    }
}

/// Short-lived status lines shown at the bottom of the window. Every message
/// is mirrored to the log.
#[derive(Debug, Default)]
pub(crate) struct MessageLog {
    entries: VecDeque<Message>,
}

impl MessageLog {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn info(&mut self, text: impl Into<String>) {
        let text = text.into();
        info!(message = text.as_str(), "editor_message");
        self.push(text, Severity::Info);
    }

    pub(crate) fn warn(&mut self, text: impl Into<String>) {
        let text = text.into();
        warn!(message = text.as_str(), "editor_message");
        self.push(text, Severity::Warning);
    }

    fn push(&mut self, text: String, severity: Severity) {
        self.entries.push_back(Message {
            text,
            severity,
            ticks_left: MESSAGE_TTL_TICKS,
        });
        while self.entries.len() > MAX_MESSAGES {
            self.entries.pop_front();
        }
    }

    pub(crate) fn tick(&mut self) {
        for entry in &mut self.entries {
            entry.ticks_left = entry.ticks_left.saturating_sub(1);
        }
        self.entries.retain(|entry| entry.ticks_left > 0);
    }

    /// Oldest first.
    #[cfg(test)]
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Message> {
        self.entries.iter()
    }

    #[cfg(test)]
    pub(crate) fn latest(&self) -> Option<&str> {
        self.entries.back().map(|entry| entry.text.as_str())
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Newest message at the bottom, older ones stacked above it.
    pub(crate) fn render(&self, surface: &mut dyn DrawSurface) {
        let (width, height) = surface.size();
        let mut bottom = height as i32 - BOTTOM_OFFSET_PX;
        for entry in self.entries.iter().rev() {
            let alpha = entry.alpha();
            let text_width = surface.measure_text(&entry.text);
            let x = (width as i32 - text_width) / 2;
            let y = bottom - LINE_HEIGHT_PX;
            let background = Rect::new(
                x - BACKGROUND_PADDING_PX,
                y - BACKGROUND_PADDING_PX,
                text_width + BACKGROUND_PADDING_PX * 2,
                LINE_HEIGHT_PX + BACKGROUND_PADDING_PX * 2,
            );
            surface.fill_rect(background, [0, 0, 0, (u32::from(alpha) * 7 / 10) as u8]);
            let color = match entry.severity {
                Severity::Info => INFO_COLOR,
                Severity::Warning => WARNING_COLOR,
            };
            surface.draw_text(x, y, &entry.text, with_alpha(color, alpha));
            bottom -= LINE_SPACING_PX;
        }
    }
}
