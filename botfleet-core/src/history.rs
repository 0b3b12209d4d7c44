//! Input recall for the command line.
//!
//! The cursor parks one past the newest entry after each submit. Moving
//! up walks toward the oldest entry and stops there; moving down walks
//! back toward the newest and then onto the fresh-input sentinel (`/`).
//! Submitting a string that is already in the history moves it to the end
//! instead of adding a second copy.

use crate::router::COMMAND_PREFIX;

#[derive(Debug, Clone, Default)]
pub struct InputHistory {
    entries: Vec<String>,
    position: usize,
}

impl InputHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// The text shown in an empty input line.
    pub fn sentinel() -> String {
        COMMAND_PREFIX.to_string()
    }

    /// Step toward older entries. `None` when already at the oldest.
    pub fn navigate_up(&mut self) -> Option<&str> {
        if self.position == 0 {
            return None;
        }
        self.position -= 1;
        Some(&self.entries[self.position])
    }

    /// Step toward newer entries, ending on the sentinel.
    /// `None` when already past the newest entry.
    pub fn navigate_down(&mut self) -> Option<String> {
        if self.position >= self.entries.len() {
            return None;
        }
        self.position += 1;
        Some(
            self.entries
                .get(self.position)
                .cloned()
                .unwrap_or_else(Self::sentinel),
        )
    }

    pub fn submit(&mut self, text: &str) {
        self.entries.retain(|e| e != text);
        self.entries.push(text.to_string());
        self.position = self.entries.len();
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
