#![forbid(unsafe_code)]

//! The theme-state collaborator.
//!
//! The orchestrator never owns theme state. It reads the light/dark flag,
//! asks for a flip, and advances a persisted effect cursor through this
//! trait; hosts back it with whatever persistence they already have.

/// Light/dark state plus the round-robin effect cursor.
pub trait ThemeStore {
    /// Whether the dark theme is active right now.
    fn is_dark(&self) -> bool;

    /// Flip between light and dark.
    fn toggle_theme(&mut self);

    /// Raw rotation cursor. The orchestrator reduces it modulo the number of
    /// enabled effects.
    fn effect_cursor(&self) -> usize;

    /// Move the cursor to the next effect in a rotation of `len` entries.
    fn advance_effect(&mut self, len: usize);
}

impl<T: ThemeStore + ?Sized> ThemeStore for &mut T {
    fn is_dark(&self) -> bool {
        (**self).is_dark()
    }

    fn toggle_theme(&mut self) {
        (**self).toggle_theme();
    }

    fn effect_cursor(&self) -> usize {
        (**self).effect_cursor()
    }

    fn advance_effect(&mut self, len: usize) {
        (**self).advance_effect(len);
    }
}

/// In-process store with no persistence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryThemeStore {
    dark: bool,
    cursor: usize,
    toggles: u64,
}

impl MemoryThemeStore {
    pub fn new(dark: bool) -> Self {
        Self {
            dark,
            cursor: 0,
            toggles: 0,
        }
    }

    /// Start the rotation at `cursor`.
    #[must_use]
    pub fn with_cursor(mut self, cursor: usize) -> Self {
        self.cursor = cursor;
        self
    }

    /// How many times the theme has been flipped.
    pub fn toggles(&self) -> u64 {
        self.toggles
    }
}

impl ThemeStore for MemoryThemeStore {
    fn is_dark(&self) -> bool {
        self.dark
    }

    fn toggle_theme(&mut self) {
        self.dark = !self.dark;
        self.toggles += 1;
    }

    fn effect_cursor(&self) -> usize {
        self.cursor
    }

    fn advance_effect(&mut self, len: usize) {
        self.cursor = (self.cursor + 1) % len.max(1);
    }
}
