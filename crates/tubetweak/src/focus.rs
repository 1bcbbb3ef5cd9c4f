//! FocusRing: keyboard focus cycling between tracked players.

/// A ring of items with an optional current position.
pub struct FocusRing<T> {
    items: Vec<T>,
    current: Option<usize>,
}

impl<T: Copy + PartialEq> FocusRing<T> {
    /// Build a ring positioned on `current` (if it is in `items`).
    pub fn new(items: Vec<T>, current: Option<T>) -> Self {
        let current = current.and_then(|c| items.iter().position(|&x| x == c));
        Self { items, current }
    }

    pub fn current(&self) -> Option<T> {
        self.current.and_then(|i| self.items.get(i).copied())
    }

    /// Advance, wrapping. With no current item the first one is chosen.
    pub fn advance(&mut self) -> Option<T> {
        if self.items.is_empty() {
            return None;
        }
        self.current = Some(match self.current {
            Some(i) => (i + 1) % self.items.len(),
            None => 0,
        });
        self.current()
    }

    /// Step back, wrapping. With no current item the last one is chosen.
    pub fn retreat(&mut self) -> Option<T> {
        if self.items.is_empty() {
            return None;
        }
        self.current = Some(match self.current {
            Some(0) | None => self.items.len() - 1,
            Some(i) => i - 1,
        });
        self.current()
    }
}
