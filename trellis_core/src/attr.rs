// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Double-buffered, change-tracked attributes.
//!
//! A [`Tracked`] value keeps the value that was current at the last flush
//! alongside the live value. Assigning a value that differs from the flushed
//! one marks the attribute pending; the per-frame [`flush`](Tracked::flush)
//! then reports a single [`Transition`] no matter how many assignments
//! happened in between, and syncs the two buffers.
//!
//! The first flush only seeds the previous buffer, so a freshly constructed
//! attribute never reports a spurious initial transition.

/// A `before → after` change reported by [`Tracked::flush`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition<T> {
    /// Value at the previous flush.
    pub before: T,
    /// Value at this flush.
    pub after: T,
}

/// A double-buffered attribute.
#[derive(Clone, Debug, Default)]
pub struct Tracked<T> {
    current: T,
    previous: T,
    pending: bool,
    initialized: bool,
}

impl<T: Clone + PartialEq> Tracked<T> {
    /// Creates an attribute holding `value`.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            previous: value.clone(),
            current: value,
            pending: false,
            initialized: false,
        }
    }

    /// Returns the live value.
    #[inline]
    #[must_use]
    pub fn get(&self) -> &T {
        &self.current
    }

    /// Returns the value as of the last flush.
    #[inline]
    #[must_use]
    pub fn previous(&self) -> &T {
        &self.previous
    }

    /// Assigns a new live value.
    ///
    /// The attribute becomes pending iff the new value differs from the value
    /// at the last flush; setting it back cancels a pending transition.
    pub fn set(&mut self, value: T) {
        self.pending = value != self.previous;
        self.current = value;
    }

    /// Returns `true` if the next flush will report a transition.
    #[inline]
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.initialized && self.pending
    }

    /// Returns `true` once the attribute has been flushed at least once.
    #[inline]
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Syncs previous ← current and reports the transition, if any.
    pub fn flush(&mut self) -> Option<Transition<T>> {
        if !self.initialized {
            self.initialized = true;
            self.pending = false;
            self.previous = self.current.clone();
            return None;
        }
        if !self.pending {
            return None;
        }
        self.pending = false;
        let before = core::mem::replace(&mut self.previous, self.current.clone());
        Some(Transition {
            before,
            after: self.current.clone(),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_flush_is_silent() {
        let mut a = Tracked::new(1);
        a.set(2);
        assert_eq!(a.flush(), None);
        assert_eq!(*a.previous(), 2);
        assert!(a.is_initialized());
    }

    #[test]
    fn many_sets_one_transition() {
        let mut a = Tracked::new(0);
        a.flush();
        a.set(1);
        a.set(2);
        a.set(3);
        assert!(a.is_pending());
        assert_eq!(
            a.flush(),
            Some(Transition {
                before: 0,
                after: 3
            })
        );
        assert_eq!(a.flush(), None);
        assert_eq!(*a.previous(), 3);
    }

    #[test]
    fn setting_back_cancels() {
        let mut a = Tracked::new("idle");
        a.flush();
        a.set("busy");
        a.set("idle");
        assert!(!a.is_pending());
        assert_eq!(a.flush(), None);
    }

    #[test]
    fn equal_value_is_not_a_change() {
        let mut a = Tracked::new(5_u8);
        a.flush();
        a.set(5);
        assert_eq!(a.flush(), None);
    }
}
