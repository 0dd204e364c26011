// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rolling redraw statistics and grading.

use trellis_core::Damage;

/// How much of the screen recent frames redrew.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RedrawGrade {
    /// Almost nothing is redrawn.
    Idle,
    /// Small regions are redrawn.
    Partial,
    /// Most frames redraw most of the screen.
    Heavy,
}

impl RedrawGrade {
    /// Returns a short label for overlays and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Partial => "partial",
            Self::Heavy => "heavy",
        }
    }
}

/// Aggregated report returned by [`FrameStats::observe`].
#[derive(Clone, Copy, Debug)]
pub struct StatsReport {
    /// Current grade.
    pub grade: RedrawGrade,
    /// This frame's damaged fraction of the screen, in `0.0..=1.0`.
    pub fraction: f64,
    /// Mean damaged fraction over the window.
    pub mean_fraction: f64,
    /// Total frames observed.
    pub total_frames: u64,
    /// Frames that presented anything.
    pub presented_frames: u64,
    /// Frames that redrew the whole root.
    pub full_redraws: u64,
}

/// Rolling redraw tracker over the last `N` frames.
#[derive(Debug)]
pub struct FrameStats<const N: usize> {
    fractions: [f64; N],
    cursor: usize,
    total_frames: u64,
    presented_frames: u64,
    full_redraws: u64,
}

impl<const N: usize> Default for FrameStats<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> FrameStats<N> {
    /// Creates a tracker whose window starts out idle.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            fractions: [0.0; N],
            cursor: 0,
            total_frames: 0,
            presented_frames: 0,
            full_redraws: 0,
        }
    }

    /// Observes one frame's damage against the screen area.
    pub fn observe(&mut self, damage: &Damage, screen_area: f64) -> StatsReport {
        let fraction = if screen_area > 0.0 {
            (damage.area() / screen_area).clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.total_frames = self.total_frames.saturating_add(1);
        if damage.changed() {
            self.presented_frames = self.presented_frames.saturating_add(1);
        }
        if matches!(damage, Damage::Full(_)) {
            self.full_redraws = self.full_redraws.saturating_add(1);
        }
        self.fractions[self.cursor % N] = fraction;
        self.cursor = (self.cursor + 1) % N;

        let mean_fraction = self.mean_fraction();
        StatsReport {
            grade: grade_for(mean_fraction),
            fraction,
            mean_fraction,
            total_frames: self.total_frames,
            presented_frames: self.presented_frames,
            full_redraws: self.full_redraws,
        }
    }

    /// Mean damaged fraction over the window.
    #[must_use]
    pub fn mean_fraction(&self) -> f64 {
        self.fractions.iter().sum::<f64>() / N as f64
    }

    /// Current grade of the window.
    #[must_use]
    pub fn grade(&self) -> RedrawGrade {
        grade_for(self.mean_fraction())
    }

    /// Returns the window's fractions oldest→newest.
    #[must_use]
    pub fn fractions(&self) -> [f64; N] {
        core::array::from_fn(|i| self.fractions[(self.cursor + i) % N])
    }

    /// Returns an ASCII sparkline of the window, one column per frame.
    #[must_use]
    pub fn sparkline_ascii(&self) -> String {
        const LEVELS: &[u8] = b" .:-=+*#%@";
        self.fractions()
            .iter()
            .map(|&f| {
                #[expect(
                    clippy::cast_possible_truncation,
                    reason = "index is clamped to ASCII level count"
                )]
                let level = (f.clamp(0.0, 1.0) * (LEVELS.len() as f64 - 1.0) + 0.5) as usize;
                LEVELS[level] as char
            })
            .collect()
    }
}

fn grade_for(mean_fraction: f64) -> RedrawGrade {
    if mean_fraction < 0.05 {
        RedrawGrade::Idle
    } else if mean_fraction < 0.5 {
        RedrawGrade::Partial
    } else {
        RedrawGrade::Heavy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_core::Rect;

    const SCREEN: f64 = 100.0 * 100.0;

    fn full() -> Damage {
        Damage::Full(Rect::new(0.0, 0.0, 100.0, 100.0))
    }

    fn patch() -> Damage {
        Damage::Rects(vec![Rect::new(0.0, 0.0, 20.0, 20.0)])
    }

    #[test]
    fn counts_presented_and_full_frames() {
        let mut s = FrameStats::<4>::new();
        s.observe(&full(), SCREEN);
        s.observe(&Damage::None, SCREEN);
        let r = s.observe(&patch(), SCREEN);
        assert_eq!(r.total_frames, 3);
        assert_eq!(r.presented_frames, 2);
        assert_eq!(r.full_redraws, 1);
        assert!((r.fraction - 0.04).abs() < 1e-9);
    }

    #[test]
    fn grades_follow_the_window() {
        let mut s = FrameStats::<4>::new();
        assert_eq!(s.grade(), RedrawGrade::Idle);
        for _ in 0..4 {
            s.observe(&full(), SCREEN);
        }
        assert_eq!(s.grade(), RedrawGrade::Heavy);
        for _ in 0..4 {
            s.observe(&patch(), SCREEN);
        }
        assert_eq!(s.grade(), RedrawGrade::Idle);
        s.observe(&full(), SCREEN);
        assert_eq!(s.grade(), RedrawGrade::Partial);
    }

    #[test]
    fn fractions_are_oldest_first() {
        let mut s = FrameStats::<3>::new();
        s.observe(&full(), SCREEN);
        s.observe(&Damage::None, SCREEN);
        assert_eq!(s.fractions(), [0.0, 1.0, 0.0]);
    }

    #[test]
    fn sparkline_has_one_column_per_frame() {
        let mut s = FrameStats::<5>::new();
        s.observe(&full(), SCREEN);
        assert_eq!(s.sparkline_ascii(), "    @");
    }

    #[test]
    fn empty_screen_counts_as_idle() {
        let mut s = FrameStats::<2>::new();
        assert_eq!(s.observe(&full(), 0.0).fraction, 0.0);
    }
}
