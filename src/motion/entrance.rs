//! Scroll-triggered staggered entrances
//!
//! A group of items plays forward once its trigger edge crosses a fraction of
//! the viewport height, and plays back in reverse when scrolled back above it.

use super::Ease;

/// Timing for one group of items
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Entrance {
    /// Seconds per item
    pub duration: f32,
    /// Delay between consecutive items
    pub stagger: f32,
    pub ease: Ease,
    /// Trigger once the element top is above this fraction of the viewport
    pub start_fraction: f32,
}

impl Default for Entrance {
    fn default() -> Self {
        Self {
            duration: 0.8,
            stagger: 0.05,
            ease: Ease::PowerOut(3),
            start_fraction: 0.85,
        }
    }
}

impl Entrance {
    pub fn is_triggered(&self, element_top: f32, viewport_height: f32) -> bool {
        element_top <= viewport_height * self.start_fraction
    }

    /// Length of the whole group
    pub fn total_duration(&self, count: usize) -> f32 {
        if count == 0 {
            return 0.0;
        }
        self.duration + self.stagger * (count - 1) as f32
    }

    /// Eased progress of item `index` at `time` seconds into the group
    pub fn progress(&self, index: usize, time: f32) -> f32 {
        let local = time - self.stagger * index as f32;
        if self.duration <= 0.0 {
            return if local >= 0.0 { 1.0 } else { 0.0 };
        }
        self.ease.apply(local / self.duration)
    }
}

/// Playhead for one group, following the trigger each frame
#[derive(Debug, Clone)]
pub struct EntranceTimeline {
    pub entrance: Entrance,
    count: usize,
    time: f32,
}

impl EntranceTimeline {
    pub fn new(entrance: Entrance, count: usize) -> Self {
        Self {
            entrance,
            count,
            time: 0.0,
        }
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    /// Step the playhead forward while triggered and backward otherwise
    pub fn update(&mut self, element_top: f32, viewport_height: f32, dt: f32) {
        let total = self.entrance.total_duration(self.count);
        let dt = dt.max(0.0);
        if self.entrance.is_triggered(element_top, viewport_height) {
            self.time = (self.time + dt).min(total);
        } else {
            self.time = (self.time - dt).max(0.0);
        }
    }

    pub fn progress(&self, index: usize) -> f32 {
        self.entrance.progress(index, self.time)
    }

    pub fn is_complete(&self) -> bool {
        self.time >= self.entrance.total_duration(self.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_threshold() {
        let e = Entrance::default();
        assert!(!e.is_triggered(900.0, 1000.0));
        assert!(e.is_triggered(850.0, 1000.0));
        assert!(e.is_triggered(-20.0, 1000.0));
    }

    #[test]
    fn test_stagger_delays_items() {
        let e = Entrance {
            duration: 1.0,
            stagger: 0.2,
            ease: Ease::Linear,
            start_fraction: 0.8,
        };
        assert_eq!(e.progress(0, 0.5), 0.5);
        assert!((e.progress(1, 0.5) - 0.3).abs() < 1e-6);
        assert_eq!(e.progress(3, 0.5), 0.0);
        assert!((e.total_duration(4) - 1.6).abs() < 1e-6);
        assert_eq!(e.total_duration(0), 0.0);
    }

    #[test]
    fn test_timeline_plays_then_reverses() {
        let mut tl = EntranceTimeline::new(Entrance::default(), 5);
        tl.update(950.0, 1000.0, 0.5);
        assert_eq!(tl.time(), 0.0);

        for _ in 0..120 {
            tl.update(400.0, 1000.0, 1.0 / 60.0);
        }
        assert!(tl.is_complete());
        assert!((tl.progress(4) - 1.0).abs() < 1e-6);

        for _ in 0..120 {
            tl.update(990.0, 1000.0, 1.0 / 60.0);
        }
        assert_eq!(tl.time(), 0.0);
        assert_eq!(tl.progress(0), 0.0);
    }

    #[test]
    fn test_zero_duration_is_step() {
        let e = Entrance {
            duration: 0.0,
            ..Entrance::default()
        };
        assert_eq!(e.progress(2, 0.05), 0.0);
        assert_eq!(e.progress(2, 0.1), 1.0);
    }

    #[test]
    fn test_items_reveal_in_order_while_scrolling_in() {
        let mut tl = EntranceTimeline::new(Entrance::default(), 6);
        let mut top = 1000.0;
        for _ in 0..90 {
            top = f32::max(top - 10.0, 300.0);
            tl.update(top, 1000.0, 1.0 / 60.0);
            for i in 0..5 {
                assert!(tl.progress(i) >= tl.progress(i + 1));
            }
            assert!((0.0..=1.0).contains(&tl.progress(0)));
        }
        assert!(tl.is_complete());
    }
}
