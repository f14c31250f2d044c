//! Eased smooth scrolling toward a wheel-driven target

use super::Ease;

/// Seconds to reach a new target
pub const SCROLL_DURATION: f32 = 1.2;

/// Scroll position animator. Each new target restarts the curve from the
/// current position; the target is always clamped to `[0, limit]`.
#[derive(Debug, Clone)]
pub struct SmoothScroll {
    pub duration: f32,
    pub ease: Ease,
    current: f32,
    from: f32,
    target: f32,
    elapsed: f32,
    limit: f32,
    animating: bool,
}

impl SmoothScroll {
    pub fn new(limit: f32) -> Self {
        Self {
            duration: SCROLL_DURATION,
            ease: Ease::SCROLL,
            current: 0.0,
            from: 0.0,
            target: 0.0,
            elapsed: 0.0,
            limit: limit.max(0.0),
            animating: false,
        }
    }

    pub fn position(&self) -> f32 {
        self.current
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn limit(&self) -> f32 {
        self.limit
    }

    pub fn is_animating(&self) -> bool {
        self.animating
    }

    /// Page content changed height
    pub fn set_limit(&mut self, limit: f32) {
        self.limit = limit.max(0.0);
        if self.target > self.limit {
            self.scroll_to(self.limit);
        }
    }

    /// Sync with a scroll that happened outside the animator (keyboard, scrollbar)
    pub fn jump_to(&mut self, position: f32) {
        let position = position.clamp(0.0, self.limit);
        self.current = position;
        self.target = position;
        self.animating = false;
    }

    pub fn on_wheel(&mut self, delta_y: f32) {
        self.scroll_to(self.target + delta_y);
    }

    pub fn scroll_to(&mut self, target: f32) {
        let target = target.clamp(0.0, self.limit);
        if target == self.target && self.animating {
            return;
        }
        self.from = self.current;
        self.target = target;
        self.elapsed = 0.0;
        self.animating = self.from != target;
    }

    /// Advance by `dt` seconds. Returns the new position while moving.
    pub fn advance(&mut self, dt: f32) -> Option<f32> {
        if !self.animating {
            return None;
        }
        self.elapsed += dt.max(0.0);
        let progress = if self.duration > 0.0 {
            (self.elapsed / self.duration).min(1.0)
        } else {
            1.0
        };
        self.current = self.from + (self.target - self.from) * self.ease.apply(progress);
        if progress >= 1.0 {
            self.current = self.target;
            self.animating = false;
        }
        Some(self.current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_converges_within_duration() {
        let mut s = SmoothScroll::new(2000.0);
        s.on_wheel(500.0);
        let mut t = 0.0;
        while s.advance(1.0 / 60.0).is_some() {
            t += 1.0 / 60.0;
            assert!(t < SCROLL_DURATION + 0.1);
        }
        assert_eq!(s.position(), 500.0);
        assert!(!s.is_animating());
    }

    #[test]
    fn test_eased_not_linear() {
        let mut s = SmoothScroll::new(2000.0);
        s.scroll_to(1000.0);
        s.advance(SCROLL_DURATION / 2.0);
        // Cubic ease-out is 87.5% of the way at half time
        assert!((s.position() - 875.0).abs() < 0.5);
    }

    #[test]
    fn test_target_clamped() {
        let mut s = SmoothScroll::new(300.0);
        s.on_wheel(-100.0);
        assert_eq!(s.target(), 0.0);
        assert!(!s.is_animating());

        s.on_wheel(1000.0);
        assert_eq!(s.target(), 300.0);
        while s.advance(0.1).is_some() {}
        assert_eq!(s.position(), 300.0);
    }

    #[test]
    fn test_wheel_accumulates_onto_target() {
        let mut s = SmoothScroll::new(2000.0);
        s.on_wheel(100.0);
        s.advance(0.1);
        s.on_wheel(100.0);
        assert_eq!(s.target(), 200.0);
        while s.advance(0.1).is_some() {}
        assert_eq!(s.position(), 200.0);
    }

    #[test]
    fn test_shrinking_limit_pulls_target_in() {
        let mut s = SmoothScroll::new(1000.0);
        s.jump_to(900.0);
        s.set_limit(400.0);
        assert_eq!(s.target(), 400.0);
        while s.advance(0.1).is_some() {}
        assert_eq!(s.position(), 400.0);
    }

    #[test]
    fn test_zero_duration_snaps() {
        let mut s = SmoothScroll::new(1000.0);
        s.duration = 0.0;
        s.scroll_to(250.0);
        assert_eq!(s.advance(0.0), Some(250.0));
        assert_eq!(s.advance(0.0), None);
    }
}
