//! Glow dot orbiting a rounded rectangle

use glam::Vec2;
use std::f32::consts::{FRAC_PI_2, PI};

/// Gap between the box edge and the path
pub const ORBIT_INSET: f32 = 2.0;
/// Corner radius of the path
pub const ORBIT_CORNER_RADIUS: f32 = 10.0;
/// Seconds per lap
pub const ORBIT_PERIOD: f32 = 4.0;

/// Closed rounded-rectangle path inside a `width` x `height` box, traversed
/// clockwise on screen starting at the top-left end of the top edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitPath {
    min: Vec2,
    max: Vec2,
    radius: f32,
}

impl OrbitPath {
    /// `None` until the box is large enough to hold the corners
    pub fn new(width: f32, height: f32) -> Option<Self> {
        let span = 2.0 * (ORBIT_INSET + ORBIT_CORNER_RADIUS);
        if !(width >= span && height >= span) {
            return None;
        }
        Some(Self {
            min: Vec2::splat(ORBIT_INSET),
            max: Vec2::new(width - ORBIT_INSET, height - ORBIT_INSET),
            radius: ORBIT_CORNER_RADIUS,
        })
    }

    fn straight(&self) -> Vec2 {
        self.max - self.min - Vec2::splat(2.0 * self.radius)
    }

    pub fn perimeter(&self) -> f32 {
        let s = self.straight();
        2.0 * (s.x + s.y) + 2.0 * PI * self.radius
    }

    /// Point at fraction `t` of the lap; wraps outside [0, 1)
    pub fn point_at(&self, t: f32) -> Vec2 {
        let s = self.straight();
        let r = self.radius;
        let arc = FRAC_PI_2 * r;
        let mut d = t.rem_euclid(1.0) * self.perimeter();

        let corner = |center: Vec2, start_angle: f32, d: f32| {
            let a = start_angle + d / r;
            center + Vec2::new(a.cos(), a.sin()) * r
        };

        // Top edge, left to right
        if d < s.x {
            return Vec2::new(self.min.x + r + d, self.min.y);
        }
        d -= s.x;
        if d < arc {
            return corner(Vec2::new(self.max.x - r, self.min.y + r), -FRAC_PI_2, d);
        }
        d -= arc;
        // Right edge, downward
        if d < s.y {
            return Vec2::new(self.max.x, self.min.y + r + d);
        }
        d -= s.y;
        if d < arc {
            return corner(Vec2::new(self.max.x - r, self.max.y - r), 0.0, d);
        }
        d -= arc;
        // Bottom edge, right to left
        if d < s.x {
            return Vec2::new(self.max.x - r - d, self.max.y);
        }
        d -= s.x;
        if d < arc {
            return corner(Vec2::new(self.min.x + r, self.max.y - r), FRAC_PI_2, d);
        }
        d -= arc;
        // Left edge, upward
        if d < s.y {
            return Vec2::new(self.min.x, self.max.y - r - d);
        }
        d -= s.y;
        corner(Vec2::new(self.min.x + r, self.min.y + r), PI, d.min(arc))
    }
}

/// Dot moving around an [`OrbitPath`] at constant speed, repeating forever
#[derive(Debug, Clone)]
pub struct OrbitDot {
    path: Option<OrbitPath>,
    pub period: f32,
    elapsed: f32,
}

impl OrbitDot {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            path: OrbitPath::new(width, height),
            period: ORBIT_PERIOD,
            elapsed: 0.0,
        }
    }

    /// Follow a new box size, keeping the lap phase
    pub fn resize(&mut self, width: f32, height: f32) {
        self.path = OrbitPath::new(width, height);
    }

    /// Advance by `dt` seconds; `None` while the box is too small
    pub fn advance(&mut self, dt: f32) -> Option<Vec2> {
        let path = self.path?;
        if self.period > 0.0 {
            self.elapsed = (self.elapsed + dt.max(0.0)).rem_euclid(self.period);
        }
        let phase = if self.period > 0.0 {
            self.elapsed / self.period
        } else {
            0.0
        };
        Some(path.point_at(phase))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec2, b: Vec2) -> bool {
        a.distance(b) < 1e-3
    }

    #[test]
    fn test_rejects_tiny_boxes() {
        assert!(OrbitPath::new(0.0, 0.0).is_none());
        assert!(OrbitPath::new(200.0, 20.0).is_none());
        assert!(OrbitPath::new(200.0, 48.0).is_some());
        assert!(OrbitDot::new(0.0, 40.0).advance(0.1).is_none());
    }

    #[test]
    fn test_perimeter() {
        let p = OrbitPath::new(200.0, 50.0).unwrap();
        // Straight runs 176 and 26, plus one full circle of radius 10
        let expected = 2.0 * (176.0 + 26.0) + 2.0 * PI * 10.0;
        assert!((p.perimeter() - expected).abs() < 1e-3);
    }

    #[test]
    fn test_starts_and_wraps_at_top_left() {
        let p = OrbitPath::new(200.0, 50.0).unwrap();
        let start = Vec2::new(12.0, 2.0);
        assert!(close(p.point_at(0.0), start));
        assert!(close(p.point_at(1.0), start));
        assert!(close(p.point_at(0.999_999), start));
    }

    #[test]
    fn test_path_is_continuous_and_inside() {
        let p = OrbitPath::new(160.0, 60.0).unwrap();
        let steps = 2000;
        let max_step = p.perimeter() / steps as f32 * 1.01;
        let mut prev = p.point_at(0.0);
        for i in 1..=steps {
            let q = p.point_at(i as f32 / steps as f32);
            assert!(prev.distance(q) <= max_step + 1e-3, "jump at {}", i);
            assert!(q.x >= 2.0 - 1e-3 && q.x <= 158.0 + 1e-3);
            assert!(q.y >= 2.0 - 1e-3 && q.y <= 58.0 + 1e-3);
            prev = q;
        }
    }

    #[test]
    fn test_clockwise_on_screen() {
        let p = OrbitPath::new(200.0, 100.0).unwrap();
        let quarter = p.point_at(0.1);
        // Moving right along the top first
        assert!(quarter.x > 12.0);
        assert!((quarter.y - 2.0).abs() < 1e-3);
    }

    #[test]
    fn test_dot_laps_in_period() {
        let mut dot = OrbitDot::new(200.0, 50.0);
        let first = dot.advance(0.0).unwrap();
        let mut last = first;
        for _ in 0..240 {
            last = dot.advance(1.0 / 60.0).unwrap();
        }
        assert!(close(first, last));
    }

    #[test]
    fn test_dot_keeps_phase_across_resize() {
        // Button not laid out on the first frame
        let mut dot = OrbitDot::new(0.0, 0.0);
        assert!(dot.advance(1.0 / 60.0).is_none());

        dot.resize(200.0, 50.0);
        assert!(close(dot.advance(0.0).unwrap(), Vec2::new(12.0, 2.0)));
        dot.advance(1.0);

        dot.resize(300.0, 80.0);
        let expected = OrbitPath::new(300.0, 80.0).unwrap().point_at(0.25);
        assert!(close(dot.advance(0.0).unwrap(), expected));
    }
}
