//! Easing curves over normalized time

/// Easing curve. Input is clamped to [0, 1]; every curve maps 0 → 0 and 1 → 1.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Ease {
    #[default]
    Linear,
    /// `1 - (1 - t)^(n + 1)`, so `PowerOut(2)` is the cubic ease-out
    PowerOut(u8),
    /// Overshoots past 1 before settling; the argument sets the overshoot
    BackOut(f32),
    SineInOut,
}

impl Ease {
    /// Cubic ease-out used by the smooth scroller
    pub const SCROLL: Ease = Ease::PowerOut(2);

    pub fn apply(self, t: f32) -> f32 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            Ease::Linear => t,
            Ease::PowerOut(n) => 1.0 - (1.0 - t).powi(n as i32 + 1),
            Ease::BackOut(s) => {
                let u = t - 1.0;
                u * u * ((s + 1.0) * u + s) + 1.0
            }
            Ease::SineInOut => -((std::f32::consts::PI * t).cos() - 1.0) / 2.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Ease; 6] = [
        Ease::Linear,
        Ease::PowerOut(1),
        Ease::PowerOut(2),
        Ease::PowerOut(3),
        Ease::BackOut(1.7),
        Ease::SineInOut,
    ];

    #[test]
    fn test_endpoints() {
        for ease in ALL {
            assert!(ease.apply(0.0).abs() < 1e-6, "{:?}", ease);
            assert!((ease.apply(1.0) - 1.0).abs() < 1e-6, "{:?}", ease);
        }
    }

    #[test]
    fn test_clamps_input() {
        for ease in ALL {
            assert_eq!(ease.apply(-3.0), ease.apply(0.0));
            assert_eq!(ease.apply(7.0), ease.apply(1.0));
            assert_eq!(ease.apply(f32::NAN), ease.apply(0.0));
        }
    }

    #[test]
    fn test_scroll_curve_is_cubic_out() {
        assert!((Ease::SCROLL.apply(0.5) - 0.875).abs() < 1e-6);
    }

    #[test]
    fn test_back_out_overshoots() {
        let peak = (1..100)
            .map(|i| Ease::BackOut(2.0).apply(i as f32 / 100.0))
            .fold(0.0f32, f32::max);
        assert!(peak > 1.0);
    }

    #[test]
    fn test_power_out_is_monotonic() {
        let mut last = 0.0;
        for i in 1..=50 {
            let v = Ease::PowerOut(3).apply(i as f32 / 50.0);
            assert!(v >= last);
            last = v;
        }
    }
}
