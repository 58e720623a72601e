use image::Rgb;

pub const GREEN: Rgb<u8> = Rgb([0, 255, 0]);
pub const YELLOW: Rgb<u8> = Rgb([255, 255, 0]);
pub const RED: Rgb<u8> = Rgb([255, 0, 0]);

/// Green to yellow to red scale keyed on how late an arrival is.
///
/// Early arrivals fade from yellow (on time) to green over `early_span_secs`; late arrivals fade
/// from yellow to red over `late_span_secs`. The two spans are independent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArrivalGradient {
    pub early_span_secs: f64,
    pub late_span_secs: f64,
}

impl Default for ArrivalGradient {
    fn default() -> Self {
        Self { early_span_secs: 3600.0, late_span_secs: 7200.0 }
    }
}

impl ArrivalGradient {
    /// Color for `delta_secs` = estimated minus scheduled arrival.
    pub fn color(&self, delta_secs: i64) -> Rgb<u8> {
        let delta = delta_secs as f64;

        if delta <= 0.0 {
            let t = normalized(1.0 - delta / -self.early_span_secs);
            Rgb([lerp(GREEN[0], YELLOW[0], t), 255, 0])
        } else {
            let t = normalized(delta / self.late_span_secs);
            Rgb([255, lerp(YELLOW[1], RED[1], t), 0])
        }
    }
}

/// Color for `delta_secs` on the default scale.
pub fn status_color(delta_secs: i64) -> Rgb<u8> {
    ArrivalGradient::default().color(delta_secs)
}

fn normalized(t: f64) -> f64 {
    // Degenerate spans produce NaN or infinities; treat those as the far end of the scale.
    if t.is_nan() {
        return 1.0;
    }
    t.clamp(0.0, 1.0)
}

fn lerp(from: u8, to: u8, t: f64) -> u8 {
    (from as f64 * (1.0 - t) + to as f64 * t) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchors() {
        assert_eq!(status_color(0), Rgb([255, 255, 0]));
        assert_eq!(status_color(-3600), Rgb([0, 255, 0]));
        assert_eq!(status_color(7200), Rgb([255, 0, 0]));
    }

    #[test]
    fn clamps_beyond_spans() {
        assert_eq!(status_color(-10_000), status_color(-3600));
        assert_eq!(status_color(20_000), status_color(7200));
        assert_eq!(status_color(i64::MIN), GREEN);
        assert_eq!(status_color(i64::MAX), RED);
    }

    #[test]
    fn sides_have_different_slopes() {
        // Half way along each side.
        assert_eq!(status_color(-1800), Rgb([127, 255, 0]));
        assert_eq!(status_color(3600), Rgb([255, 127, 0]));
        assert_eq!(status_color(1800), Rgb([255, 191, 0]));
    }

    #[test]
    fn monotonic_on_each_side() {
        let mut previous = status_color(-4000);
        for delta in (-3600..=0).step_by(60) {
            let color = status_color(delta);
            assert!(color[0] >= previous[0]);
            assert_eq!(color[1], 255);
            previous = color;
        }
        for delta in (0..=7200).step_by(60) {
            let color = status_color(delta);
            assert!(color[1] <= previous[1]);
            assert_eq!(color[0], 255);
            previous = color;
        }
    }

    #[test]
    fn zero_spans_degrade_gracefully() {
        let gradient = ArrivalGradient { early_span_secs: 0.0, late_span_secs: 0.0 };
        assert_eq!(gradient.color(0), YELLOW);
        assert_eq!(gradient.color(-1), GREEN);
        assert_eq!(gradient.color(1), RED);
    }
}
