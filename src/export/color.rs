//! Sequential red colour ramp for traffic volume.

/// Colour for `t` in `[0, 1]` on the "Reds" scheme; values outside are
/// clamped and NaN maps to the lightest shade.
pub fn reds(t: f64) -> [u8; 3] {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let c = colorous::REDS.eval_continuous(t);
    [c.r, c.g, c.b]
}

pub fn to_hex([r, g, b]: [u8; 3]) -> String {
    format!("#{:x}", colorous::Color { r, g, b })
}

/// Linear scale from `[0, max]` onto `[0, 1]`.
#[derive(Debug, Clone, Copy)]
pub struct VolumeScale {
    max: f64,
}

impl VolumeScale {
    pub fn new(volumes: impl IntoIterator<Item = f64>) -> Self {
        let max = volumes.into_iter().fold(0.0, f64::max);
        Self { max }
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn unit(&self, volume: f64) -> f64 {
        if self.max <= 0.0 {
            0.0
        } else {
            (volume / self.max).clamp(0.0, 1.0)
        }
    }
}
