/// Easing curve applied to exit transition progress.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Ease {
    #[default]
    Linear,
    InQuad,
    OutQuad,
    InOutQuad,
    InCubic,
    OutCubic,
    InOutCubic,
}

impl Ease {
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::InQuad => t.powi(2),
            Self::OutQuad => ease_out(t, 2),
            Self::InOutQuad => ease_in_out(t, 2),
            Self::InCubic => t.powi(3),
            Self::OutCubic => ease_out(t, 3),
            Self::InOutCubic => ease_in_out(t, 3),
        }
    }

    /// Eased progress of step `step` in a transition lasting `steps` steps.
    ///
    /// The first step is 0.0 and the last is 1.0; a single-step transition jumps straight to 1.0.
    pub fn progress(self, step: u32, steps: u32) -> f64 {
        let denom = steps.saturating_sub(1);
        let t = if denom == 0 {
            1.0
        } else {
            f64::from(step.min(denom)) / f64::from(denom)
        };
        self.apply(t)
    }
}

fn ease_out(t: f64, power: i32) -> f64 {
    1.0 - (1.0 - t).powi(power)
}

// Mirrored halves of the `power` curve, meeting at (0.5, 0.5).
fn ease_in_out(t: f64, power: i32) -> f64 {
    if t < 0.5 {
        (2.0 * t).powi(power) / 2.0
    } else {
        1.0 - (2.0 - 2.0 * t).powi(power) / 2.0
    }
}
