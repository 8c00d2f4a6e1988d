/// An implementation of a time-decaying value
pub trait Decay {
    /// Calculate value at time `t`
    fn evaluate(&self, t: f32) -> f32;
}

/// Linear interpolation from v<sub>i</sub> to v<sub>f</sub> over `duration` steps, floored at v<sub>f</sub>
///
/// v(t) = max(v<sub>f</sub>, v<sub>i</sub> * (d - t) / d + v<sub>f</sub> * t / d)
///
/// With `duration == 0` the value is v<sub>f</sub> for every `t`.
///
/// The bounds are not validated. Only the lower side is clamped, so a schedule with
/// v<sub>i</sub> < v<sub>f</sub> is flat at v<sub>f</sub> until the interpolation passes it, and keeps
/// growing past v<sub>f</sub> once `t > duration`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Anneal {
    vi: f32,
    vf: f32,
    duration: u32,
}

impl Anneal {
    pub fn new(vi: f32, vf: f32, duration: u32) -> Self {
        Self { vi, vf, duration }
    }

    pub fn start(&self) -> f32 {
        self.vi
    }

    pub fn end(&self) -> f32 {
        self.vf
    }

    pub fn duration(&self) -> u32 {
        self.duration
    }
}

impl Decay for Anneal {
    fn evaluate(&self, t: f32) -> f32 {
        let &Self { vi, vf, duration } = self;
        if duration == 0 {
            return vf;
        }

        let d = duration as f32;
        let start_weight = (d - t) / d;
        let end_weight = t / d;
        vf.max(vi * start_weight + vf * end_weight)
    }
}
