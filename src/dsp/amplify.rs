//! Static per-voice gain stage.

/*
Gain
====

  gain          output = input × g

                  g = 1.0  →  unchanged (unity)
                  g < 1.0  →  quieter
                  g = 0.0  →  silence

                Every halving of g is about -6 dB.

Voices apply it per sample before the envelope, then add into the shared
mix buffer. It is stateless and allocation-free.
*/

/// Linear gain stage. The value is the control surface's volume, clamped to
/// [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gain {
    linear: f32,
}

impl Default for Gain {
    fn default() -> Self {
        Self { linear: 1.0 }
    }
}

impl Gain {
    pub fn new(linear: f32) -> Self {
        Self {
            linear: linear.clamp(0.0, 1.0),
        }
    }

    pub fn set_linear(&mut self, linear: f32) {
        self.linear = linear.clamp(0.0, 1.0);
    }

    pub fn linear(&self) -> f32 {
        self.linear
    }

    #[inline]
    pub fn process(&self, sample: f32) -> f32 {
        sample * self.linear
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gain_clamps_to_unit_range() {
        assert_eq!(Gain::new(3.0).linear(), 1.0);
        assert_eq!(Gain::new(-1.0).linear(), 0.0);

        let mut gain = Gain::default();
        gain.set_linear(0.25);
        assert_eq!(gain.process(0.8), 0.2);
    }
}
