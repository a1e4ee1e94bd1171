/// Combines per-fixture material coefficients into the pair value used by a
/// contact constraint.
pub trait ValueMixer {
    fn mix_friction(&self, friction1: f64, friction2: f64) -> f64;
    fn mix_restitution(&self, restitution1: f64, restitution2: f64) -> f64;
    fn mix_restitution_velocity(&self, velocity1: f64, velocity2: f64) -> f64;
}

/// Geometric-mean friction, max restitution, max restitution velocity.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultValueMixer;

impl ValueMixer for DefaultValueMixer {
    fn mix_friction(&self, friction1: f64, friction2: f64) -> f64 {
        (friction1 * friction2).sqrt()
    }

    fn mix_restitution(&self, restitution1: f64, restitution2: f64) -> f64 {
        restitution1.max(restitution2)
    }

    fn mix_restitution_velocity(&self, velocity1: f64, velocity2: f64) -> f64 {
        velocity1.max(velocity2)
    }
}
