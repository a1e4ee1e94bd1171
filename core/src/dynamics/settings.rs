use std::f64::consts::PI;

use crate::error::Error;

/// Which bodies get a continuous-collision substep after the discrete solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContinuousDetectionMode {
    None,
    BulletsOnly,
    #[default]
    All,
}

/// Tunable solver parameters. Every setter validates its range and fails
/// with `Error::InvalidArgument` rather than accepting a value the solver
/// cannot handle.
#[derive(Debug, Clone)]
pub struct Settings {
    step_frequency: f64,
    max_translation: f64,
    max_rotation: f64,
    at_rest_detection_enabled: bool,
    at_rest_linear_velocity: f64,
    at_rest_angular_velocity: f64,
    at_rest_time: f64,
    velocity_iterations: usize,
    position_iterations: usize,
    warm_start_distance: f64,
    restitution_velocity: f64,
    linear_tolerance: f64,
    angular_tolerance: f64,
    max_linear_correction: f64,
    max_angular_correction: f64,
    baumgarte: f64,
    continuous_detection_mode: ContinuousDetectionMode,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            step_frequency: 1.0 / 60.0,
            max_translation: 2.0,
            max_rotation: 0.5 * PI,
            at_rest_detection_enabled: true,
            at_rest_linear_velocity: 0.01,
            at_rest_angular_velocity: 2.0f64.to_radians(),
            at_rest_time: 0.5,
            velocity_iterations: 10,
            position_iterations: 10,
            warm_start_distance: 0.01,
            restitution_velocity: 1.0,
            linear_tolerance: 0.005,
            angular_tolerance: 2.0f64.to_radians(),
            max_linear_correction: 0.2,
            max_angular_correction: 8.0f64.to_radians(),
            baumgarte: 0.2,
            continuous_detection_mode: ContinuousDetectionMode::All,
        }
    }
}

impl Settings {
    /// Seconds per fixed step.
    pub fn step_frequency(&self) -> f64 {
        self.step_frequency
    }

    pub fn set_step_frequency(&mut self, seconds: f64) -> Result<(), Error> {
        if seconds <= 0.0 {
            return Err(Error::InvalidArgument("step frequency must be positive"));
        }
        self.step_frequency = seconds;
        Ok(())
    }

    pub fn max_translation(&self) -> f64 {
        self.max_translation
    }

    pub fn set_max_translation(&mut self, value: f64) -> Result<(), Error> {
        if value < 0.0 {
            return Err(Error::InvalidArgument("max translation must be non-negative"));
        }
        self.max_translation = value;
        Ok(())
    }

    pub fn max_rotation(&self) -> f64 {
        self.max_rotation
    }

    pub fn set_max_rotation(&mut self, value: f64) -> Result<(), Error> {
        if value < 0.0 {
            return Err(Error::InvalidArgument("max rotation must be non-negative"));
        }
        self.max_rotation = value;
        Ok(())
    }

    pub fn is_at_rest_detection_enabled(&self) -> bool {
        self.at_rest_detection_enabled
    }

    pub fn set_at_rest_detection_enabled(&mut self, enabled: bool) {
        self.at_rest_detection_enabled = enabled;
    }

    pub fn at_rest_linear_velocity(&self) -> f64 {
        self.at_rest_linear_velocity
    }

    pub fn set_at_rest_linear_velocity(&mut self, value: f64) -> Result<(), Error> {
        if value < 0.0 {
            return Err(Error::InvalidArgument(
                "at-rest linear velocity must be non-negative",
            ));
        }
        self.at_rest_linear_velocity = value;
        Ok(())
    }

    pub fn at_rest_angular_velocity(&self) -> f64 {
        self.at_rest_angular_velocity
    }

    pub fn set_at_rest_angular_velocity(&mut self, value: f64) -> Result<(), Error> {
        if value < 0.0 {
            return Err(Error::InvalidArgument(
                "at-rest angular velocity must be non-negative",
            ));
        }
        self.at_rest_angular_velocity = value;
        Ok(())
    }

    pub fn at_rest_time(&self) -> f64 {
        self.at_rest_time
    }

    pub fn set_at_rest_time(&mut self, value: f64) -> Result<(), Error> {
        if value < 0.0 {
            return Err(Error::InvalidArgument("at-rest time must be non-negative"));
        }
        self.at_rest_time = value;
        Ok(())
    }

    pub fn velocity_iterations(&self) -> usize {
        self.velocity_iterations
    }

    pub fn set_velocity_iterations(&mut self, value: usize) -> Result<(), Error> {
        if value < 1 {
            return Err(Error::InvalidArgument("velocity iterations must be at least 1"));
        }
        self.velocity_iterations = value;
        Ok(())
    }

    pub fn position_iterations(&self) -> usize {
        self.position_iterations
    }

    pub fn set_position_iterations(&mut self, value: usize) -> Result<(), Error> {
        if value < 1 {
            return Err(Error::InvalidArgument("position iterations must be at least 1"));
        }
        self.position_iterations = value;
        Ok(())
    }

    pub fn warm_start_distance(&self) -> f64 {
        self.warm_start_distance
    }

    /// Matching radius squared, the form the contact manager compares with.
    pub fn warm_start_distance_squared(&self) -> f64 {
        self.warm_start_distance * self.warm_start_distance
    }

    pub fn set_warm_start_distance(&mut self, value: f64) -> Result<(), Error> {
        if value < 0.0 {
            return Err(Error::InvalidArgument(
                "warm start distance must be non-negative",
            ));
        }
        self.warm_start_distance = value;
        Ok(())
    }

    pub fn restitution_velocity(&self) -> f64 {
        self.restitution_velocity
    }

    pub fn set_restitution_velocity(&mut self, value: f64) -> Result<(), Error> {
        if value < 0.0 {
            return Err(Error::InvalidArgument(
                "restitution velocity must be non-negative",
            ));
        }
        self.restitution_velocity = value;
        Ok(())
    }

    pub fn linear_tolerance(&self) -> f64 {
        self.linear_tolerance
    }

    pub fn set_linear_tolerance(&mut self, value: f64) -> Result<(), Error> {
        if value < 0.0 {
            return Err(Error::InvalidArgument("linear tolerance must be non-negative"));
        }
        self.linear_tolerance = value;
        Ok(())
    }

    pub fn angular_tolerance(&self) -> f64 {
        self.angular_tolerance
    }

    pub fn set_angular_tolerance(&mut self, value: f64) -> Result<(), Error> {
        if value < 0.0 {
            return Err(Error::InvalidArgument("angular tolerance must be non-negative"));
        }
        self.angular_tolerance = value;
        Ok(())
    }

    pub fn max_linear_correction(&self) -> f64 {
        self.max_linear_correction
    }

    pub fn set_max_linear_correction(&mut self, value: f64) -> Result<(), Error> {
        if value < 0.0 {
            return Err(Error::InvalidArgument(
                "max linear correction must be non-negative",
            ));
        }
        self.max_linear_correction = value;
        Ok(())
    }

    pub fn max_angular_correction(&self) -> f64 {
        self.max_angular_correction
    }

    pub fn set_max_angular_correction(&mut self, value: f64) -> Result<(), Error> {
        if value < 0.0 {
            return Err(Error::InvalidArgument(
                "max angular correction must be non-negative",
            ));
        }
        self.max_angular_correction = value;
        Ok(())
    }

    pub fn baumgarte(&self) -> f64 {
        self.baumgarte
    }

    pub fn set_baumgarte(&mut self, value: f64) -> Result<(), Error> {
        if value < 0.0 {
            return Err(Error::InvalidArgument("baumgarte must be non-negative"));
        }
        self.baumgarte = value;
        Ok(())
    }

    pub fn continuous_detection_mode(&self) -> ContinuousDetectionMode {
        self.continuous_detection_mode
    }

    pub fn set_continuous_detection_mode(&mut self, mode: ContinuousDetectionMode) {
        self.continuous_detection_mode = mode;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let s = Settings::default();
        assert!((s.step_frequency() - 1.0 / 60.0).abs() < 1e-12);
        assert_eq!(s.velocity_iterations(), 10);
        assert_eq!(s.position_iterations(), 10);
        assert!((s.baumgarte() - 0.2).abs() < 1e-12);
        assert_eq!(s.continuous_detection_mode(), ContinuousDetectionMode::All);
    }

    #[test]
    fn setters_reject_out_of_range() {
        let mut s = Settings::default();
        assert!(s.set_step_frequency(0.0).is_err());
        assert!(s.set_velocity_iterations(0).is_err());
        assert!(s.set_linear_tolerance(-1.0).is_err());
        assert!(s.set_max_translation(-0.1).is_err());
        // Failed setters leave the previous value in place.
        assert_eq!(s.velocity_iterations(), 10);
    }
}
