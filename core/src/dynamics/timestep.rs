/// Current and previous step durations. The ratio scales warm-started
/// impulses when the step size changes between frames.
#[derive(Debug, Clone, Copy)]
pub struct TimeStep {
    pub dt: f64,
    pub inv_dt: f64,
    pub prev_dt: f64,
    pub dt_ratio: f64,
}

impl TimeStep {
    pub fn new(dt: f64) -> Self {
        Self {
            dt,
            inv_dt: 1.0 / dt,
            prev_dt: dt,
            dt_ratio: 1.0,
        }
    }

    pub fn update(&mut self, dt: f64) {
        self.prev_dt = self.dt;
        self.dt = dt;
        self.inv_dt = 1.0 / dt;
        self.dt_ratio = dt / self.prev_dt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_tracks_dt_change() {
        let mut step = TimeStep::new(1.0 / 60.0);
        assert!((step.dt_ratio - 1.0).abs() < 1e-12);
        step.update(1.0 / 30.0);
        assert!((step.dt_ratio - 2.0).abs() < 1e-12);
        assert!((step.prev_dt - 1.0 / 60.0).abs() < 1e-12);
    }
}
