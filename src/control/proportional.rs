//! Proportional controller with hysteresis
//!
//! Reverse-acting P controller for damper positioning: a measurement
//! above the setpoint opens the output.  Changes smaller than the
//! deadband are suppressed so the damper actuator does not chatter.

/// Proportional controller
#[derive(Debug, Clone, Copy)]
pub struct ProportionalController {
    gain: f32,
    setpoint: f32,
    deadband: f32,
    output_min: f32,
    output_max: f32,
}

impl ProportionalController {
    pub fn new(gain: f32, setpoint: f32) -> Self {
        Self {
            gain,
            setpoint,
            deadband: 0.0,
            output_min: 0.0,
            output_max: 100.0,
        }
    }

    /// Set output limits
    pub fn set_limits(&mut self, min: f32, max: f32) {
        self.output_min = min;
        self.output_max = max;
    }

    /// Minimum output change worth applying
    pub fn set_deadband(&mut self, deadband: f32) {
        self.deadband = deadband;
    }

    /// Compute the next output from the current one.
    ///
    /// Returns `None` when the clamped change is within the deadband.
    pub fn compute(&self, measurement: f32, current_output: f32) -> Option<f32> {
        let error = measurement - self.setpoint;
        let next = (current_output + error * self.gain).clamp(self.output_min, self.output_max);
        if (next - current_output).abs() > self.deadband {
            Some(next)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dcv() -> ProportionalController {
        let mut p = ProportionalController::new(0.05, 800.0);
        p.set_limits(10.0, 100.0);
        p.set_deadband(2.0);
        p
    }

    #[test]
    fn opens_above_setpoint() {
        // 1200 ppm → error 400 → +20 points
        assert_eq!(dcv().compute(1200.0, 50.0), Some(70.0));
    }

    #[test]
    fn closes_below_setpoint() {
        // 600 ppm → error −200 → −10 points
        assert_eq!(dcv().compute(600.0, 50.0), Some(40.0));
    }

    #[test]
    fn small_error_is_suppressed() {
        // 840 ppm → +2 points, not strictly greater than the deadband
        assert_eq!(dcv().compute(840.0, 50.0), None);
        assert_eq!(dcv().compute(900.0, 50.0), Some(55.0));
    }

    #[test]
    fn output_is_clamped() {
        assert_eq!(dcv().compute(3000.0, 95.0), Some(100.0));
        assert_eq!(dcv().compute(400.0, 12.0), None); // clamp to 10 is only −2
        assert_eq!(dcv().compute(400.0, 20.0), Some(10.0));
    }
}
