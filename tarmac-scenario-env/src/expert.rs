//! Expert action heuristic.
//!
//! The expert steers towards a target point in proportion to the heading
//! error and slows down while turning.
use crate::DriveAction;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Position and heading of a vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    pub x: f32,
    pub y: f32,

    /// Heading in radians.
    pub heading: f32,
}

/// Wraps an angle into `(-pi, pi]`.
pub fn normalize_angle(angle: f32) -> f32 {
    let a = (angle + PI).rem_euclid(2.0 * PI) - PI;
    if a <= -PI {
        a + 2.0 * PI
    } else {
        a
    }
}

/// Proportional heading controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpertController {
    /// Steering per radian of heading error.
    pub steering_gain: f32,

    /// Throttle while driving straight.
    pub throttle_straight: f32,

    /// Throttle while turning.
    pub throttle_turn: f32,

    /// Steering magnitude from which the vehicle is considered turning.
    pub turn_threshold: f32,
}

impl Default for ExpertController {
    fn default() -> Self {
        Self {
            steering_gain: 1.5,
            throttle_straight: 0.6,
            throttle_turn: 0.3,
            turn_threshold: 0.3,
        }
    }
}

impl ExpertController {
    /// Sets the steering gain.
    pub fn steering_gain(mut self, v: f32) -> Self {
        self.steering_gain = v;
        self
    }

    /// Action that drives a vehicle at `pose` towards `target`.
    pub fn action(&self, pose: &Pose, target: [f32; 2]) -> DriveAction {
        let bearing = (target[1] - pose.y).atan2(target[0] - pose.x);
        let error = normalize_angle(bearing - pose.heading);
        let steering = (self.steering_gain * error).clamp(-1.0, 1.0);
        let throttle = if steering.abs() < self.turn_threshold {
            self.throttle_straight
        } else {
            self.throttle_turn
        };
        DriveAction::new(steering, throttle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-5, "{} != {}", a, b);
    }

    #[test]
    fn test_normalize_angle() {
        assert_close(normalize_angle(0.0), 0.0);
        assert_close(normalize_angle(PI), PI);
        assert_close(normalize_angle(-PI), PI);
        assert_close(normalize_angle(1.5 * PI), -0.5 * PI);
        assert_close(normalize_angle(-2.5 * PI), -0.5 * PI);
        assert_close(normalize_angle(7.0), 7.0 - 2.0 * PI);
    }

    #[test]
    fn test_straight_ahead() {
        let expert = ExpertController::default();
        let act = expert.action(&Pose::default(), [10.0, 0.0]);
        assert_close(act.steering, 0.0);
        assert_close(act.throttle, 0.6);
    }

    #[test]
    fn test_target_on_the_left_saturates() {
        let expert = ExpertController::default();
        let act = expert.action(&Pose::default(), [0.0, 10.0]);
        assert_close(act.steering, 1.0);
        assert_close(act.throttle, 0.3);

        let act = expert.action(&Pose::default(), [0.0, -10.0]);
        assert_close(act.steering, -1.0);
    }

    #[test]
    fn test_heading_wraps_around() {
        let expert = ExpertController::default();
        // Facing almost -x, target slightly below the -x axis.
        let pose = Pose {
            x: 0.0,
            y: 0.0,
            heading: 3.1,
        };
        let act = expert.action(&pose, [-10.0, -0.5]);
        let error = normalize_angle((-0.5f32).atan2(-10.0) - 3.1);
        assert!(error.abs() < 0.2);
        assert_close(act.steering, 1.5 * error);
        assert_close(act.throttle, 0.6);
    }

    #[test]
    fn test_small_error_below_threshold() {
        let expert = ExpertController::default();
        let pose = Pose {
            x: 1.0,
            y: 1.0,
            heading: 0.0,
        };
        let act = expert.action(&pose, [11.0, 2.0]);
        assert_close(act.steering, 1.5 * 0.1f32.atan());
        assert_close(act.throttle, 0.6);
    }
}
