//! Action of the scenario environment.
use serde::{Deserialize, Serialize};
use tarmac_core::Act;

/// Steering and throttle of the ego vehicle, both in `[-1, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DriveAction {
    pub steering: f32,
    pub throttle: f32,
}

impl DriveAction {
    pub fn new(steering: f32, throttle: f32) -> Self {
        Self { steering, throttle }
    }

    /// The action used when no expert action can be computed.
    pub fn zero() -> Self {
        Self::default()
    }

    /// `[steering, throttle]`.
    pub fn to_vec(&self) -> Vec<f32> {
        vec![self.steering, self.throttle]
    }
}

impl Act for DriveAction {
    fn len(&self) -> usize {
        1
    }
}

impl From<[f32; 2]> for DriveAction {
    fn from(v: [f32; 2]) -> Self {
        Self::new(v[0], v[1])
    }
}
