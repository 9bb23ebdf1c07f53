//! Observation of the scenario environment.
use tarmac_core::Obs;

/// A flat observation vector.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScenarioObs(pub Vec<f32>);

impl ScenarioObs {
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }
}

impl Obs for ScenarioObs {
    fn len(&self) -> usize {
        1
    }
}

impl From<Vec<f32>> for ScenarioObs {
    fn from(v: Vec<f32>) -> Self {
        Self(v)
    }
}
