//! Core functionalities.
mod env;
mod policy;
mod step;
pub use env::Env;
pub use policy::Policy;
use std::fmt::Debug;
pub use step::{Info, Step};

/// An observation of an environment.
///
/// Vectorized environments are not supported, so [`Obs::len`] is expected
/// to return 1 for a single observation.
pub trait Obs: Clone + Debug {
    /// Returns the number of observations in the object.
    fn len(&self) -> usize;

    /// Returns `true` if the object has no observation.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An action of an environment.
pub trait Act: Clone + Debug {
    /// Returns the number of actions in the object.
    fn len(&self) -> usize;

    /// Returns `true` if the object has no action.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
