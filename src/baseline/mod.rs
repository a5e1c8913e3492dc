//! Static baseline policies
//!
//! These policies never learn: `update` is a no-op. They give the reference
//! error rates the linear bandits are compared against.

pub mod clinical;
pub mod fixed;
pub mod random;

pub use clinical::ClinicalDosing;
pub use fixed::FixedDose;
pub use random::RandomDose;
