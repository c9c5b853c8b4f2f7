//! Signal and relaxation models.
//!
//! Models are implemented as small, pure functions so that the grid search can
//! call them per grid point without any state.

pub mod relaxation;
pub mod snr;

pub use relaxation::*;
pub use snr::*;
