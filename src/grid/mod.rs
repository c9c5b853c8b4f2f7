//! Parameter grid search.
//!
//! - build the echo-time / repetition-time / concentration axes (`axis`)
//! - evaluate the dense score tensor (`tensor`)
//! - reduce it to one optimum per echo time (`optimizer`)

pub mod axis;
pub mod optimizer;
pub mod tensor;

pub use axis::*;
pub use optimizer::*;
pub use tensor::*;
