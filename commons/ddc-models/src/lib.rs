pub mod constants;
pub mod dataset;
pub mod runtime;

pub use constants::*;
pub use dataset::*;
pub use runtime::*;
