pub mod common;
pub mod extender;
pub mod stats;

pub use extender::*;
pub use stats::*;
