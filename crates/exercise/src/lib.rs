//! Exercise catalog and the UP/DOWN rep counting state machine.

mod color;
pub use color::*;

mod counter;
pub use counter::*;

mod error;
pub use error::*;

mod exercise;
pub use exercise::*;

mod registry;
pub use registry::*;
