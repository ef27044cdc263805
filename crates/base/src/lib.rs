//! Shared building blocks for the rep-coach workspace: logging setup,
//! 2D vectors and a minimal owned tensor.

pub mod logging;

mod tensor;
pub use tensor::*;

mod vec2;
pub use vec2::*;

pub use logging::{FileLogger, StdoutLogger, init_file_logger, init_stdout_logger};

// downstream crates log through base::log::* without a direct dependency
pub use log;
