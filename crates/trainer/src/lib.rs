//! The rep-coach pipeline: frames in, pose + rep count + feedback out.
//!
//! [`Pipeline`] is the synchronous core. [`Trainer`] runs it on a dedicated
//! worker fed by a [`FrameSource`], and [`TrainerHandle`] marshals user
//! actions onto that worker as [`Command`]s.

mod command;
pub use command::*;

mod config;
pub use config::*;

mod error;
pub use error::*;

mod pipeline;
pub use pipeline::*;

mod snapshot;
pub use snapshot::*;

mod source;
pub use source::*;

mod trainer;
pub use trainer::*;
