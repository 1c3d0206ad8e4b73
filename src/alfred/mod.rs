//! Alfred workflow plumbing
//!
//! Alfred runs the workflow binary from the workflow bundle directory and
//! reads Script Filter results as XML from standard output.

pub mod feedback;
pub mod settings;
pub mod workflow;

pub use feedback::{Feedback, Icon, Item};
pub use settings::Settings;
pub use workflow::Workflow;
