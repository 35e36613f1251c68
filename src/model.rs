//! The branch train data model.
//!
//! - [`branch`]: a single branch and its monotonic [`Status`]
//! - [`train`]: the ordered chain of branches rebased together in one run

pub mod branch;
pub mod train;

pub use branch::Branch;
pub use branch::Status;
pub use train::Train;
pub use train::TrainStatus;
