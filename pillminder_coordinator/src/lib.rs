mod coordinator;
pub mod delivery;
mod error;
pub mod messages;

pub use coordinator::{FireDispatcher, ReminderCoordinator};
pub use error::CoordinatorError;
