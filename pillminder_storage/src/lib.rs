mod memory;
mod reminder;
pub mod sqlite;


pub use memory::InMemoryReminderStorage;
pub use reminder::{ReminderStorage, StorageError};
