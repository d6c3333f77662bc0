use pillminder_models::{reminder::ReminderId, validation::ValidationError};
use pillminder_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The reminder does not exist, or belongs to another group.
    #[error("Reminder {0} does not exist")]
    NotFound(ReminderId),

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error(transparent)]
    Storage(StorageError),

    #[error("Scheduler failure: {0}")]
    Scheduler(anyhow::Error),

    #[error("Delivery failure: {0}")]
    Delivery(anyhow::Error),
}

impl From<StorageError> for CoordinatorError {
    fn from(error: StorageError) -> Self {
        match error {
            StorageError::NotFound(id) => CoordinatorError::NotFound(id),
            error => CoordinatorError::Storage(error),
        }
    }
}
