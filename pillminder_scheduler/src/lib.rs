pub mod clock;
mod scheduler;

pub use clock::{Clock, SystemClock};
pub use scheduler::{
    DailyReminderScheduler, FireHandler, FireOutcome, JobKey, ReminderScheduler,
};

#[cfg(any(test, feature = "test-util"))]
pub use clock::MockClock;
