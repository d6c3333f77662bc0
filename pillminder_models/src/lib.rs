pub mod acknowledgement;
pub mod group;
pub mod reminder;
pub mod settings;
pub mod validation;

pub use chrono;
pub use chrono_tz;
