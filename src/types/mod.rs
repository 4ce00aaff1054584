//! Type definitions for nippo

mod aggregate;
mod clock;
mod error;
mod report;

pub use aggregate::*;
pub use clock::{ClockTime, MINUTES_PER_DAY};
pub use error::*;
pub use report::*;
