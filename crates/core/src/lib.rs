#![forbid(unsafe_code)]

pub mod error;
pub mod model;
pub mod navigation;
pub mod progress;
pub mod quiz;
pub mod time;

pub use error::Error;
pub use time::Clock;
