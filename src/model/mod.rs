// File: ./src/model/mod.rs
pub mod display;
pub mod format;
pub mod item;
pub mod parser;

pub use display::{SummaryTimes, TaskDisplay};
pub use item::{DateType, Task, TaskDate, TaskDateName, TaskStatus};
