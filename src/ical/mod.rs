// File: ./src/ical/mod.rs
pub mod builder;
pub mod text;

pub use builder::CalendarBuilder;
pub use text::{encode_uri, pretty};
