//! Word timings, caption line grouping and keyword detection.

pub mod keywords;
pub mod lines;
pub mod word;
