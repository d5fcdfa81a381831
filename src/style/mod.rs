//! Caption style data model and the built-in catalog.

pub mod builtin;
pub mod model;
pub mod registry;
