pub mod ease;
pub mod interp;
pub mod spec;
