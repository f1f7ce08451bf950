//! Single Flight Module
//!
//! Collapses concurrent loads of the same key into one execution.

mod flight;

pub use flight::SingleFlight;
