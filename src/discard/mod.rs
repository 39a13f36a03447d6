pub mod discard_model;
pub mod loader;
pub mod snapshot;
