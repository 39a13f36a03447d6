pub mod loader;
pub mod manifest_model;
