pub mod fetch;
pub mod script;
