pub mod resolve;
pub mod rollup;
pub mod stale;
