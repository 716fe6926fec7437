pub mod config;
pub mod params;
pub mod query;
pub mod solve;
