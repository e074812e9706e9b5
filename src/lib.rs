pub mod app;
pub mod cli;
pub mod error;
pub mod gpx;
pub mod render;
pub mod store;
pub mod types;
pub mod utils;
