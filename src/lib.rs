pub mod config;
pub mod emit;
pub mod errors;
pub mod index;
pub mod normalize;
pub mod pipeline;
pub mod reader;
pub mod resolution;
pub mod types;
