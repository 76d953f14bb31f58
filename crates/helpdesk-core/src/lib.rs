pub mod chunker;
pub mod config;
pub mod error;
pub mod loaders;
pub mod traits;
pub mod types;
