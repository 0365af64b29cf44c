pub mod backend;
pub mod config;
pub mod fetch;
pub mod labels;
pub mod logging;
pub mod processing;
pub mod request;
pub mod scorer;
pub mod serialization;

// Re-export commonly used types for convenience
pub use config::ScoringConfig;
pub use processing::post::Detection;
pub use scorer::{Scorer, init, run};
