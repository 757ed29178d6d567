pub mod config;
pub mod http_client;
pub mod match_scores;
pub mod pipeline;
pub mod prob_model;
pub mod rating;
pub mod variance;

pub use config::ApiConfig;
pub use pipeline::{compute_win_probability, Alliance, AllianceColor};
pub use prob_model::{ModelConfig, WinProbability};
