use crate::config::ScoringConfig;

pub fn setup_logging(config: &ScoringConfig) {
    common::setup_logging(config.environment.clone());
}
