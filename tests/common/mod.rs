//! Common utilities for integration tests

#![allow(dead_code)]

pub mod fixtures;

pub use fixtures::{
    contaminated_system, low_level_system, pfas_free_system, sample_system, system_with,
};

use pfas_rs::engines::{BreakthroughResult, MonteCarloResult};

/// Assert `breakthrough < fifty percent < exhaustion`
pub fn assert_milestones_ordered(result: &BreakthroughResult, message: &str) {
    assert!(
        result.breakthrough_time_days > 0.0,
        "{}: breakthrough at {} days",
        message,
        result.breakthrough_time_days
    );
    assert!(
        result.breakthrough_time_days < result.fifty_percent_time_days
            && result.fifty_percent_time_days < result.exhaustion_time_days,
        "{}: milestones out of order ({}, {}, {})",
        message,
        result.breakthrough_time_days,
        result.fifty_percent_time_days,
        result.exhaustion_time_days
    );
}

/// Assert `p5 <= p10 <= mean <= p90 <= p95`
pub fn assert_percentiles_ordered(mc: &MonteCarloResult, message: &str) {
    assert!(
        mc.p5 <= mc.p10 && mc.p10 <= mc.mean && mc.mean <= mc.p90 && mc.p90 <= mc.p95,
        "{}: percentiles out of order {:?}",
        message,
        mc
    );
}

/// Assert `0 < confidence <= 1`
pub fn assert_confidence(value: f64, message: &str) {
    assert!(
        value > 0.0 && value <= 1.0,
        "{}: confidence {} outside ]0, 1]",
        message,
        value
    );
}
