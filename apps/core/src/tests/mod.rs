//! Test Module
//!
//! Scenario test suite for the calibration core.
//!
//! ## Test Categories
//! - `pipeline_tests`: end-to-end message processing scenarios
//! - `feedback_tests`: preference learning and feedback convergence
//! - `transport_tests`: transport runner behavior with a mock transport

pub mod transport_tests;
