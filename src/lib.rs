//! Flood risk classification from ultrasonic distance readings.
//!
//! Offline: `dataset` synthesizes a labeled corpus, `training` fits a
//! shallow decision tree, `artifact` saves it. Online: `artifact` loads it
//! and `stream` pushes live (MQTT) or simulated readings through
//! `inference`, one at a time.

pub mod artifact;
pub mod config;
pub mod dataset;
pub mod inference;
pub mod logging;
pub mod model;
pub mod stream;
pub mod training;
