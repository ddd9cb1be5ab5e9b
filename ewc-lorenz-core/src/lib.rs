//! Run the Lorenz-96 model under the eWaterCycle host.
//!
//! The numerical model lives in a container image and is controlled through a BMI handle.
//! This crate writes the configuration file that model reads, exposes its initial
//! parameters and states, and manages the lifecycle of the process handle.

pub mod bmi;
pub mod config;
pub mod container;
pub mod errors;
pub mod forcing;
pub mod model;
#[cfg(feature = "python")]
pub mod python;
