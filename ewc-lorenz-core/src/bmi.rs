//! Handle to the model process running inside the container.
//!
//! The numerical model is only reachable through this BMI-style control surface.
//! Implementations are provided by whatever starts the container (see
//! [`crate::container::ContainerRuntime`]); this crate never implements the transport.

use std::path::Path;
use thiserror::Error;

/// Failure reported by the model process or the channel to it
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Model process error: {0}")]
pub struct BmiError(pub String);

impl BmiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Convenience type for `Result<T, BmiError>`.
pub type BmiResult<T> = Result<T, BmiError>;

/// The subset of the Basic Model Interface used to drive a Lorenz run
pub trait Bmi {
    /// Read the configuration file and prepare the model for the first time step
    fn initialize(&mut self, config_file: &Path) -> BmiResult<()>;

    /// Advance the model by a single time step
    fn update(&mut self) -> BmiResult<()>;

    /// Tear down the model process
    ///
    /// The handle must not be used after this call.
    fn finalize(&mut self) -> BmiResult<()>;

    fn get_component_name(&self) -> BmiResult<String>;

    fn get_current_time(&self) -> BmiResult<f64>;
    fn get_start_time(&self) -> BmiResult<f64>;
    fn get_end_time(&self) -> BmiResult<f64>;
    fn get_time_step(&self) -> BmiResult<f64>;
    fn get_time_units(&self) -> BmiResult<String>;

    fn get_output_var_names(&self) -> BmiResult<Vec<String>>;

    /// Copy of the current values of a variable, flattened
    fn get_value(&self, name: &str) -> BmiResult<Vec<f64>>;
    fn set_value(&mut self, name: &str, values: &[f64]) -> BmiResult<()>;
}

impl<B: Bmi + ?Sized> Bmi for Box<B> {
    fn initialize(&mut self, config_file: &Path) -> BmiResult<()> {
        (**self).initialize(config_file)
    }

    fn update(&mut self) -> BmiResult<()> {
        (**self).update()
    }

    fn finalize(&mut self) -> BmiResult<()> {
        (**self).finalize()
    }

    fn get_component_name(&self) -> BmiResult<String> {
        (**self).get_component_name()
    }

    fn get_current_time(&self) -> BmiResult<f64> {
        (**self).get_current_time()
    }

    fn get_start_time(&self) -> BmiResult<f64> {
        (**self).get_start_time()
    }

    fn get_end_time(&self) -> BmiResult<f64> {
        (**self).get_end_time()
    }

    fn get_time_step(&self) -> BmiResult<f64> {
        (**self).get_time_step()
    }

    fn get_time_units(&self) -> BmiResult<String> {
        (**self).get_time_units()
    }

    fn get_output_var_names(&self) -> BmiResult<Vec<String>> {
        (**self).get_output_var_names()
    }

    fn get_value(&self, name: &str) -> BmiResult<Vec<f64>> {
        (**self).get_value(name)
    }

    fn set_value(&mut self, name: &str, values: &[f64]) -> BmiResult<()> {
        (**self).set_value(name, values)
    }
}
