//! Python bindings for the configuration adapter.
//!
//! The eWaterCycle host is written in Python and owns the container and its BMI client.
//! It can reuse the configuration half of the model from here:
//!
//! ```python
//! forcing = LorenzForcing(F=8.0, dt=0.01, start_time="2000-01-01T00:00:00Z",
//!                         end_time="2000-01-11T00:00:00Z")
//! adapter = LorenzConfigAdapter(forcing)
//! cfg_file = adapter.make_cfg_file("/tmp/lorenz", J=40)
//! ```

use crate::config::{ConfigOverrides, ConfigValue, CLEANUP_FILE_NAME, CONFIG_FILE_NAME};
use crate::container::LORENZ_IMAGE;
use crate::errors::LorenzError;
use crate::forcing::LorenzForcing;
use crate::model::LorenzMethods;
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyDict;
use serde_json::Map;
use std::path::PathBuf;

impl From<LorenzError> for PyErr {
    fn from(err: LorenzError) -> PyErr {
        match err {
            LorenzError::Io(e) => e.into(),
            LorenzError::InvalidTime { .. }
            | LorenzError::NonFiniteForcing { .. }
            | LorenzError::Json(_) => {
                PyValueError::new_err(err.to_string())
            }
            _ => PyRuntimeError::new_err(err.to_string()),
        }
    }
}

/// Python wrapper for LorenzForcing
#[pyclass(name = "LorenzForcing", module = "ewc_lorenz.core")]
#[derive(Debug, Clone)]
pub struct PyLorenzForcing(pub LorenzForcing);

#[pymethods]
impl PyLorenzForcing {
    #[new]
    #[pyo3(signature = (F, dt, start_time, end_time, directory=None))]
    #[allow(non_snake_case)]
    fn new(
        F: f64,
        dt: f64,
        start_time: String,
        end_time: String,
        directory: Option<PathBuf>,
    ) -> Self {
        let mut forcing = LorenzForcing::new(F, dt, start_time, end_time);
        forcing.directory = directory;
        Self(forcing)
    }

    #[getter(F)]
    fn f(&self) -> f64 {
        self.0.f
    }

    #[getter]
    fn dt(&self) -> f64 {
        self.0.dt
    }

    #[getter]
    fn start_time(&self) -> String {
        self.0.start_time.clone()
    }

    #[getter]
    fn end_time(&self) -> String {
        self.0.end_time.clone()
    }

    #[getter]
    fn directory(&self) -> Option<PathBuf> {
        self.0.directory.clone()
    }

    /// Length of the forcing period in fractional days
    fn span_in_days(&self) -> PyResult<f64> {
        Ok(self.0.span_in_days()?)
    }

    fn __repr__(&self) -> String {
        format!(
            "LorenzForcing(F={}, dt={}, start_time='{}', end_time='{}')",
            self.0.f, self.0.dt, self.0.start_time, self.0.end_time
        )
    }
}

/// Configuration half of the Lorenz model
///
/// Writes `lorenz_config.json`, exposes the initial parameters and states,
/// and removes the configuration again at the end of a run.
#[pyclass(name = "LorenzConfigAdapter", module = "ewc_lorenz.core")]
pub struct PyLorenzConfigAdapter(LorenzMethods);

#[pymethods]
impl PyLorenzConfigAdapter {
    #[new]
    fn new(forcing: PyLorenzForcing) -> Self {
        Self(LorenzMethods::new(forcing.0))
    }

    /// Write the configuration file into `cfg_dir`, which must already exist
    ///
    /// Keyword arguments are written to the configuration as-is.
    #[pyo3(signature = (cfg_dir, **overrides))]
    fn make_cfg_file(
        &mut self,
        cfg_dir: PathBuf,
        overrides: Option<&Bound<'_, PyDict>>,
    ) -> PyResult<PathBuf> {
        let mut config_overrides = ConfigOverrides::new();
        if let Some(overrides) = overrides {
            for (key, value) in overrides.iter() {
                let key: String = key.extract()?;
                let value: ConfigValue = pythonize::depythonize(&value)?;
                config_overrides.insert(key, value);
            }
        }

        self.0.set_cfg_dir(cfg_dir);
        Ok(self.0.make_cfg_file(&config_overrides)?)
    }

    /// The initial parameters (`J`)
    #[getter]
    fn parameters<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyAny>> {
        let view: Map<String, ConfigValue> = self.0.parameters().into_iter().collect();
        Ok(pythonize::pythonize(py, &view)?)
    }

    /// The initial states (`start_state`)
    #[getter]
    fn states<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyAny>> {
        let view: Map<String, ConfigValue> = self.0.states().into_iter().collect();
        Ok(pythonize::pythonize(py, &view)?)
    }

    /// The full configuration record
    #[getter]
    fn config<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyAny>> {
        Ok(pythonize::pythonize(py, self.0.config())?)
    }

    #[getter]
    fn cfg_dir(&self) -> Option<PathBuf> {
        self.0.cfg_dir().map(|path| path.to_path_buf())
    }

    /// Remove `Lorenz_config.json` and the working directory
    ///
    /// Returns a message for every artifact that was already gone.
    fn remove_config_artifacts(&self) -> PyResult<Vec<String>> {
        let warnings = self.0.remove_config_artifacts()?;
        Ok(warnings.iter().map(|w| w.to_string()).collect())
    }
}

#[pymodule]
pub fn core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyLorenzForcing>()?;
    m.add_class::<PyLorenzConfigAdapter>()?;
    m.add("CONFIG_FILE_NAME", CONFIG_FILE_NAME)?;
    m.add("CLEANUP_FILE_NAME", CLEANUP_FILE_NAME)?;
    m.add("LORENZ_IMAGE", LORENZ_IMAGE)?;
    Ok(())
}
