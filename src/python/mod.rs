use ewc_lorenz_core::python::core;
use pyo3::prelude::*;
use pyo3::wrap_pymodule;

#[pymodule]
#[pyo3(name = "_lib")]
fn ewc_lorenz(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    m.add_wrapped(wrap_pymodule!(core))?;

    // Make `import ewc_lorenz._lib.core` resolve to the submodule
    let modules = PyModule::import(m.py(), "sys")?.getattr("modules")?;
    modules.set_item("ewc_lorenz._lib.core", m.getattr("core")?)?;

    Ok(())
}
