//! eWaterCycle adapter for the containerised Lorenz-96 model.
//!
//! This crate re-exports [`ewc_lorenz_core`] and, with the `python` feature,
//! builds the `ewc_lorenz._lib` extension module.

pub use ewc_lorenz_core::{bmi, config, container, errors, forcing, model};

pub use ewc_lorenz_core::config::{ConfigOverrides, LorenzConfig};
pub use ewc_lorenz_core::errors::{LorenzError, LorenzResult};
pub use ewc_lorenz_core::forcing::LorenzForcing;
pub use ewc_lorenz_core::model::{EwcModel, Lorenz, LorenzBuilder};

#[cfg(feature = "python")]
mod python;
