//! A Lorenz model as seen by the eWaterCycle host.
//!
//! The host drives every model through the same lifecycle:
//! set up a working directory and configuration file, start the model process,
//! initialize it, step it with `update` and finally tear it down with `finalize`.
//!
//! [`Lorenz`] joins two independent capabilities to provide this:
//! [`ContainerizedModel`](crate::container::ContainerizedModel) owns the running model process,
//! while [`LorenzMethods`] owns the configuration record and the files written for it.

mod builder;
mod lorenz;
mod methods;
mod status;

// Public re-exports
pub use builder::LorenzBuilder;
pub use lorenz::{EwcModel, Lorenz};
pub use methods::{CleanupWarning, LorenzMethods};
pub use status::ModelStatus;
