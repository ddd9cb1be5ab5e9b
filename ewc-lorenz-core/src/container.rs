//! Running the model inside a container.
//!
//! [`ContainerizedModel`] is the container-execution half of a model. It knows which image
//! to start and owns the handle to the running process, but nothing about the model's
//! configuration. The configuration half lives in [`crate::model::LorenzMethods`].

use crate::bmi::Bmi;
use crate::errors::{LorenzError, LorenzResult};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Image with the grpc4bmi server wrapping the Lorenz-96 model
pub const LORENZ_IMAGE: &str = "ghcr.io/daafip/lorenz-grpc4bmi:v.0.0.5";

/// Reference to a container image, e.g. `ghcr.io/org/image:tag`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContainerImage(String);

impl ContainerImage {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn reference(&self) -> &str {
        &self.0
    }
}

impl Default for ContainerImage {
    fn default() -> Self {
        Self::new(LORENZ_IMAGE)
    }
}

impl fmt::Display for ContainerImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reference())
    }
}

/// Starts model processes from container images
///
/// Implemented by the host, which owns the container engine and the RPC bridge.
pub trait ContainerRuntime {
    type Handle: Bmi;

    /// Start `image` with `work_dir` mounted so the model can read its configuration
    fn start(&self, image: &ContainerImage, work_dir: &Path) -> LorenzResult<Self::Handle>;
}

/// Container-execution capability: one image and at most one live model process
pub struct ContainerizedModel<R: ContainerRuntime> {
    image: ContainerImage,
    runtime: R,
    handle: Option<R::Handle>,
    released: bool,
}

impl<R: ContainerRuntime> ContainerizedModel<R> {
    pub fn new(runtime: R, image: ContainerImage) -> Self {
        Self {
            image,
            runtime,
            handle: None,
            released: false,
        }
    }

    pub fn image(&self) -> &ContainerImage {
        &self.image
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Start the model process
    pub fn start(&mut self, work_dir: &Path) -> LorenzResult<()> {
        if self.released {
            return Err(LorenzError::HandleReleased);
        }
        if self.is_running() {
            return Err(LorenzError::Error(format!(
                "A model process for {} is already running",
                self.image
            )));
        }

        let handle = self.runtime.start(&self.image, work_dir)?;
        debug!("Started {} with work dir {}", self.image, work_dir.display());
        self.handle = Some(handle);
        Ok(())
    }

    pub fn bmi(&self) -> LorenzResult<&R::Handle> {
        self.handle
            .as_ref()
            .ok_or_else(|| missing_handle(self.released))
    }

    pub fn bmi_mut(&mut self) -> LorenzResult<&mut R::Handle> {
        let released = self.released;
        self.handle
            .as_mut()
            .ok_or_else(|| missing_handle(released))
    }

    /// Finalize the model process and drop the handle
    ///
    /// If the process fails to finalize the handle is kept and the error is returned.
    pub fn release(&mut self) -> LorenzResult<()> {
        self.bmi_mut()?.finalize()?;
        self.handle = None;
        self.released = true;
        debug!("Released model process for {}", self.image);
        Ok(())
    }
}

fn missing_handle(released: bool) -> LorenzError {
    if released {
        LorenzError::HandleReleased
    } else {
        LorenzError::NotSetUp
    }
}
