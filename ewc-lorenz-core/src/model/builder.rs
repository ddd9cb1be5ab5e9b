//! Builder for constructing a [`Lorenz`] model.

use crate::container::{ContainerImage, ContainerRuntime, ContainerizedModel};
use crate::forcing::LorenzForcing;
use std::path::PathBuf;

use super::lorenz::Lorenz;
use super::methods::LorenzMethods;

/// Build a new Lorenz model.
///
/// The forcing and the container runtime are required.
/// By default the published Lorenz image is used and working directories are created
/// in the current directory.
pub struct LorenzBuilder<R: ContainerRuntime> {
    forcing: LorenzForcing,
    runtime: R,
    image: ContainerImage,
    /// Parent of the timestamped working directories created by `setup`
    pub output_dir: PathBuf,
}

impl<R: ContainerRuntime> LorenzBuilder<R> {
    pub fn new(forcing: LorenzForcing, runtime: R) -> Self {
        Self {
            forcing,
            runtime,
            image: ContainerImage::default(),
            output_dir: PathBuf::from("."),
        }
    }

    /// Use a different container image, e.g. a locally built one
    pub fn with_image(mut self, image: ContainerImage) -> Self {
        self.image = image;
        self
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    pub fn build(self) -> Lorenz<R> {
        Lorenz::from_parts(
            ContainerizedModel::new(self.runtime, self.image),
            LorenzMethods::new(self.forcing),
            self.output_dir,
        )
    }
}
