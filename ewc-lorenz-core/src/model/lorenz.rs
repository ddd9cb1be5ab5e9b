use crate::bmi::Bmi;
use crate::config::{ConfigOverrides, ConfigValue};
use crate::container::{ContainerImage, ContainerRuntime, ContainerizedModel};
use crate::errors::{LorenzError, LorenzResult};
use crate::forcing::LorenzForcing;
use chrono::Utc;
use log::debug;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use super::builder::LorenzBuilder;
use super::methods::{CleanupWarning, LorenzMethods};
use super::status::ModelStatus;

/// Model-specific hooks the eWaterCycle host calls during a run
pub trait EwcModel {
    /// The initial parameters of the model
    fn parameters(&self) -> Vec<(String, ConfigValue)>;

    /// The initial states of the model
    fn states(&self) -> Vec<(String, ConfigValue)>;

    /// Write the configuration file the model process reads on initialization
    fn make_cfg_file(&mut self, overrides: &ConfigOverrides) -> LorenzResult<PathBuf>;

    /// Tear down the model process and remove the configuration it was given
    ///
    /// The model cannot be used afterwards.
    fn finalize(&mut self) -> LorenzResult<Vec<CleanupWarning>>;
}

/// The Lorenz-96 model running in its grpc4bmi container
pub struct Lorenz<R: ContainerRuntime> {
    container: ContainerizedModel<R>,
    methods: LorenzMethods,
    output_dir: PathBuf,
    status: ModelStatus,
}

impl<R: ContainerRuntime> Lorenz<R> {
    pub fn builder(forcing: LorenzForcing, runtime: R) -> LorenzBuilder<R> {
        LorenzBuilder::new(forcing, runtime)
    }

    pub(crate) fn from_parts(
        container: ContainerizedModel<R>,
        methods: LorenzMethods,
        output_dir: PathBuf,
    ) -> Self {
        Self {
            container,
            methods,
            output_dir,
            status: ModelStatus::Unconfigured,
        }
    }

    pub fn status(&self) -> ModelStatus {
        self.status
    }

    pub fn image(&self) -> &ContainerImage {
        self.container.image()
    }

    pub fn forcing(&self) -> &LorenzForcing {
        self.methods.forcing()
    }

    pub fn methods(&self) -> &LorenzMethods {
        &self.methods
    }

    pub fn cfg_dir(&self) -> Option<&Path> {
        self.methods.cfg_dir()
    }

    /// Prepare a run
    ///
    /// The working directory is `cfg_dir` when given, otherwise a new timestamped directory
    /// inside the output directory. The forcing is checked first, so an invalid forcing
    /// leaves nothing on disk. The directory is then created if needed, the configuration
    /// file is written into it and the model process is started.
    ///
    /// Returns the paths of the configuration file and the working directory.
    pub fn setup(
        &mut self,
        cfg_dir: Option<&Path>,
        overrides: &ConfigOverrides,
    ) -> LorenzResult<(PathBuf, PathBuf)> {
        self.expect_status(ModelStatus::Unconfigured, "set up the model")?;
        self.methods.forcing().validate()?;

        let cfg_dir = self.make_cfg_dir(cfg_dir)?;
        self.methods.set_cfg_dir(&cfg_dir);
        let cfg_file = self.methods.make_cfg_file(overrides)?;
        self.container.start(&cfg_dir)?;

        self.status = ModelStatus::Configured;
        Ok((cfg_file, cfg_dir))
    }

    /// Initialize the model process from a configuration file
    pub fn initialize(&mut self, config_file: &Path) -> LorenzResult<()> {
        self.expect_status(ModelStatus::Configured, "initialize the model")?;
        self.container.bmi_mut()?.initialize(config_file)?;
        self.status = ModelStatus::Running;
        debug!("Initialized Lorenz model from {}", config_file.display());
        Ok(())
    }

    /// Advance the model by one time step
    pub fn update(&mut self) -> LorenzResult<()> {
        self.expect_status(ModelStatus::Running, "update the model")?;
        Ok(self.container.bmi_mut()?.update()?)
    }

    /// Current model time
    pub fn time(&self) -> LorenzResult<f64> {
        Ok(self.container.bmi()?.get_current_time()?)
    }

    pub fn start_time(&self) -> LorenzResult<f64> {
        Ok(self.container.bmi()?.get_start_time()?)
    }

    pub fn end_time(&self) -> LorenzResult<f64> {
        Ok(self.container.bmi()?.get_end_time()?)
    }

    pub fn time_step(&self) -> LorenzResult<f64> {
        Ok(self.container.bmi()?.get_time_step()?)
    }

    pub fn time_units(&self) -> LorenzResult<String> {
        Ok(self.container.bmi()?.get_time_units()?)
    }

    pub fn output_var_names(&self) -> LorenzResult<Vec<String>> {
        Ok(self.container.bmi()?.get_output_var_names()?)
    }

    pub fn get_value(&self, name: &str) -> LorenzResult<Vec<f64>> {
        Ok(self.container.bmi()?.get_value(name)?)
    }

    pub fn set_value(&mut self, name: &str, values: &[f64]) -> LorenzResult<()> {
        Ok(self.container.bmi_mut()?.set_value(name, values)?)
    }

    fn make_cfg_dir(&self, cfg_dir: Option<&Path>) -> LorenzResult<PathBuf> {
        let cfg_dir = match cfg_dir {
            Some(cfg_dir) => to_absolute_path(cfg_dir)?,
            None => {
                let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
                to_absolute_path(&self.output_dir.join(format!("Lorenz_{}", timestamp)))?
            }
        };
        fs::create_dir_all(&cfg_dir)?;
        Ok(cfg_dir)
    }

    fn expect_status(&self, expected: ModelStatus, operation: &'static str) -> LorenzResult<()> {
        if self.status == expected {
            return Ok(());
        }
        if self.status.is_finalized() {
            return Err(LorenzError::HandleReleased);
        }
        Err(LorenzError::InvalidTransition {
            operation,
            status: self.status,
        })
    }
}

impl<R: ContainerRuntime> EwcModel for Lorenz<R> {
    fn parameters(&self) -> Vec<(String, ConfigValue)> {
        self.methods.parameters()
    }

    fn states(&self) -> Vec<(String, ConfigValue)> {
        self.methods.states()
    }

    fn make_cfg_file(&mut self, overrides: &ConfigOverrides) -> LorenzResult<PathBuf> {
        if self.status.is_finalized() {
            return Err(LorenzError::HandleReleased);
        }
        self.methods.make_cfg_file(overrides)
    }

    fn finalize(&mut self) -> LorenzResult<Vec<CleanupWarning>> {
        self.container.release()?;
        self.status = ModelStatus::Finalized;
        self.methods.remove_config_artifacts()
    }
}

fn to_absolute_path(path: &Path) -> LorenzResult<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(env::current_dir()?.join(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bmi::test_support::{CallLog, FakeBmi};
    use crate::config::{CLEANUP_FILE_NAME, CONFIG_FILE_NAME};
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct FakeRuntime {
        log: Rc<RefCell<CallLog>>,
    }

    impl ContainerRuntime for FakeRuntime {
        type Handle = FakeBmi;

        fn start(&self, _image: &ContainerImage, work_dir: &Path) -> LorenzResult<FakeBmi> {
            assert!(work_dir.join(CONFIG_FILE_NAME).exists());
            self.log.borrow_mut().calls.push("start".to_string());
            Ok(FakeBmi::new(self.log.clone()))
        }
    }

    fn create_model(output_dir: &Path) -> (Lorenz<FakeRuntime>, Rc<RefCell<CallLog>>) {
        let log = Rc::new(RefCell::new(CallLog::default()));
        let forcing = LorenzForcing::new(8.0, 0.5, "2000-01-01T00:00:00Z", "2000-01-02T00:00:00Z");
        let model = Lorenz::builder(forcing, FakeRuntime { log: log.clone() })
            .with_output_dir(output_dir)
            .build();
        (model, log)
    }

    #[test]
    fn setup_creates_timestamped_directory() {
        let output = tempfile::tempdir().unwrap();
        let (mut model, log) = create_model(output.path());

        let (cfg_file, cfg_dir) = model.setup(None, &ConfigOverrides::new()).unwrap();

        assert_eq!(model.status(), ModelStatus::Configured);
        assert!(cfg_dir.starts_with(output.path()));
        let dir_name = cfg_dir.file_name().unwrap().to_str().unwrap();
        assert!(dir_name.starts_with("Lorenz_"), "{}", dir_name);
        assert_eq!(dir_name.len(), "Lorenz_YYYYmmdd_HHMMSS".len());
        assert_eq!(cfg_file, cfg_dir.join(CONFIG_FILE_NAME));
        assert!(cfg_file.exists());
        assert_eq!(log.borrow().calls, vec!["start"]);
    }

    #[test]
    fn setup_in_given_directory() {
        let output = tempfile::tempdir().unwrap();
        let cfg_dir = output.path().join("nested").join("run");
        let (mut model, _log) = create_model(output.path());

        let (_, used_dir) = model
            .setup(Some(&cfg_dir), &ConfigOverrides::new().with("J", 20))
            .unwrap();

        assert_eq!(used_dir, cfg_dir);
        assert_eq!(model.cfg_dir(), Some(cfg_dir.as_path()));
        assert_eq!(model.parameters(), vec![("J".to_string(), json!(20))]);
    }

    #[test]
    fn cannot_setup_twice() {
        let output = tempfile::tempdir().unwrap();
        let (mut model, _log) = create_model(output.path());
        model.setup(None, &ConfigOverrides::new()).unwrap();

        let result = model.setup(None, &ConfigOverrides::new());
        assert!(matches!(
            result,
            Err(LorenzError::InvalidTransition {
                status: ModelStatus::Configured,
                ..
            })
        ));
    }

    #[test]
    fn update_requires_initialize() {
        let output = tempfile::tempdir().unwrap();
        let (mut model, _log) = create_model(output.path());

        assert!(matches!(
            model.update(),
            Err(LorenzError::InvalidTransition {
                status: ModelStatus::Unconfigured,
                ..
            })
        ));

        model.setup(None, &ConfigOverrides::new()).unwrap();
        assert!(matches!(
            model.update(),
            Err(LorenzError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn run_through_lifecycle() {
        let output = tempfile::tempdir().unwrap();
        let (mut model, log) = create_model(output.path());

        let (cfg_file, cfg_dir) = model.setup(None, &ConfigOverrides::new()).unwrap();
        model.initialize(&cfg_file).unwrap();
        assert_eq!(model.status(), ModelStatus::Running);

        while model.time().unwrap() < model.end_time().unwrap() {
            model.update().unwrap();
        }
        assert_eq!(model.time().unwrap(), 1.0);
        assert_eq!(model.time_step().unwrap(), 0.5);

        model.set_value("state", &[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(model.get_value("state").unwrap(), vec![1.0, 2.0, 3.0]);

        // Cleanup misses the written file, so the working directory cannot be removed
        assert!(matches!(model.finalize(), Err(LorenzError::Io(_))));
        assert_eq!(model.status(), ModelStatus::Finalized);
        assert!(cfg_file.exists());
        assert!(cfg_dir.exists());
        assert_eq!(log.borrow().config_file.as_deref(), Some(cfg_file.as_path()));
        assert_eq!(
            log.borrow().calls,
            vec!["start", "initialize", "update", "update", "finalize"]
        );
    }

    #[test]
    fn finalize_twice_fails() {
        let output = tempfile::tempdir().unwrap();
        let (mut model, _log) = create_model(output.path());
        model.setup(None, &ConfigOverrides::new()).unwrap();
        assert!(matches!(model.finalize(), Err(LorenzError::Io(_))));

        assert!(matches!(model.finalize(), Err(LorenzError::HandleReleased)));
        assert!(matches!(model.time(), Err(LorenzError::HandleReleased)));
        assert!(matches!(model.update(), Err(LorenzError::HandleReleased)));
        assert!(matches!(
            model.make_cfg_file(&ConfigOverrides::new()),
            Err(LorenzError::HandleReleased)
        ));
    }

    #[test]
    fn finalize_before_setup_fails() {
        let output = tempfile::tempdir().unwrap();
        let (mut model, log) = create_model(output.path());

        assert!(matches!(model.finalize(), Err(LorenzError::NotSetUp)));
        assert_eq!(model.status(), ModelStatus::Unconfigured);
        assert!(log.borrow().calls.is_empty());
    }

    #[test]
    fn finalize_with_missing_config_file_warns() {
        let output = tempfile::tempdir().unwrap();
        let (mut model, _log) = create_model(output.path());
        let (cfg_file, cfg_dir) = model.setup(None, &ConfigOverrides::new()).unwrap();
        fs::remove_file(&cfg_file).unwrap();

        let warnings = model.finalize().unwrap();

        assert_eq!(
            warnings,
            vec![CleanupWarning::ConfigFileMissing(cfg_dir.join(CLEANUP_FILE_NAME))]
        );
        assert!(!cfg_dir.exists());
    }

    #[test]
    fn invalid_forcing_leaves_nothing_on_disk() {
        let output = tempfile::tempdir().unwrap();
        let log = Rc::new(RefCell::new(CallLog::default()));
        let mut forcing =
            LorenzForcing::new(8.0, 0.5, "2000-01-01T00:00:00Z", "2000-01-02T00:00:00Z");
        forcing.f = f64::NAN;
        let mut model = Lorenz::builder(forcing, FakeRuntime { log: log.clone() })
            .with_output_dir(output.path())
            .build();

        let result = model.setup(None, &ConfigOverrides::new());

        assert!(matches!(result, Err(LorenzError::NonFiniteForcing { .. })));
        assert_eq!(model.status(), ModelStatus::Unconfigured);
        assert_eq!(model.cfg_dir(), None);
        assert_eq!(fs::read_dir(output.path()).unwrap().count(), 0);
        assert!(log.borrow().calls.is_empty());
    }
}
