//! Bracketing session: read the camera's choices, plan, capture, reset.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::bracket::{BracketPlan, BracketRequest};
use crate::choices::ChoiceSet;
use crate::config::CameraConfig;
use crate::error::Result;
use crate::gphoto::{ConfigReader, CaptureDriver, CaptureScript, DeviceError};

/// gphoto2 paths and values used for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    pub compensation_path: String,
    pub capture_target_path: String,
    pub capture_target: Option<u32>,
    pub status_paths: Vec<String>,
}

impl From<&CameraConfig> for SessionSettings {
    fn from(camera: &CameraConfig) -> Self {
        Self {
            compensation_path: camera.compensation_path.clone(),
            capture_target_path: camera.capture_target_path.clone(),
            capture_target: camera.capture_target,
            status_paths: camera.status_paths.clone(),
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from(&CameraConfig::default())
    }
}

/// Read the camera's compensation choices and validate them.
pub fn read_choice_set<R: ConfigReader + ?Sized>(reader: &R, path: &str) -> Result<ChoiceSet> {
    let entry = reader.get_config(path)?;
    let raw = entry.numeric_choices()?;
    log::debug!("{} reports {} choices: {:?}", entry.label, raw.len(), raw);
    Ok(ChoiceSet::build(raw)?)
}

/// Read `(label, current)` for each status path.
pub fn read_status<R: ConfigReader + ?Sized>(
    reader: &R,
    paths: &[String],
) -> std::result::Result<Vec<(String, String)>, DeviceError> {
    paths
        .iter()
        .map(|path| {
            reader
                .get_config(path)
                .map(|entry| (entry.label, entry.current))
        })
        .collect()
}

/// Log the camera's current settings at info level.
pub fn log_status<R: ConfigReader + ?Sized>(reader: &R, paths: &[String]) -> Result<()> {
    let status = read_status(reader, paths)?;
    log::info!("Current Values:");
    for (label, current) in status {
        log::info!("\t{}: {}", label, current);
    }
    Ok(())
}

/// Holds the camera's compensation override until it is released.
///
/// Dropping the guard while still armed resets compensation to zero, so every
/// exit path after the first capture leaves the camera at zero.
pub struct CompensationGuard<'a, D: CaptureDriver + ?Sized> {
    driver: &'a mut D,
    path: String,
    armed: bool,
}

impl<'a, D: CaptureDriver + ?Sized> CompensationGuard<'a, D> {
    pub fn new(driver: &'a mut D, path: &str) -> Self {
        Self {
            driver,
            path: path.to_string(),
            armed: true,
        }
    }

    pub fn driver(&mut self) -> &mut D {
        &mut *self.driver
    }

    /// Mark compensation as already reset, e.g. by a script's trailing reset.
    pub fn complete(mut self) {
        self.armed = false;
    }
}

impl<D: CaptureDriver + ?Sized> Drop for CompensationGuard<'_, D> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        log::debug!("resetting {} to 0", self.path);
        if let Err(e) = self.driver.reset_compensation(&self.path) {
            log::error!("Failed to reset exposure compensation: {}", e);
        }
    }
}

/// Capture every value in `plan`, in order, then reset compensation.
pub fn capture<D: CaptureDriver + ?Sized>(
    driver: &mut D,
    settings: &SessionSettings,
    plan: &BracketPlan,
) -> Result<()> {
    let target = settings
        .capture_target
        .map(|target| (settings.capture_target_path.as_str(), target));
    let script = CaptureScript::new(&settings.compensation_path, target, plan.values());

    let mut guard = CompensationGuard::new(driver, script.compensation_path());
    if let Err(e) = guard.driver().run_script(&script) {
        if ctrlc_received() {
            log::warn!("Capture interrupted, resetting exposure compensation");
        }
        return Err(e.into());
    }
    guard.complete();

    log::info!("{} brackets captured", script.shots());
    Ok(())
}

/// Compute the bracket plan for `request` against the camera's choices.
pub fn plan<R: ConfigReader + ?Sized>(
    reader: &R,
    settings: &SessionSettings,
    request: BracketRequest,
) -> Result<BracketPlan> {
    let choices = read_choice_set(reader, &settings.compensation_path)?;
    let plan = request.plan(&choices)?;

    if let Some(warning) = plan.warning() {
        log::warn!("{}", warning);
    }
    log::debug!(
        "{} brackets will be taken with the following compensations {}",
        plan.len(),
        plan
    );
    Ok(plan)
}

/// Full session: log status, plan, and capture unless `dry_run`.
pub fn run<R, D>(
    reader: &R,
    driver: &mut D,
    settings: &SessionSettings,
    request: BracketRequest,
    dry_run: bool,
) -> Result<BracketPlan>
where
    R: ConfigReader + ?Sized,
    D: CaptureDriver + ?Sized,
{
    log_status(reader, &settings.status_paths)?;
    let plan = plan(reader, settings, request)?;

    if dry_run {
        log::info!("Dry run, skipping capture of {} brackets", plan.len());
    } else {
        capture(driver, settings, &plan)?;
    }
    Ok(plan)
}

/// Global flag for handling Ctrl+C across the application
static CTRLC_RECEIVED: AtomicBool = AtomicBool::new(false);

/// Check if Ctrl+C has been received.
pub fn ctrlc_received() -> bool {
    CTRLC_RECEIVED.load(Ordering::SeqCst)
}

/// Set up the Ctrl+C handler.
///
/// gphoto2 shares our process group and stops on its own; the handler keeps
/// this process alive so the compensation reset still runs.
/// This should be called once at program startup.
pub fn setup_ctrlc_handler() -> std::result::Result<(), ctrlc::Error> {
    ctrlc::set_handler(move || {
        CTRLC_RECEIVED.store(true, Ordering::SeqCst);
        eprintln!("\nReceived Ctrl+C, stopping capture...");
    })
}
