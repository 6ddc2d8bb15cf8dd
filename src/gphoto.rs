//! gphoto2 command-line integration.
//!
//! Reads camera configuration entries and runs capture scripts by spawning the
//! `gphoto2` executable. The [`ConfigReader`] and [`CaptureDriver`] traits are
//! the seams the session works against, so tests can substitute fakes.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::choices::Millistops;

/// Errors talking to the camera. None of these are retried.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("{0} not found. Please install gphoto2 or set camera.gphoto2 in the config file")]
    NotFound(String),

    #[error("failed to run gphoto2: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("gphoto2 exited with code {exit_code:?}\n{stderr}")]
    CommandFailed {
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("gphoto2 output for {path} has no {field} line")]
    MissingField { path: String, field: &'static str },

    #[error("camera choice '{0}' is not an integer compensation value")]
    InvalidChoice(String),
}

/// One configuration entry as printed by `gphoto2 --get-config`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConfigEntry {
    pub label: String,
    pub kind: Option<String>,
    pub current: String,
    pub choices: Vec<String>,
}

impl ConfigEntry {
    /// Choices parsed as integer millistops, in the order the camera lists them.
    pub fn numeric_choices(&self) -> Result<Vec<Millistops>, DeviceError> {
        self.choices
            .iter()
            .map(|choice| {
                choice
                    .parse::<Millistops>()
                    .map_err(|_| DeviceError::InvalidChoice(choice.clone()))
            })
            .collect()
    }
}

/// Parse the output of `gphoto2 --get-config <path>`.
///
/// # Example output
/// ```text
/// Label: Exposure Compensation
/// Readonly: 0
/// Type: MENU
/// Current: 0
/// Choice: 0 -3000
/// Choice: 1 -2000
/// END
/// ```
pub fn parse_config_entry(path: &str, output: &str) -> Result<ConfigEntry, DeviceError> {
    let mut label = None;
    let mut current = None;
    let mut kind = None;
    let mut choices = Vec::new();

    for line in output.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("Label:") {
            label = Some(rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix("Current:") {
            current = Some(rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix("Type:") {
            kind = Some(rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix("Choice:") {
            // "Choice: <index> <value>", value may contain spaces for text menus
            let rest = rest.trim();
            let value = match rest.split_once(char::is_whitespace) {
                Some((_, value)) => value.trim(),
                None => rest,
            };
            choices.push(value.to_string());
        }
    }

    let label = label.ok_or_else(|| DeviceError::MissingField {
        path: path.to_string(),
        field: "Label",
    })?;
    let current = current.ok_or_else(|| DeviceError::MissingField {
        path: path.to_string(),
        field: "Current",
    })?;

    Ok(ConfigEntry {
        label,
        kind,
        current,
        choices,
    })
}

/// Ordered gphoto2 arguments for one bracket sequence.
///
/// Each compensation value becomes a set-then-capture pair; the script always
/// ends by setting compensation back to zero, even when there is nothing to
/// capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureScript {
    compensation_path: String,
    args: Vec<String>,
    shots: usize,
}

impl CaptureScript {
    /// Build a script. `capture_target` is the `(path, value)` pair selecting
    /// where the camera stores images, set once before the first capture.
    pub fn new(
        compensation_path: &str,
        capture_target: Option<(&str, u32)>,
        values: &[Millistops],
    ) -> Self {
        let mut args = vec!["--quiet".to_string()];
        if let Some((path, target)) = capture_target {
            args.push("--set-config".to_string());
            args.push(format!("{}={}", path, target));
        }
        for value in values {
            args.push("--set-config-value".to_string());
            args.push(format!("{}={}", compensation_path, value));
            args.push("--capture-image".to_string());
        }
        args.push("--set-config".to_string());
        args.push(format!("{}=0", compensation_path));

        Self {
            compensation_path: compensation_path.to_string(),
            args,
            shots: values.len(),
        }
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn compensation_path(&self) -> &str {
        &self.compensation_path
    }

    /// Number of captures in the script.
    pub fn shots(&self) -> usize {
        self.shots
    }
}

/// Reads camera configuration entries.
pub trait ConfigReader {
    fn get_config(&self, path: &str) -> Result<ConfigEntry, DeviceError>;
}

/// Executes capture scripts against the camera.
pub trait CaptureDriver {
    /// Run the whole script in order, including its trailing reset.
    fn run_script(&mut self, script: &CaptureScript) -> Result<(), DeviceError>;

    /// Set compensation at `path` back to zero.
    fn reset_compensation(&mut self, path: &str) -> Result<(), DeviceError>;
}

/// The `gphoto2` executable.
#[derive(Debug, Clone)]
pub struct Gphoto2 {
    binary: PathBuf,
}

impl Default for Gphoto2 {
    fn default() -> Self {
        Self::new("gphoto2")
    }
}

impl Gphoto2 {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Run gphoto2 with `args` and return its stdout.
    fn output<S: AsRef<std::ffi::OsStr>>(&self, args: &[S]) -> Result<String, DeviceError> {
        log::debug!(
            "running {} {}",
            self.binary.display(),
            args.iter()
                .map(|a| a.as_ref().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join(" ")
        );

        let output = Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    DeviceError::NotFound(self.binary.display().to_string())
                } else {
                    DeviceError::Spawn(e)
                }
            })?;

        if !output.status.success() {
            return Err(DeviceError::CommandFailed {
                exit_code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl ConfigReader for Gphoto2 {
    fn get_config(&self, path: &str) -> Result<ConfigEntry, DeviceError> {
        let stdout = self.output(&["--get-config", path])?;
        parse_config_entry(path, &stdout)
    }
}

impl CaptureDriver for Gphoto2 {
    fn run_script(&mut self, script: &CaptureScript) -> Result<(), DeviceError> {
        self.output(script.args()).map(|_| ())
    }

    fn reset_compensation(&mut self, path: &str) -> Result<(), DeviceError> {
        let setting = format!("{}=0", path);
        self.output(&["--quiet", "--set-config", setting.as_str()])
            .map(|_| ())
    }
}
