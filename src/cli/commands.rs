//! Subcommand handlers for status, steps, plan and config actions.

use std::io::Write;
use std::path::Path;

use super::args::ConfigAction;
use crate::bracket::BracketRequest;
use crate::choices::format_ev;
use crate::config::{default_path, Config};
use crate::error::Result;
use crate::gphoto::ConfigReader;
use crate::session::{self, SessionSettings};

/// Print the camera's current value for each status path.
pub fn print_status<R: ConfigReader + ?Sized, W: Write>(
    reader: &R,
    settings: &SessionSettings,
    out: &mut W,
) -> Result<()> {
    let status = session::read_status(reader, &settings.status_paths)?;
    writeln!(out, "Current Values:")?;
    for (label, current) in status {
        writeln!(out, "  {}: {}", label, current)?;
    }
    Ok(())
}

/// Print the camera's compensation range and the EV steps it accepts.
pub fn print_steps<R: ConfigReader + ?Sized, W: Write>(
    reader: &R,
    settings: &SessionSettings,
    out: &mut W,
) -> Result<()> {
    let choices = session::read_choice_set(reader, &settings.compensation_path)?;
    let (lowest, highest) = (choices.values()[0], choices.values()[choices.len() - 1]);

    writeln!(
        out,
        "Compensation range: {} to {} EV in {} choices (minimum step {})",
        format_ev(lowest),
        format_ev(highest),
        choices.len(),
        choices.min_step()
    )?;
    writeln!(out, "Valid EV steps:")?;
    for step in choices.valid_steps() {
        writeln!(out, "  {:>6}  ({} EV)", step, format_ev(*step))?;
    }
    writeln!(out)?;
    writeln!(out, "Use --evstep <N> to select a step.")?;
    Ok(())
}

/// Compute and print the bracket plan without capturing.
pub fn print_plan<R: ConfigReader + ?Sized, W: Write>(
    reader: &R,
    settings: &SessionSettings,
    request: BracketRequest,
    out: &mut W,
) -> Result<()> {
    let plan = session::plan(reader, settings, request)?;
    writeln!(
        out,
        "{} brackets at {} EV",
        plan.len(),
        plan
    )?;
    for (shot, value) in plan.values().iter().enumerate() {
        writeln!(out, "  [{}] {:>6}", shot + 1, value)?;
    }
    if let Some(warning) = plan.warning() {
        writeln!(out, "{}", warning)?;
    }
    Ok(())
}

/// Handle config subcommand actions.
pub fn handle_config_action<W: Write>(
    action: ConfigAction,
    config: &Config,
    path: Option<&Path>,
    out: &mut W,
) -> Result<()> {
    let config_path = path.map(Path::to_path_buf).unwrap_or_else(default_path);

    match action {
        ConfigAction::Show => {
            writeln!(out, "Current configuration:")?;
            writeln!(out)?;
            write!(out, "{}", config.to_toml()?)?;
            writeln!(out)?;
            if config_path.exists() {
                writeln!(out, "Config file: {} (exists)", config_path.display())?;
            } else {
                writeln!(out, "Config file: {} (not found)", config_path.display())?;
            }
        }
        ConfigAction::Init => {
            Config::default().write_new(&config_path)?;
            writeln!(out, "Created config file: {}", config_path.display())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;
    use crate::error::Error;
    use crate::gphoto::{ConfigEntry, DeviceError};
    use tempfile::tempdir;

    struct SevenStopCamera;

    impl ConfigReader for SevenStopCamera {
        fn get_config(&self, path: &str) -> std::result::Result<ConfigEntry, DeviceError> {
            if path.ends_with("exposurecompensation") {
                Ok(ConfigEntry {
                    label: "Exposure Compensation".to_string(),
                    kind: Some("MENU".to_string()),
                    current: "0".to_string(),
                    choices: ["-3000", "-2000", "-1000", "0", "1000", "2000", "3000"]
                        .iter()
                        .map(|c| c.to_string())
                        .collect(),
                })
            } else {
                Ok(ConfigEntry {
                    label: "ISO Speed".to_string(),
                    current: "100".to_string(),
                    ..ConfigEntry::default()
                })
            }
        }
    }

    fn output<F: FnOnce(&mut Vec<u8>) -> Result<()>>(f: F) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_print_status() {
        let settings = SessionSettings {
            status_paths: vec!["/main/imgsettings/iso".to_string()],
            ..SessionSettings::default()
        };
        let text = output(|out| print_status(&SevenStopCamera, &settings, out));
        assert_eq!(text, "Current Values:\n  ISO Speed: 100\n");
    }

    #[test]
    fn test_print_steps() {
        let text = output(|out| print_steps(&SevenStopCamera, &SessionSettings::default(), out));
        assert!(text.contains("-3.0 to +3.0 EV in 7 choices (minimum step 1000)"));
        assert!(text.contains("  2000  (+2.0 EV)"));
    }

    #[test]
    fn test_print_plan_with_warning() {
        let text = output(|out| {
            print_plan(
                &SevenStopCamera,
                &SessionSettings::default(),
                BracketRequest::new(9, 1000),
                out,
            )
        });
        assert!(text.starts_with("7 brackets at [0.0, -1.0, -2.0, -3.0, +1.0, +2.0, +3.0] EV"));
        assert!(text.contains("2 out of 9 exposure compensations discarded"));
    }

    #[test]
    fn test_print_plan_invalid_step() {
        let mut buf = Vec::new();
        let err = print_plan(
            &SevenStopCamera,
            &SessionSettings::default(),
            BracketRequest::new(3, 1500),
            &mut buf,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidStepRequest(_)));
    }

    #[test]
    fn test_config_init_and_show() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let text = output(|out| {
            handle_config_action(ConfigAction::Init, &Config::default(), Some(&path), out)
        });
        assert!(text.starts_with("Created config file:"));
        assert!(path.exists());

        let text = output(|out| {
            handle_config_action(ConfigAction::Show, &Config::default(), Some(&path), out)
        });
        assert!(text.contains("shots = 3"));
        assert!(text.contains("(exists)"));

        let mut buf = Vec::new();
        let err = handle_config_action(ConfigAction::Init, &Config::default(), Some(&path), &mut buf)
            .unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::AlreadyExists(_))));
    }
}
