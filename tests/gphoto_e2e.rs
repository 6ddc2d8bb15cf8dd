//! End-to-end session tests against a fake gphoto2 executable.
//!
//! The fake is a shell script that answers `--get-config` like a camera with a
//! seven-stop compensation range and appends every other invocation to a log.

#![cfg(unix)]

use hdr_bracket::gphoto::Gphoto2;
use hdr_bracket::session::{self, SessionSettings};
use hdr_bracket::{BracketRequest, Error};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

fn write_fake_gphoto2(dir: &Path, fail_capture: bool) -> (PathBuf, PathBuf) {
    let log = dir.join("invocations.log");
    let script = dir.join(if fail_capture { "gphoto2-failing" } else { "gphoto2" });
    let fail = if fail_capture {
        "case \"$*\" in *--capture-image*) echo '*** Error: Could not capture image.' >&2; exit 1 ;; esac"
    } else {
        ""
    };
    let body = format!(
        r#"#!/bin/sh
if [ "$1" = "--get-config" ]; then
  case "$2" in
    */exposurecompensation)
      printf 'Label: Exposure Compensation\nReadonly: 0\nType: MENU\nCurrent: 0\n'
      i=0
      for v in -3000 -2000 -1000 0 1000 2000 3000; do
        echo "Choice: $i $v"
        i=$((i+1))
      done
      echo END
      ;;
    *)
      printf 'Label: %s\nType: TEXT\nCurrent: auto\nEND\n' "$2"
      ;;
  esac
  exit 0
fi
echo "$*" >> "{log}"
{fail}
exit 0
"#,
        log = log.display(),
        fail = fail
    );
    std::fs::write(&script, body).unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
    (script, log)
}

fn invocations(log: &Path) -> Vec<String> {
    std::fs::read_to_string(log)
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

// Kept as one test so no other thread forks while the script file is fresh.
#[test]
fn test_session_with_fake_gphoto2() {
    let dir = tempfile::tempdir().unwrap();
    let settings = SessionSettings {
        status_paths: vec!["/main/imgsettings/iso".to_string()],
        ..SessionSettings::default()
    };

    // Successful capture: one invocation, trailing reset included
    let (script, log) = write_fake_gphoto2(dir.path(), false);
    let reader = Gphoto2::new(&script);
    let mut driver = Gphoto2::new(&script);
    let plan = session::run(
        &reader,
        &mut driver,
        &settings,
        BracketRequest::new(3, 1000),
        false,
    )
    .unwrap();
    assert_eq!(plan.values(), &[0, -1000, 1000]);

    let calls = invocations(&log);
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0],
        "--quiet --set-config /main/settings/capturetarget=1 \
         --set-config-value /main/capturesettings/exposurecompensation=0 --capture-image \
         --set-config-value /main/capturesettings/exposurecompensation=-1000 --capture-image \
         --set-config-value /main/capturesettings/exposurecompensation=1000 --capture-image \
         --set-config /main/capturesettings/exposurecompensation=0"
    );

    // Invalid step: nothing is sent to the camera
    let err = session::run(
        &reader,
        &mut driver,
        &settings,
        BracketRequest::new(3, 1500),
        false,
    )
    .unwrap_err();
    assert!(err.to_string().contains("[0, 1000, 2000, 3000]"));
    assert_eq!(invocations(&log).len(), 1);

    // Failed capture: the guard issues a separate reset
    std::fs::remove_file(&log).unwrap();
    let (script, log) = write_fake_gphoto2(dir.path(), true);
    let reader = Gphoto2::new(&script);
    let mut driver = Gphoto2::new(&script);
    let err = session::run(
        &reader,
        &mut driver,
        &settings,
        BracketRequest::new(3, 1000),
        false,
    )
    .unwrap_err();
    assert!(matches!(err, Error::Device(_)));

    let calls = invocations(&log);
    assert_eq!(calls.len(), 2);
    assert_eq!(
        calls[1],
        "--quiet --set-config /main/capturesettings/exposurecompensation=0"
    );
}
