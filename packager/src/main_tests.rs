//! Tests for the packager CLI entrypoint.

use super::*;
use kalinka_packager::test_utils::{ExpectedCall, StubExecutor};
use std::fs;
use tempfile::TempDir;

fn checkout() -> (TempDir, Utf8PathBuf) {
    let temp = TempDir::new().expect("temp dir");
    let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf())
        .expect("utf8 path")
        .canonicalize_utf8()
        .expect("canonical path");
    fs::create_dir_all(root.join("src/kalinka_plugin_qobuz")).expect("mkdir");
    (temp, root)
}

#[test]
fn exit_code_for_run_result_returns_zero_on_success() {
    let mut stderr = Vec::new();
    let exit_code = exit_code_for_run_result(Ok(()), &mut stderr);
    assert_eq!(exit_code, 0);
    assert!(stderr.is_empty());
}

#[test]
fn exit_code_for_run_result_prints_error_and_returns_one() {
    let err = PackagerError::NoWheelFound {
        dir: Utf8PathBuf::from("dist"),
    };

    let mut stderr = Vec::new();
    let exit_code = exit_code_for_run_result(Err(err), &mut stderr);
    assert_eq!(exit_code, 1);

    let stderr_text = String::from_utf8(stderr).expect("stderr was not UTF-8");
    assert_eq!(stderr_text, "error: no wheel found in dist\n");
}

#[test]
fn wheel_command_prints_wheel_path() {
    let (_temp, root) = checkout();
    let dist = root.join("dist");
    let version_file = root.join("src/kalinka_plugin_qobuz/_version.py");
    let wheel = dist.join("kalinka_plugin_qobuz-1.2.3-py3-none-any.whl");
    let written = wheel.clone();
    let executor = StubExecutor::new(vec![
        ExpectedCall::succeeding(
            "python3",
            [
                "-m",
                "build",
                "--wheel",
                "--outdir",
                dist.as_str(),
                root.as_str(),
            ],
        )
        .with_effect(move |_| {
            fs::write(&version_file, "__version__ = version = '1.2.3'\n")?;
            fs::write(&written, b"wheel")
        }),
    ]);
    let cli = Cli::parse_from(["kalinka-packager", "wheel", "--source-dir", root.as_str()]);

    let mut stdout = Vec::new();
    run(&cli, &executor, &mut stdout).expect("wheel build succeeds");

    executor.assert_finished();
    assert_eq!(
        String::from_utf8(stdout).expect("stdout was not UTF-8"),
        format!("{wheel}\n")
    );
}

#[test]
fn missing_source_dir_is_reported() {
    let (_temp, root) = checkout();
    let absent = root.join("absent");
    let cli = Cli::parse_from(["kalinka-packager", "deb", "--source-dir", absent.as_str()]);
    let executor = StubExecutor::new(Vec::new());

    let err = run(&cli, &executor, &mut Vec::new()).expect_err("source dir is absent");
    assert!(matches!(err, PackagerError::InvalidSourceDir { .. }));
    assert!(executor.invocations().is_empty());
}

#[test]
fn explicit_config_must_exist() {
    let (_temp, root) = checkout();
    let cli = Cli::parse_from([
        "kalinka-packager",
        "wheel",
        "--source-dir",
        root.as_str(),
        "--config",
        "missing.toml",
    ]);
    let executor = StubExecutor::new(Vec::new());

    let err = run(&cli, &executor, &mut Vec::new()).expect_err("config is absent");
    assert!(matches!(err, PackagerError::Config { .. }));
}
