//! Kalinka packager CLI entrypoint.
//!
//! Builds the plugin wheel, and for `deb` the Debian package, then prints
//! the path of the produced artefact on stdout. Diagnostics go to stderr.

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use kalinka_packager::cli::{Cli, Command};
use kalinka_packager::config::PackagerConfig;
use kalinka_packager::error::{PackagerError, Result};
use kalinka_packager::executor::{CommandExecutor, SystemCommandExecutor};
use kalinka_packager::logging::init_logging;
use kalinka_packager::pipeline::build_and_package;
use kalinka_packager::wheel::WheelBuilder;
use std::io::Write;

fn main() {
    let cli = Cli::parse();
    let mut stderr = std::io::stderr();
    let common = cli.command.common();
    if let Err(err) = init_logging(common.verbosity, common.quiet) {
        write_stderr_line(&mut stderr, format!("warning: {err}"));
    }
    let mut stdout = std::io::stdout();
    let run_result = run(&cli, &SystemCommandExecutor, &mut stdout);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn run(cli: &Cli, executor: &dyn CommandExecutor, stdout: &mut dyn Write) -> Result<()> {
    let common = cli.command.common();
    let source_dir = resolve_source_dir(&common.source_dir)?;
    let mut config = PackagerConfig::load(&source_dir, common.config.as_deref())?;

    let artefact = match &cli.command {
        Command::Wheel(args) => {
            args.common.apply(&mut config);
            let wheel_config = config.wheel_build(&source_dir, args.common.pretend_version.clone());
            WheelBuilder::new(&wheel_config, executor).build()?.wheel_path
        }
        Command::Deb(args) => {
            args.apply(&mut config);
            let wheel_config = config.wheel_build(&source_dir, args.common.pretend_version.clone());
            let deb_config = config.deb_package(&source_dir);
            build_and_package(executor, &wheel_config, &deb_config)?.deb.path
        }
    };
    writeln!(stdout, "{artefact}")?;
    Ok(())
}

fn resolve_source_dir(source_dir: &Utf8Path) -> Result<Utf8PathBuf> {
    let resolved = source_dir
        .canonicalize_utf8()
        .map_err(|e| PackagerError::InvalidSourceDir {
            path: source_dir.to_owned(),
            reason: e.to_string(),
        })?;
    if !resolved.is_dir() {
        return Err(PackagerError::InvalidSourceDir {
            path: source_dir.to_owned(),
            reason: "not a directory".to_owned(),
        });
    }
    Ok(resolved)
}

fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_stderr_line(stderr, format!("error: {err}"));
            1
        }
    }
}

fn write_stderr_line(stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort logging; ignore write failures.
    }
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
