//! CLI argument definitions for the Kalinka packager.
//!
//! Both subcommands share the wheel build options; `deb` adds the packaging
//! directories. Flags override values from `kalinka-packager.toml`.

use crate::config::PackagerConfig;
use crate::wheel::PRETEND_VERSION_ENV;
use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};

/// Build the Kalinka Qobuz plugin wheel and Debian package.
#[derive(Parser, Debug)]
#[command(name = "kalinka-packager")]
#[command(version, about)]
#[command(long_about = concat!(
    "Build the Kalinka Qobuz plugin wheel and Debian package.\n\n",
    "The version is derived by setuptools-scm from the checkout's tags while ",
    "the wheel is built; it is never passed in by hand. `deb` always rebuilds ",
    "the wheel first and packages exactly the wheel that build produced.",
))]
#[command(after_help = concat!(
    "EXAMPLES:\n",
    "  Build the wheel from the current checkout:\n",
    "    $ kalinka-packager wheel\n\n",
    "  Build the Debian package into ./out:\n",
    "    $ kalinka-packager deb --output-dir out\n\n",
    "  Package a checkout without tag history at a fixed version:\n",
    "    $ SETUPTOOLS_SCM_PRETEND_VERSION=1.2.3 kalinka-packager deb",
))]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Build the wheel and its manifest.
    Wheel(WheelArgs),

    /// Build the wheel, then the Debian package.
    Deb(DebArgs),
}

impl Command {
    /// Return the options shared by every subcommand.
    #[must_use]
    pub fn common(&self) -> &CommonArgs {
        match self {
            Self::Wheel(args) => &args.common,
            Self::Deb(args) => &args.common,
        }
    }
}

/// Options shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Root of the plugin checkout.
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub source_dir: Utf8PathBuf,

    /// Configuration file [default: <SOURCE_DIR>/kalinka-packager.toml].
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<Utf8PathBuf>,

    /// Directory receiving the wheel and manifest.
    #[arg(long, value_name = "DIR")]
    pub dist_dir: Option<Utf8PathBuf>,

    /// Python interpreter running the build frontend.
    #[arg(long, value_name = "PATH")]
    pub python: Option<String>,

    /// Version forced on setuptools-scm.
    #[arg(long, value_name = "VERSION", env = PRETEND_VERSION_ENV)]
    pub pretend_version: Option<String>,

    /// Increase log verbosity (repeatable: -v, -vv).
    #[arg(
        short,
        long = "verbose",
        action = clap::ArgAction::Count,
        conflicts_with = "quiet"
    )]
    pub verbosity: u8,

    /// Only log errors.
    #[arg(short, long, conflicts_with = "verbosity")]
    pub quiet: bool,
}

impl CommonArgs {
    /// Overlay these flags onto `config`.
    pub fn apply(&self, config: &mut PackagerConfig) {
        if let Some(dist_dir) = &self.dist_dir {
            config.wheel.dist_dir.clone_from(dist_dir);
        }
        if let Some(python) = &self.python {
            config.wheel.python.clone_from(python);
        }
    }
}

/// Arguments for the wheel command.
#[derive(Args, Debug, Clone)]
pub struct WheelArgs {
    /// Shared options.
    #[command(flatten)]
    pub common: CommonArgs,
}

/// Arguments for the deb command.
#[derive(Args, Debug, Clone)]
pub struct DebArgs {
    /// Shared options.
    #[command(flatten)]
    pub common: CommonArgs,

    /// Scratch directory for the staged tree.
    #[arg(long, value_name = "DIR")]
    pub staging_dir: Option<Utf8PathBuf>,

    /// Directory receiving the package.
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<Utf8PathBuf>,
}

impl DebArgs {
    /// Overlay these flags onto `config`.
    pub fn apply(&self, config: &mut PackagerConfig) {
        self.common.apply(config);
        if let Some(staging_dir) = &self.staging_dir {
            config.deb.staging_dir.clone_from(staging_dir);
        }
        if let Some(output_dir) = &self.output_dir {
            config.deb.output_dir.clone_from(output_dir);
        }
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
