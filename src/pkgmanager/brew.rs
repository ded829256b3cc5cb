//! Homebrew backend.
use std::sync::Arc;

use anyhow::{Context as _, Result};

use super::{Manager, ManagerConfig, ManagerDefaults, ManagerKind};
use crate::exec::{Executor, Shell};

const INSTALL_COMMAND: &str =
    r#"/bin/bash -c "$(curl -fsSL https://raw.githubusercontent.com/Homebrew/install/HEAD/install.sh)""#;

/// Homebrew defaults for a host architecture (as in [`std::env::consts::ARCH`]).
///
/// Intel hosts use `/usr/local` and `arch -x86_64`; everything else is
/// treated as Apple silicon.
#[must_use]
pub fn brew_defaults(arch: &str) -> ManagerDefaults {
    let (path, prefix) = if arch == "x86_64" {
        ("/usr/local/bin/brew", "arch -x86_64")
    } else {
        ("/opt/homebrew/bin/brew", "arch -arm64")
    };
    ManagerDefaults {
        path,
        prefix,
        install_command: INSTALL_COMMAND,
    }
}

/// Homebrew, invoked as `<prefix> <path> <subcommand> <package>` through the shell.
pub struct Brew {
    path: String,
    prefix: String,
    executor: Arc<dyn Executor>,
}

impl std::fmt::Debug for Brew {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Brew")
            .field("path", &self.path)
            .field("prefix", &self.prefix)
            .field("executor", &"<dyn Executor>")
            .finish()
    }
}

impl Brew {
    /// Create a backend from a validated configuration.
    ///
    /// An empty prefix takes the host default.
    #[must_use]
    pub fn new(config: &ManagerConfig, executor: Arc<dyn Executor>) -> Self {
        let prefix = if config.prefix.is_empty() {
            ManagerKind::Brew.defaults().prefix.to_string()
        } else {
            config.prefix.clone()
        };
        Self {
            path: config.path.clone(),
            prefix,
            executor,
        }
    }

    fn shell(&self) -> Shell<'_> {
        Shell::detect(self.executor.as_ref())
    }
}

impl Manager for Brew {
    fn kind(&self) -> ManagerKind {
        ManagerKind::Brew
    }

    fn command(&self) -> String {
        format!("{} {}", self.prefix, self.path).trim().to_string()
    }

    fn exists(&self, package: &str) -> Result<bool> {
        self.shell()
            .succeeds(&format!("{} list {package}", self.command()))
    }

    fn install(&self, package: &str) -> Result<()> {
        self.shell()
            .exec(&format!("{} install {package}", self.command()), true)
            .with_context(|| format!("package '{package}' doesn't exist"))
    }

    fn update(&self, package: &str) -> Result<()> {
        self.shell()
            .exec(&format!("{} upgrade {package}", self.command()), true)
            .with_context(|| format!("couldn't update package '{package}'"))
    }

    fn delete(&self, package: &str) -> Result<()> {
        self.shell()
            .exec(&format!("{} uninstall {package}", self.command()), false)
            .with_context(|| format!("couldn't uninstall package '{package}'"))
    }
}
