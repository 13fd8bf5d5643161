//! Finding the game executable on disk.
//!
//! Store/launcher integrations live outside this crate and plug in through
//! [`InstallLocator`].

use std::path::{Path, PathBuf};

use tracing::{debug, info};

/// Resolves a game title to its install directory.
pub trait InstallLocator {
    fn install_dir(&self, title: &str) -> Option<PathBuf>;
}

/// Always answers with the same directory.
#[derive(Debug, Clone)]
pub struct DirectoryLocator {
    dir: PathBuf,
}

impl DirectoryLocator {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory containing the running executable.
    pub fn current_exe_dir() -> Option<Self> {
        let exe = std::env::current_exe().ok()?;
        exe.parent().map(Self::new)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl InstallLocator for DirectoryLocator {
    fn install_dir(&self, _title: &str) -> Option<PathBuf> {
        self.dir.is_dir().then(|| self.dir.clone())
    }
}

/// Tries each locator in order.
impl<L: InstallLocator> InstallLocator for [L] {
    fn install_dir(&self, title: &str) -> Option<PathBuf> {
        self.iter().find_map(|l| l.install_dir(title))
    }
}

/// Path to `executable` inside the install directory of `title`, if it exists.
pub fn locate_executable<L: InstallLocator + ?Sized>(
    locator: &L,
    title: &str,
    executable: &str,
) -> Option<PathBuf> {
    info!("Locating {} install...", title);

    let Some(dir) = locator.install_dir(title) else {
        debug!("No install directory for {}", title);
        return None;
    };

    let path = dir.join(executable);
    if path.is_file() {
        info!("Found {}", path.display());
        Some(path)
    } else {
        debug!("{} does not exist", path.display());
        None
    }
}
