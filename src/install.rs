use std::fs;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use tracing::info;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    Accepted,
    Dismissed,
}

/// Offer to copy the running binary into the user's executable directory.
///
/// The offer is held back until the user asks for it; dismissing closes the
/// dialog but keeps the offer around, accepting clears it for good.
#[derive(Debug, Clone)]
pub struct InstallPrompt {
    exe: PathBuf,
    target_dir: Option<PathBuf>,
    standalone: bool,
    deferred: bool,
    showing: bool,
}

impl InstallPrompt {
    pub fn new(exe: PathBuf, target_dir: Option<PathBuf>) -> Self {
        let standalone = match (&target_dir, exe.parent()) {
            (Some(dir), Some(parent)) => same_dir(dir, parent),
            _ => false,
        };
        Self {
            deferred: !standalone && target_dir.is_some(),
            exe,
            target_dir,
            standalone,
            showing: false,
        }
    }

    /// Offer for the current executable and `~/.local/bin` (or equivalent)
    pub fn detect() -> Self {
        let exe = std::env::current_exe().unwrap_or_default();
        let target = BaseDirs::new().and_then(|d| d.executable_dir().map(Path::to_path_buf));
        Self::new(exe, target)
    }

    /// Running from the install location already
    pub fn is_standalone(&self) -> bool {
        self.standalone
    }

    pub fn is_available(&self) -> bool {
        self.deferred
    }

    pub fn is_showing(&self) -> bool {
        self.showing
    }

    pub fn target_path(&self) -> Option<PathBuf> {
        let name = self.exe.file_name()?;
        self.target_dir.as_ref().map(|d| d.join(name))
    }

    /// Replay the deferred offer. No-op when there is nothing to offer.
    pub fn prompt(&mut self) -> bool {
        self.showing = self.deferred;
        self.showing
    }

    pub fn resolve(&mut self, outcome: InstallOutcome) -> Result<Option<PathBuf>> {
        if !self.showing {
            return Ok(None);
        }
        self.showing = false;

        match outcome {
            InstallOutcome::Dismissed => Ok(None),
            InstallOutcome::Accepted => {
                let target = self.install()?;
                self.deferred = false;
                Ok(Some(target))
            }
        }
    }

    fn install(&self) -> Result<PathBuf> {
        let dir = self.target_dir.as_ref().ok_or(Error::NoInstallDir)?;
        let target = self.target_path().ok_or(Error::NoInstallDir)?;

        fs::create_dir_all(dir).map_err(|source| Error::Install {
            path: dir.clone(),
            source,
        })?;
        fs::copy(&self.exe, &target).map_err(|source| Error::Install {
            path: target.clone(),
            source,
        })?;
        info!(target = %target.display(), "installed");
        Ok(target)
    }
}

fn same_dir(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn fake_exe(dir: &Path) -> PathBuf {
        let exe = dir.join("shadowbox");
        fs::write(&exe, b"binary").unwrap();
        exe
    }

    #[test]
    fn offer_is_deferred_until_prompted() {
        let src = tempdir().unwrap();
        let bin = tempdir().unwrap();
        let mut p = InstallPrompt::new(fake_exe(src.path()), Some(bin.path().into()));

        assert!(p.is_available());
        assert!(!p.is_showing());
        assert!(!p.is_standalone());
        assert_eq!(p.resolve(InstallOutcome::Accepted).unwrap(), None);
        assert!(!bin.path().join("shadowbox").exists());
    }

    #[test]
    fn dismiss_keeps_the_offer() {
        let src = tempdir().unwrap();
        let bin = tempdir().unwrap();
        let mut p = InstallPrompt::new(fake_exe(src.path()), Some(bin.path().into()));

        assert!(p.prompt());
        assert_eq!(p.resolve(InstallOutcome::Dismissed).unwrap(), None);
        assert!(!p.is_showing());
        assert!(p.is_available());
    }

    #[test]
    fn accept_copies_binary_and_clears_offer() {
        let src = tempdir().unwrap();
        let bin = tempdir().unwrap();
        let target_dir = bin.path().join("nested");
        let mut p = InstallPrompt::new(fake_exe(src.path()), Some(target_dir.clone()));

        p.prompt();
        let installed = p.resolve(InstallOutcome::Accepted).unwrap().unwrap();
        assert_eq!(installed, target_dir.join("shadowbox"));
        assert_eq!(fs::read(&installed).unwrap(), b"binary");
        assert!(!p.is_available());
        assert!(!p.prompt());
    }

    #[test]
    fn running_from_install_dir_is_standalone() {
        let bin = tempdir().unwrap();
        let p = InstallPrompt::new(fake_exe(bin.path()), Some(bin.path().into()));
        assert!(p.is_standalone());
        assert!(!p.is_available());
    }

    #[test]
    fn no_target_dir_means_no_offer() {
        let src = tempdir().unwrap();
        let mut p = InstallPrompt::new(fake_exe(src.path()), None);
        assert!(!p.is_available());
        assert!(!p.prompt());
    }

    #[test]
    fn failed_copy_surfaces_install_error() {
        let src = tempdir().unwrap();
        let bin = tempdir().unwrap();
        let mut p = InstallPrompt::new(src.path().join("missing"), Some(bin.path().into()));
        p.prompt();
        assert!(matches!(
            p.resolve(InstallOutcome::Accepted),
            Err(Error::Install { .. })
        ));
        assert!(p.is_available());
    }
}
