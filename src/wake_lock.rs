use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

/// Keeps the display awake while a workout runs
pub trait WakeLock: Send {
    /// Returns false when the platform has no way to hold the display
    fn acquire(&mut self) -> bool;
    fn release(&mut self);
    /// Whether a previously acquired lock is still in force
    fn is_active(&mut self) -> bool;
}

/// Tracks whether a lock is held so that acquire and release pair up:
/// repeated acquires hold one lock, repeated releases free it once. A held
/// lock that the platform dropped behind our back is replaced on the next
/// acquire.
pub struct WakeLockGuard {
    inner: Box<dyn WakeLock>,
    held: bool,
}

impl WakeLockGuard {
    pub fn new(inner: Box<dyn WakeLock>) -> Self {
        Self { inner, held: false }
    }

    pub fn is_held(&self) -> bool {
        self.held
    }

    pub fn acquire(&mut self) {
        if self.held {
            if self.inner.is_active() {
                return;
            }
            warn!("wake lock lost, acquiring again");
            self.inner.release();
        }
        self.held = self.inner.acquire();
        debug!(held = self.held, "wake lock acquire");
    }

    pub fn release(&mut self) {
        if !self.held {
            return;
        }
        self.inner.release();
        self.held = false;
        debug!("wake lock released");
    }
}

impl Drop for WakeLockGuard {
    fn drop(&mut self) {
        self.release();
    }
}

/// Holds an inhibitor process (`systemd-inhibit` on Linux, `caffeinate` on
/// macOS) for as long as the lock is held.
#[derive(Debug)]
pub struct InhibitWakeLock {
    command: Option<(String, Vec<String>)>,
    child: Option<Child>,
}

impl InhibitWakeLock {
    pub fn for_platform() -> Self {
        Self {
            command: platform_command(),
            child: None,
        }
    }

    pub fn with_command(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: Some((program.into(), args)),
            child: None,
        }
    }
}

#[cfg(target_os = "linux")]
fn platform_command() -> Option<(String, Vec<String>)> {
    Some((
        "systemd-inhibit".to_string(),
        [
            "--what=idle",
            "--who=shadowbox",
            "--why=Workout in progress",
            "sleep",
            "infinity",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect(),
    ))
}

#[cfg(target_os = "macos")]
fn platform_command() -> Option<(String, Vec<String>)> {
    Some(("caffeinate".to_string(), vec!["-d".to_string()]))
}

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
fn platform_command() -> Option<(String, Vec<String>)> {
    None
}

impl WakeLock for InhibitWakeLock {
    fn acquire(&mut self) -> bool {
        let Some((program, args)) = &self.command else {
            debug!("wake lock unsupported on this platform");
            return false;
        };

        match Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
        {
            Ok(child) => {
                self.child = Some(child);
                true
            }
            Err(e) => {
                warn!(%program, error = %e, "wake lock unavailable");
                false
            }
        }
    }

    fn release(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }

    /// The inhibitor is alive as long as it hasn't exited
    fn is_active(&mut self) -> bool {
        matches!(self.child.as_mut().map(Child::try_wait), Some(Ok(None)))
    }
}

/// No-op lock that counts calls
#[derive(Debug, Default, Clone)]
pub struct CountingWakeLock {
    counts: Arc<Mutex<(usize, usize)>>,
    alive: Arc<AtomicBool>,
    available: bool,
}

impl CountingWakeLock {
    pub fn new(available: bool) -> Self {
        Self {
            counts: Arc::default(),
            alive: Arc::default(),
            available,
        }
    }

    /// Simulate the platform dropping the lock
    pub fn revoke(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }

    /// (acquires, releases) seen by the platform side
    pub fn counts(&self) -> (usize, usize) {
        self.counts.lock().map(|c| *c).unwrap_or_default()
    }
}

impl WakeLock for CountingWakeLock {
    fn acquire(&mut self) -> bool {
        if let Ok(mut c) = self.counts.lock() {
            c.0 += 1;
        }
        self.alive.store(self.available, Ordering::SeqCst);
        self.available
    }

    fn release(&mut self) {
        if let Ok(mut c) = self.counts.lock() {
            c.1 += 1;
        }
        self.alive.store(false, Ordering::SeqCst);
    }

    fn is_active(&mut self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }
}
