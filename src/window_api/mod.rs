//! Foreground application probes for the activity monitor.
//! [GenericWindowManager] picks the backend compiled in through cargo features.

#[cfg(feature = "win")]
pub mod win;
#[cfg(feature = "x11")]
pub mod x11;

#[cfg(feature = "win")]
extern crate windows;

#[cfg(feature = "x11")]
extern crate xcb;

use std::{
    path::Path,
    sync::{Arc, Mutex},
};

use anyhow::Result;
#[cfg(test)]
use mockall::automock;

#[derive(Debug, Clone)]
pub struct ActiveWindowData {
    /// Name of the window. For example 'bash in hello' or 'Document 1'.
    pub window_title: Arc<str>,
    /// Full path to an executable. For example /home/etc/nvim
    pub process_name: Arc<str>,
}

impl ActiveWindowData {
    /// Identity used as the key of a session's application map: the executable's file name,
    /// falling back to the raw process name.
    pub fn app_name(&self) -> String {
        Path::new(self.process_name.as_ref())
            .file_name()
            .map(|v| v.to_string_lossy().to_string())
            .unwrap_or_else(|| self.process_name.to_string())
    }
}

/// Contract every platform backend implements.
#[cfg_attr(test, automock)]
pub trait WindowManager: Send {
    fn get_active_window_data(&mut self) -> Result<ActiveWindowData>;
}

/// A probe shared by every monitor created during a run.
pub type SharedWindowManager = Arc<Mutex<Box<dyn WindowManager>>>;

/// Serves as a cross-compatible WindowManager implementation.
pub struct GenericWindowManager {
    inner: Box<dyn WindowManager>,
}

impl GenericWindowManager {
    pub fn new() -> Result<Self> {
        cfg_if::cfg_if! {
            if #[cfg(feature = "win")] {
                use win::WindowsWindowManager;
                Ok(Self {
                    inner: Box::new(WindowsWindowManager::new()),
                })
            }
            else if #[cfg(feature = "x11")] {
                use x11::LinuxWindowManager;
                Ok(Self {
                    inner: Box::new(LinuxWindowManager::new()?),
                })
            }
            else {
                // Builds without a backend still run the timer, only without activity data.
                Err(anyhow::anyhow!("No window manager backend was compiled in"))
            }
        }
    }

    pub fn shared(self) -> SharedWindowManager {
        Arc::new(Mutex::new(Box::new(self)))
    }
}

impl WindowManager for GenericWindowManager {
    fn get_active_window_data(&mut self) -> Result<ActiveWindowData> {
        self.inner.get_active_window_data()
    }
}
