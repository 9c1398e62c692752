use std::sync::Arc;

use anyhow::Result;

/// Reference to a captured image, typically a path or URL the front end can display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef(pub Arc<str>);

/// Captures a picture of the screen every few samples. Encoding and storage are up to the
/// implementation.
pub trait Snapshotter: Send + Sync {
    fn capture(&self, app_name: &str) -> Result<Option<ImageRef>>;
}

/// Used when no capture backend is configured.
pub struct NoSnapshots;

impl Snapshotter for NoSnapshots {
    fn capture(&self, _app_name: &str) -> Result<Option<ImageRef>> {
        Ok(None)
    }
}
