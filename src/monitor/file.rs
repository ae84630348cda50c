//! State source fed from an epoch file.
//!
//! Whatever process tracks the cluster writes the current epoch into a file;
//! the gateway watches it and republishes the trimmed content. A missing or
//! empty file is the unknown epoch.

use async_trait::async_trait;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::monitor::source::{Epoch, StateSource};
use crate::monitor::watch::WatchStateSource;

/// A state source that follows the content of a file.
pub struct FileEpochSource {
    path: PathBuf,
    inner: Arc<WatchStateSource>,
    _watcher: RecommendedWatcher,
}

impl FileEpochSource {
    /// Read the file once and start watching it for changes.
    pub fn start(path: &Path) -> Result<Self, notify::Error> {
        let inner = Arc::new(WatchStateSource::new());
        inner.publish(read_epoch(path));

        let source = inner.clone();
        let watched = path.to_path_buf();
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    let touches_file = event
                        .paths
                        .iter()
                        .any(|p| p.file_name() == watched.file_name());
                    if touches_file
                        && (event.kind.is_modify() || event.kind.is_create() || event.kind.is_remove())
                    {
                        source.publish(read_epoch(&watched));
                    }
                }
                Err(e) => tracing::error!("Epoch watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        // Watch the directory so replacing the file (write + rename) is seen too.
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        watcher.watch(dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?path, epoch = %inner.current_version().unwrap_or_default(), "Epoch file watcher started");

        Ok(Self {
            path: path.to_path_buf(),
            inner,
            _watcher: watcher,
        })
    }

    /// Re-read the file now. Returns true if the epoch changed.
    pub fn refresh(&self) -> bool {
        self.inner.publish(read_epoch(&self.path))
    }
}

fn read_epoch(path: &Path) -> Epoch {
    match std::fs::read_to_string(path) {
        Ok(content) => Epoch::new(content.trim()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Epoch::unknown(),
        Err(e) => {
            tracing::warn!(path = ?path, error = %e, "Failed to read epoch file");
            Epoch::unknown()
        }
    }
}

#[async_trait]
impl StateSource for FileEpochSource {
    fn current_version(&self) -> Option<Epoch> {
        self.inner.current_version()
    }

    async fn wait_for_change(&self, timeout: Duration, current: &Epoch) -> Epoch {
        self.inner.wait_for_change(timeout, current).await
    }
}
