use std::path::Path;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, unbounded};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};

/// Signals when the world config file changes on disk.
pub struct ConfigWatcher {
    _watcher: RecommendedWatcher,
    rx: Receiver<()>,
}

impl ConfigWatcher {
    pub fn new(path: &Path) -> notify::Result<Self> {
        let (tx, rx) = unbounded();
        let mut watcher =
            notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
                match res {
                    Ok(event) => match event.kind {
                        EventKind::Modify(_)
                        | EventKind::Create(_)
                        | EventKind::Remove(_)
                        | EventKind::Any => {
                            // receiver lives as long as the watcher
                            tx.send(()).ok();
                        }
                        _ => {}
                    },
                    Err(e) => log::warn!("config watch error: {e}"),
                }
            })?;
        watcher.watch(path, RecursiveMode::NonRecursive)?;
        Ok(Self {
            _watcher: watcher,
            rx,
        })
    }

    /// Blocks until the file changes, then swallows the burst of events editors produce.
    /// False once the watcher has gone away.
    pub fn wait(&self, settle: Duration) -> bool {
        if self.rx.recv().is_err() {
            return false;
        }
        loop {
            match self.rx.recv_timeout(settle) {
                Ok(()) => continue,
                Err(RecvTimeoutError::Timeout) => return true,
                Err(RecvTimeoutError::Disconnected) => return false,
            }
        }
    }
}
