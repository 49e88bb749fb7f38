// FILE: src/watcher.rs
//! Keeps a `ClassificationCache` honest while files change underneath it.
//!
//! The only component that owns a thread. Filesystem events are debounced and
//! then turned into cache invalidations; nothing is reclassified eagerly.

use crate::classifier::ClassificationCache;
use crate::core::Bouncer;
use crate::error::{CanvasError, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

const DEBOUNCE: Duration = Duration::from_millis(500);
const POLL_INTERVAL: Duration = Duration::from_millis(50);

pub struct CacheWatcher {
    cache: Arc<ClassificationCache>,
    watch_paths: Arc<Mutex<Vec<PathBuf>>>,
    shutdown: Arc<AtomicBool>,
    watcher: Option<RecommendedWatcher>,
    thread_handle: Option<thread::JoinHandle<()>>,
}

impl CacheWatcher {
    pub fn new(cache: Arc<ClassificationCache>) -> Self {
        Self {
            cache,
            watch_paths: Arc::new(Mutex::new(Vec::new())),
            shutdown: Arc::new(AtomicBool::new(false)),
            watcher: None,
            thread_handle: None,
        }
    }

    /// Roots added after `start` take effect on the next start.
    pub fn add_watch_path(&self, path: impl Into<PathBuf>) -> Result<()> {
        self.watch_paths
            .lock()
            .map_err(|_| CanvasError::State("Poisoned lock".into()))?
            .push(path.into());
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.thread_handle.is_some()
    }

    pub fn start(&mut self) -> Result<()> {
        if self.thread_handle.is_some() {
            return Err(CanvasError::InvalidOperation("Watcher is already running".into()));
        }

        let roots = self
            .watch_paths
            .lock()
            .map_err(|_| CanvasError::State("Poisoned lock".into()))?
            .clone();

        let (tx, rx) = mpsc::channel();
        let mut watcher = RecommendedWatcher::new(tx, notify::Config::default())?;
        for root in &roots {
            watcher.watch(root, RecursiveMode::Recursive)?;
        }
        tracing::info!("[Watcher] Watching {} root(s)", roots.len());

        self.shutdown.store(false, Ordering::SeqCst);
        let cache = Arc::clone(&self.cache);
        let shutdown = Arc::clone(&self.shutdown);
        self.watcher = Some(watcher);
        self.thread_handle = Some(thread::spawn(move || Self::watcher_loop(rx, cache, shutdown)));
        Ok(())
    }

    pub fn stop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
        // Dropping the watcher closes the channel, which also ends the loop.
        self.watcher = None;
        if let Some(handle) = self.thread_handle.take() {
            if handle.join().is_err() {
                tracing::error!("[Watcher] Watcher thread panicked");
            }
        }
    }

    fn watcher_loop(
        rx: mpsc::Receiver<notify::Result<Event>>,
        cache: Arc<ClassificationCache>,
        shutdown: Arc<AtomicBool>,
    ) {
        let mut pending: HashSet<PathBuf> = HashSet::new();
        let mut last_activity = Instant::now();

        while !shutdown.load(Ordering::SeqCst) {
            match rx.recv_timeout(POLL_INTERVAL) {
                Ok(Ok(event)) => {
                    if matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)) {
                        pending.extend(event.paths);
                        last_activity = Instant::now();
                    }
                }
                Ok(Err(e)) => tracing::warn!("[Watcher] Event error: {}", e),
                Err(mpsc::RecvTimeoutError::Timeout) => {
                    if !pending.is_empty() && last_activity.elapsed() >= DEBOUNCE {
                        let paths = std::mem::take(&mut pending);
                        Self::apply_events(&cache, paths);
                    }
                }
                Err(mpsc::RecvTimeoutError::Disconnected) => break,
            }
        }

        if !pending.is_empty() {
            Self::apply_events(&cache, pending);
        }
        tracing::debug!("[Watcher] Stopped");
    }

    /// Invalidate what the changed `paths` may have affected. Returns entries dropped.
    pub fn apply_events<I>(cache: &ClassificationCache, paths: I) -> usize
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let relevant: Vec<PathBuf> = paths
            .into_iter()
            .filter(|path| !Bouncer::is_noise_path(path))
            .collect();
        if relevant.is_empty() {
            return 0;
        }

        let mut dropped: usize = relevant.iter().map(|path| cache.invalidate_under(path)).sum();
        // Any change may be the target of some marker.
        dropped += cache.invalidate_references();

        tracing::debug!("[Watcher] {} change(s), {} cache entries dropped", relevant.len(), dropped);
        dropped
    }

    pub fn cache(&self) -> &Arc<ClassificationCache> {
        &self.cache
    }

    pub fn watch_paths(&self) -> Vec<PathBuf> {
        self.watch_paths
            .lock()
            .map(|paths| paths.clone())
            .unwrap_or_default()
    }

    pub fn is_watched(&self, path: &Path) -> bool {
        self.watch_paths().iter().any(|root| path.starts_with(root))
    }
}

impl Drop for CacheWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}
