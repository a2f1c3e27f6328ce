//! Registry and orchestrator for one directory of combat logs.

pub mod cache;

pub use cache::{CACHE_FILENAME, CachedLog, LOG_VERSION, LogCache};

use crate::error::{Error, Result};
use crate::events::{CollectionSignal, SignalHandler};
use crate::state::{LogFile, ParseState};
use hashbrown::HashMap;
use std::path::{Path, PathBuf};

/// Owns every log discovered in one directory and drives parsing.
///
/// Construct one per directory; signal handlers are registered on the
/// instance and there is no process-wide registry. Discovery and cache
/// load are independent, but both must have run before any file's
/// cache-hit check — [`Collection::run`] joins them explicitly.
pub struct Collection {
    dir: PathBuf,
    cache_path: PathBuf,
    logs: Vec<LogFile>,
    by_name: HashMap<String, usize>,
    cache: Option<LogCache>,
    discovered: bool,
    parsed_count: usize,
    cache_dirty: bool,
    handlers: Vec<Box<dyn SignalHandler + Send>>,
}

impl Collection {
    pub fn new(dir: impl Into<PathBuf>) -> Collection {
        let dir = dir.into();
        let cache_path = dir.join(CACHE_FILENAME);
        Collection {
            dir,
            cache_path,
            logs: Vec::new(),
            by_name: HashMap::new(),
            cache: None,
            discovered: false,
            parsed_count: 0,
            cache_dirty: false,
            handlers: Vec::new(),
        }
    }

    /// Register a signal handler to receive lifecycle notifications.
    pub fn add_signal_handler(&mut self, handler: Box<dyn SignalHandler + Send>) {
        self.handlers.push(handler);
    }

    fn emit(&mut self, signal: CollectionSignal) {
        for handler in &mut self.handlers {
            handler.handle_signal(&signal);
        }
    }

    /// Drive the full pipeline: discovery and cache load first (joined —
    /// neither depends on the other, both gate parsing), then every file in
    /// registry order, then a dirty cache is persisted.
    pub async fn run(&mut self, force: bool) -> Result<()> {
        let (found, cache) = tokio::join!(
            discover_logs(self.dir.clone()),
            LogCache::load(self.cache_path.clone()),
        );
        self.register(found?);
        self.install_cache(cache?);
        self.parse_all(force).await
    }

    /// List the directory and register new `combat_*.txt` files. Repeat
    /// calls are idempotent: known filenames are skipped, sizes are not
    /// refreshed.
    pub async fn discover(&mut self) -> Result<usize> {
        let found = discover_logs(self.dir.clone()).await?;
        Ok(self.register(found))
    }

    fn register(&mut self, found: Vec<LogFile>) -> usize {
        for log in found {
            if self.by_name.contains_key(log.filename.as_str()) {
                continue;
            }
            self.by_name.insert(log.filename.clone(), self.logs.len());
            self.logs.push(log);
        }
        self.discovered = true;
        let count = self.logs.len();
        tracing::info!(count, dir = %self.dir.display(), "log discovery complete");
        self.emit(CollectionSignal::AllLogsFound { count });
        count
    }

    /// Read the cache document. Absent is fine; corrupt propagates.
    pub async fn load_cache(&mut self) -> Result<usize> {
        let cache = LogCache::load(self.cache_path.clone()).await?;
        Ok(self.install_cache(cache))
    }

    fn install_cache(&mut self, cache: LogCache) -> usize {
        if !cache.log_list.is_empty() && cache.log_version != LOG_VERSION {
            tracing::warn!(
                found = cache.log_version,
                expected = LOG_VERSION,
                "log cache version mismatch, every file will re-parse"
            );
        }
        let entries = cache.log_list.len();
        self.cache = Some(cache);
        self.emit(CollectionSignal::CacheLoaded { entries });
        entries
    }

    /// Parse every discovered file in registry order, then persist the
    /// cache if anything was freshly parsed this run.
    pub async fn parse_all(&mut self, force: bool) -> Result<()> {
        if !self.ready() {
            return Err(Error::NotReady);
        }
        for idx in 0..self.logs.len() {
            self.parse_at(idx, force);
        }
        if self.cache_dirty {
            self.save_cache().await?;
        }
        Ok(())
    }

    /// Parse one file by name, optionally bypassing its parsed state and
    /// the cache.
    pub fn parse_file(&mut self, filename: &str, force: bool) -> Result<()> {
        if !self.ready() {
            return Err(Error::NotReady);
        }
        let Some(&idx) = self.by_name.get(filename) else {
            return Err(Error::UnknownLog(filename.to_string()));
        };
        self.parse_at(idx, force);
        Ok(())
    }

    fn parse_at(&mut self, idx: usize, force: bool) {
        if self.logs[idx].state == ParseState::Parsed && !force {
            return;
        }
        let first_completion = self.logs[idx].state == ParseState::Unparsed;
        if force {
            self.logs[idx].reset_summary();
        }

        let hit = if force {
            None
        } else {
            let log = &self.logs[idx];
            self.cache
                .as_ref()
                .and_then(|cache| cache.lookup(&log.filename, log.filesize))
                .cloned()
        };

        let log = &mut self.logs[idx];
        if let Some(snapshot) = hit {
            snapshot.apply_to(log);
            log.state = ParseState::Parsed;
            tracing::info!(file = %log.filename, "using cached summary");
        } else {
            match log.parse() {
                Ok(()) => {
                    self.cache_dirty = true;
                    tracing::info!(
                        file = %log.filename,
                        skipped = log.skipped_lines,
                        "parsed"
                    );
                }
                Err(err) => {
                    tracing::error!(file = %log.filename, error = %err, "failed to read log");
                }
            }
        }

        if first_completion {
            self.parsed_count += 1;
        }
        let log = self.logs[idx].clone();
        self.emit(CollectionSignal::LogParsed { log });
        if self.parsed_count == self.logs.len() {
            self.emit(CollectionSignal::AllLogsParsed);
        }
    }

    /// Snapshot every parsed file and rewrite the cache document.
    pub async fn save_cache(&mut self) -> Result<()> {
        let cache = LogCache::snapshot(&self.logs);
        cache.save(&self.cache_path).await?;
        self.cache_dirty = false;
        tracing::info!(
            entries = cache.log_list.len(),
            path = %self.cache_path.display(),
            "log cache saved"
        );
        self.emit(CollectionSignal::CacheSaved);
        Ok(())
    }

    /// Both preconditions for cache-hit checks.
    fn ready(&self) -> bool {
        self.discovered && self.cache.is_some()
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn logs(&self) -> &[LogFile] {
        &self.logs
    }

    pub fn log(&self, filename: &str) -> Option<&LogFile> {
        self.by_name.get(filename).map(|&idx| &self.logs[idx])
    }

    pub fn len(&self) -> usize {
        self.logs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.logs.is_empty()
    }

    pub fn parsed_count(&self) -> usize {
        self.parsed_count
    }

    pub fn cache_dirty(&self) -> bool {
        self.cache_dirty
    }
}

/// List `dir` and build registry stubs for every `combat_*.txt` file,
/// capturing byte sizes now. Directory-listing order is registry order.
async fn discover_logs(dir: PathBuf) -> Result<Vec<LogFile>> {
    let mut entries = tokio::fs::read_dir(&dir).await?;
    let mut found = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if !name.starts_with("combat_") || !name.ends_with(".txt") {
            continue;
        }
        let metadata = entry.metadata().await?;
        if !metadata.is_file() {
            continue;
        }
        found.push(LogFile::discover(entry.path(), metadata.len()));
    }
    Ok(found)
}
