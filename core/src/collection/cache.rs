use crate::combat_log::Entity;
use crate::error::Error;
use crate::state::{AreaList, LogFile, ParseState, Roster};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;

/// Cache layout revision. Bumped whenever the parsed-attribute set or the
/// line interpretation changes; a stored document with any other version is
/// discarded wholesale, never migrated per entry.
pub const LOG_VERSION: u32 = 3;

/// Cache document name, stored next to the logs it describes.
pub const CACHE_FILENAME: &str = "logDataCache.json";

/// The persisted cache document: `{ "logVersion": 3, "logList": [...] }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogCache {
    pub log_version: u32,
    pub log_list: Vec<CachedLog>,
}

impl Default for LogCache {
    fn default() -> Self {
        Self::new()
    }
}

impl LogCache {
    pub fn new() -> LogCache {
        LogCache {
            log_version: LOG_VERSION,
            log_list: Vec::new(),
        }
    }

    /// Read the document at `path`. A missing file yields the empty cache;
    /// unreadable or corrupt documents propagate to the caller.
    pub async fn load(path: impl AsRef<Path>) -> crate::Result<LogCache> {
        let path = path.as_ref();
        let raw = match tokio::fs::read(path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "no log cache yet, starting empty");
                return Ok(LogCache::new());
            }
            Err(err) => return Err(err.into()),
        };
        serde_json::from_slice(&raw).map_err(|err| Error::cache_format(path, err))
    }

    /// Snapshot every successfully parsed log. Failed and unparsed files
    /// are left out so the next run retries them.
    pub fn snapshot(logs: &[LogFile]) -> LogCache {
        LogCache {
            log_version: LOG_VERSION,
            log_list: logs
                .iter()
                .filter(|log| log.state == ParseState::Parsed)
                .map(CachedLog::from_log)
                .collect(),
        }
    }

    /// Write the document to `path`. Failures propagate; the cache is never
    /// retried automatically.
    pub async fn save(&self, path: impl AsRef<Path>) -> crate::Result<()> {
        let raw = serde_json::to_vec(self).map_err(|err| Error::cache_format(path.as_ref(), err))?;
        tokio::fs::write(path, raw).await?;
        Ok(())
    }

    /// Find the snapshot for an unchanged file. Only consulted when the
    /// stored version matches the running engine; on a mismatch every file
    /// is a fresh parse.
    pub fn lookup(&self, filename: &str, filesize: u64) -> Option<&CachedLog> {
        if self.log_version != LOG_VERSION {
            return None;
        }
        self.log_list
            .iter()
            .find(|cached| cached.filename == filename && cached.filesize == filesize)
    }
}

/// Cacheable attribute snapshot of one parsed log. Transient handles
/// (path, parse state, line counters) stay out of the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedLog {
    pub filename: String,
    pub filesize: u64,
    pub patch: String,
    pub server: String,
    pub server_id: String,
    pub areas: AreaList,
    pub character: Option<Entity>,
    pub players: Roster,
    pub enemies: Roster,
}

impl CachedLog {
    pub fn from_log(log: &LogFile) -> CachedLog {
        CachedLog {
            filename: log.filename.clone(),
            filesize: log.filesize,
            patch: log.patch.clone(),
            server: log.server.clone(),
            server_id: log.server_id.clone(),
            areas: log.areas.clone(),
            character: log.character.clone(),
            players: log.players.clone(),
            enemies: log.enemies.clone(),
        }
    }

    /// Copy the snapshot onto a registry entry in place of a parse pass.
    pub fn apply_to(&self, log: &mut LogFile) {
        log.patch = self.patch.clone();
        log.server = self.server.clone();
        log.server_id = self.server_id.clone();
        log.areas = self.areas.clone();
        log.character = self.character.clone();
        log.players = self.players.clone();
        log.enemies = self.enemies.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat_log::EntityKind;

    fn parsed_log(filename: &str, filesize: u64) -> LogFile {
        let mut log = LogFile::discover(filename.into(), filesize);
        log.state = ParseState::Parsed;
        log.server = "Darth Malgus".to_string();
        log.server_id = "he4000".to_string();
        log.character = Some(Entity {
            kind: EntityKind::Player,
            name: "Hero".to_string(),
            id: 100,
            ..Entity::default()
        });
        log
    }

    #[test]
    fn lookup_requires_matching_identity() {
        let cache = LogCache::snapshot(&[parsed_log("combat_a.txt", 10)]);
        assert!(cache.lookup("combat_a.txt", 10).is_some());
        assert!(cache.lookup("combat_a.txt", 11).is_none());
        assert!(cache.lookup("combat_b.txt", 10).is_none());
    }

    #[test]
    fn version_mismatch_disables_every_lookup() {
        let mut cache = LogCache::snapshot(&[parsed_log("combat_a.txt", 10)]);
        cache.log_version = LOG_VERSION - 1;
        assert!(cache.lookup("combat_a.txt", 10).is_none());
    }

    #[test]
    fn snapshot_skips_unparsed_and_failed_files() {
        let mut failed = parsed_log("combat_bad.txt", 5);
        failed.state = ParseState::Failed;
        let unparsed = LogFile::discover("combat_new.txt".into(), 7);

        let cache = LogCache::snapshot(&[parsed_log("combat_a.txt", 10), failed, unparsed]);
        assert_eq!(cache.log_list.len(), 1);
        assert_eq!(cache.log_list[0].filename, "combat_a.txt");
    }

    #[test]
    fn snapshot_round_trips_onto_a_fresh_entry() {
        let original = parsed_log("combat_a.txt", 10);
        let snapshot = CachedLog::from_log(&original);

        let mut restored = LogFile::discover("combat_a.txt".into(), 10);
        snapshot.apply_to(&mut restored);
        assert_eq!(restored.server, original.server);
        assert_eq!(restored.character, original.character);
    }

    #[test]
    fn document_uses_camel_case_members() {
        let cache = LogCache::snapshot(&[parsed_log("combat_a.txt", 10)]);
        let json = serde_json::to_string(&cache).unwrap();
        assert!(json.contains("\"logVersion\":3"));
        assert!(json.contains("\"logList\""));
        assert!(json.contains("\"serverId\""));
        assert!(json.contains("\"filesize\""));
    }
}
