use crate::combat_log::{self, Entity, EffectDescriptor, LogLine};
use crate::game_data::{self, action, effect_token, effect_type};
use crate::state::{AreaList, AreaVisit, Roster};
use chrono::NaiveDateTime;
use encoding_rs::WINDOWS_1252;
use memchr::{memchr_iter, memmem};
use memmap2::Mmap;
use std::fs::File;
use std::path::PathBuf;

/// Parse lifecycle of one log file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseState {
    #[default]
    Unparsed,
    Parsing,
    Parsed,
    /// Open or read failure. Terminal: the file still counts toward
    /// collection completion, but is excluded from the saved cache so the
    /// next run retries it.
    Failed,
}

/// One discovered combat log and everything extracted from it.
///
/// Filename and byte size are captured at discovery time and form the
/// file's cache identity: a rewritten file no longer matches its cached
/// snapshot. The summary fields are mutated only by this file's own parse
/// pass and are stable afterwards unless a re-parse is forced.
#[derive(Debug, Clone, Default)]
pub struct LogFile {
    pub filename: String,
    pub path: PathBuf,
    pub filesize: u64,
    pub state: ParseState,
    /// Session start, from the `combat_YYYY-MM-DD_…` filename.
    pub session_date: Option<NaiveDateTime>,

    /// Game version recorded by the first area transition.
    pub patch: String,
    pub server: String,
    pub server_id: String,
    pub areas: AreaList,
    /// The character this log belongs to, from the Safe Login line.
    pub character: Option<Entity>,
    /// Allied players (and companions) seen dealing damage or heals.
    pub players: Roster,
    /// Everything that traded damage with the owning character.
    pub enemies: Roster,

    /// Lines that failed the grammar. Informational only.
    pub skipped_lines: u64,
}

impl LogFile {
    /// Register a file found on disk, capturing its identity now.
    pub fn discover(path: PathBuf, filesize: u64) -> LogFile {
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let session_date = parse_log_timestamp(&filename);
        LogFile {
            filename,
            path,
            filesize,
            session_date,
            ..LogFile::default()
        }
    }

    /// Run the forward pass over the file's lines.
    ///
    /// The mapping is dropped on every exit path, success or failure; a
    /// failure marks the file [`ParseState::Failed`] and is returned to the
    /// caller, which records it without aborting the collection.
    pub fn parse(&mut self) -> crate::Result<()> {
        self.state = ParseState::Parsing;
        match self.run_pass() {
            Ok(()) => {
                self.state = ParseState::Parsed;
                Ok(())
            }
            Err(err) => {
                self.state = ParseState::Failed;
                Err(err)
            }
        }
    }

    fn run_pass(&mut self) -> crate::Result<()> {
        let file = File::open(&self.path)?;
        let mmap = unsafe { Mmap::map(&file)? };
        let bytes = mmap.as_ref();

        let mut start = 0;
        for end in memchr_iter(b'\n', bytes) {
            if end > start {
                self.scan_raw(&bytes[start..end]);
            }
            start = end + 1;
        }
        if start < bytes.len() {
            self.scan_raw(&bytes[start..]);
        }
        Ok(())
    }

    fn scan_raw(&mut self, raw: &[u8]) {
        let (line, _, _) = WINDOWS_1252.decode(raw);
        match combat_log::parse_line(&line) {
            Some(line) => self.scan_line(&line),
            None => {
                self.skipped_lines += 1;
                tracing::debug!(file = %self.filename, line = %line, "unparsable line");
            }
        }
    }

    /// Feed one decoded line through the trigger conditions. Lines matching
    /// none of them are ignored.
    pub fn scan_line(&mut self, line: &LogLine<'_>) {
        if line.action.starts_with(action::SAFE_LOGIN) && self.character.is_none() {
            // First login wins; later logins in the same file are ignored.
            self.character = Some(Entity::decode(line.subject, true));
        } else if line.effect.starts_with(effect_type::AREA_ENTERED) {
            self.enter_area(line);
        } else if contains_token(line.effect, effect_token::DAMAGE) {
            self.record_damage(line);
        } else if contains_token(line.effect, effect_token::HEAL) {
            self.record_heal(line);
        }
    }

    fn enter_area(&mut self, line: &LogLine<'_>) {
        if self.server_id.is_empty()
            && let Some(server_id) = line.detail1
        {
            self.server_id = server_id.to_string();
            self.server = game_data::server_name(server_id)
                .unwrap_or_default()
                .to_string();
        }
        if self.patch.is_empty()
            && let Some(patch) = line.detail2
        {
            self.patch = patch.to_string();
        }

        let effect = EffectDescriptor::decode(line.effect);
        self.areas.merge(AreaVisit {
            area: effect.specific,
            area_id: effect.specific_id,
            mode: effect.modifier,
            mode_id: effect.modifier_id,
        });
    }

    fn record_damage(&mut self, line: &LogLine<'_>) {
        let subject = Entity::decode(line.subject, false);
        let object = Entity::decode(line.object, false);

        // Whichever side is the owning character, the other side is an
        // enemy. A `=` object has no identity and inserts nothing.
        if let Some(owner) = self.character.as_ref().and_then(Entity::unique) {
            if subject.unique() == Some(owner) {
                self.enemies.insert(object.clone());
            } else if object.unique() == Some(owner) {
                self.enemies.insert(subject.clone());
            }
        }

        self.record_ally(subject);
        self.record_ally(object);
    }

    fn record_heal(&mut self, line: &LogLine<'_>) {
        self.record_ally(Entity::decode(line.subject, false));
        self.record_ally(Entity::decode(line.object, false));
    }

    /// Any player-controlled entity other than the owning character joins
    /// the ally roster.
    fn record_ally(&mut self, entity: Entity) {
        let owner = self.character.as_ref().and_then(Entity::unique);
        if entity.is_pc() && entity.unique() != owner {
            self.players.insert(entity);
        }
    }

    /// Drop the accumulated summary ahead of a forced re-parse. Identity
    /// fields (path, filename, size, date) are kept.
    pub fn reset_summary(&mut self) {
        self.patch.clear();
        self.server.clear();
        self.server_id.clear();
        self.areas.clear();
        self.character = None;
        self.players.clear();
        self.enemies.clear();
        self.skipped_lines = 0;
    }
}

fn parse_log_timestamp(filename: &str) -> Option<NaiveDateTime> {
    let stem = filename.strip_suffix(".txt")?.strip_prefix("combat_")?;
    NaiveDateTime::parse_from_str(stem, "%Y-%m-%d_%H_%M_%S_%f").ok()
}

fn contains_token(effect: &str, token: &str) -> bool {
    memmem::find(effect.as_bytes(), token.as_bytes()).is_some()
}
