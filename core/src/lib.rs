pub mod collection;
pub mod combat_log;
pub mod context;
pub mod error;
pub mod events;
pub mod game_data;
pub mod state;

// Re-exports for convenience
pub use collection::{CACHE_FILENAME, CachedLog, Collection, LOG_VERSION, LogCache};
pub use combat_log::{EffectDescriptor, Entity, EntityKey, EntityKind, LogLine, parse_line};
pub use error::{Error, Result};
pub use events::{CollectionSignal, SignalHandler};
pub use state::{AreaList, AreaVisit, LogFile, ParseState, Roster};
