use crate::state::LogFile;

/// Lifecycle notifications emitted while a collection works through its
/// directory. Hosts subscribe to decide when to render; the engine never
/// blocks on them.
#[derive(Debug, Clone)]
pub enum CollectionSignal {
    /// Discovery finished; the registry holds `count` files.
    AllLogsFound { count: usize },
    /// The cache document was read (or found absent).
    CacheLoaded { entries: usize },
    /// One file reached a terminal state, whether from the cache, a fresh
    /// pass, or a read failure.
    LogParsed { log: LogFile },
    /// Every discovered file has reached a terminal state.
    AllLogsParsed,
    /// The cache document was rewritten.
    CacheSaved,
}
