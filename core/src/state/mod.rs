pub mod area;
pub mod log_file;
pub mod roster;

pub use area::{AreaList, AreaVisit};
pub use log_file::{LogFile, ParseState};
pub use roster::Roster;
