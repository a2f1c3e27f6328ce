//! Static game identifiers: the server-id table and the effect marker
//! tokens the per-file scan keys on.

use phf::phf_map;

/// Server ids as they appear in the detail field of AreaEntered lines.
static SERVER_NAMES: phf::Map<&'static str, &'static str> = phf_map! {
    "he3000" => "Star Forge",
    "he3001" => "Satele Shan",
    "he4000" => "Darth Malgus",
    "he4001" => "Tulak Hord",
    "he4002" => "The Leviathan",
    "HE600" => "PTS",
};

/// Human name for a server id. Unknown ids are not an error; the caller
/// keeps the raw id and leaves the name blank.
pub fn server_name(server_id: &str) -> Option<&'static str> {
    SERVER_NAMES.get(server_id).copied()
}

/// Action-field prefixes.
pub mod action {
    pub const SAFE_LOGIN: &str = "Safe Login";
}

/// Effect-field prefixes.
pub mod effect_type {
    pub const AREA_ENTERED: &str = "AreaEntered";
}

/// Brace-wrapped effect ids searched for in the raw effect field. Matching
/// the token is cheaper than decoding the whole effect and is how the
/// scan classifies damage and heal lines.
pub mod effect_token {
    pub const DAMAGE: &str = "{836045448945501}";
    pub const HEAL: &str = "{836045448945500}";
}
