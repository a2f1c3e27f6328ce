use super::{parse_f32, parse_i64};
use memchr::memchr;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What kind of actor a subject/object field referred to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EntityKind {
    Player,
    Companion,
    Npc,
    /// The literal `=`: "same as the line's subject". Carries no identity;
    /// callers resolve it against the subject where it matters.
    SelfReference,
    #[default]
    Empty,
}

/// Identity key used to compare entities across lines and files.
///
/// Companions key on owner and companion class together; spawn instance
/// ids are deliberately excluded, so two instances of the same companion
/// under the same owner compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKey {
    Player(i64),
    Npc(i64),
    Companion { owner: i64, companion: i64 },
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKey::Player(id) | EntityKey::Npc(id) => write!(f, "{id}"),
            EntityKey::Companion { owner, companion } => write!(f, "{owner}:{companion}"),
        }
    }
}

/// `(x,y,z,r)` world position, present on detailed entity fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub r: f32,
}

impl Position {
    fn decode(segment: &str) -> Option<Position> {
        let inner = segment.strip_prefix('(')?.strip_suffix(')')?;
        let mut parts = inner.splitn(4, ',');
        let mut next = || parse_f32(parts.next().unwrap_or_default());
        Some(Position {
            x: next(),
            y: next(),
            z: next(),
            r: next(),
        })
    }
}

/// `(current/max)` health, present on detailed entity fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub current: i64,
    pub max: i64,
}

impl Health {
    fn decode(segment: &str) -> Option<Health> {
        let inner = segment.strip_prefix('(')?.strip_suffix(')')?;
        let (current, max) = inner.split_once('/')?;
        Some(Health {
            current: parse_i64(current),
            max: parse_i64(max),
        })
    }
}

/// A parsed actor reference: player, companion, or NPC.
///
/// Entities are plain values, re-derived every time a field is decoded.
/// Identity comparison goes through [`Entity::unique`], never through the
/// display name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub kind: EntityKind,
    pub name: String,
    pub id: i64,
    /// Companion only: the owning player's name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_name: Option<String>,
    /// Companion only: the owning player's id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<i64>,
    /// Spawn instance id. Recorded, but never part of the identity key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health: Option<Health>,
}

impl Entity {
    /// Decode a subject/object field.
    ///
    /// The field is up to three `|`-separated segments: identity, position,
    /// health. Position and health are decoded only when `include_details`
    /// is set; most callers only need the identity.
    pub fn decode(field: &str, include_details: bool) -> Entity {
        if field == "=" {
            return Entity {
                kind: EntityKind::SelfReference,
                ..Entity::default()
            };
        }

        let mut segments = field.splitn(3, '|');
        let identity = segments.next().unwrap_or_default();
        let position = segments.next();
        let health = segments.next();

        let mut entity = if let Some(player) = identity.strip_prefix('@') {
            decode_player(player)
        } else if identity.is_empty() {
            Entity::default()
        } else {
            decode_npc(identity)
        };

        if include_details {
            entity.position = position.and_then(Position::decode);
            entity.health = health.and_then(Health::decode);
        }
        entity
    }

    /// The key this entity dedups under, if it has an identity at all.
    /// Self-references and empty fields have none.
    pub fn unique(&self) -> Option<EntityKey> {
        match self.kind {
            EntityKind::Player => Some(EntityKey::Player(self.id)),
            EntityKind::Npc => Some(EntityKey::Npc(self.id)),
            EntityKind::Companion => Some(EntityKey::Companion {
                owner: self.owner_id.unwrap_or_default(),
                companion: self.id,
            }),
            EntityKind::SelfReference | EntityKind::Empty => None,
        }
    }

    /// Players and their companions both count as player-controlled.
    pub fn is_pc(&self) -> bool {
        matches!(self.kind, EntityKind::Player | EntityKind::Companion)
    }

    pub fn is_self_reference(&self) -> bool {
        self.kind == EntityKind::SelfReference
    }
}

/// `@Name#id`, optionally `/Companion {id}:instance` after the character.
fn decode_player(identity: &str) -> Entity {
    let (character, companion) = match identity.split_once('/') {
        Some((character, companion)) => (character, Some(companion)),
        None => (identity, None),
    };
    let (name, id) = match character.split_once('#') {
        Some((name, id)) => (name, parse_i64(id)),
        None => (character, 0),
    };

    match companion {
        Some(token) => {
            let token = IdToken::parse(token);
            Entity {
                kind: EntityKind::Companion,
                name: token.name.to_string(),
                id: token.id,
                owner_name: Some(name.to_string()),
                owner_id: Some(id),
                instance_id: token.instance_id,
                ..Entity::default()
            }
        }
        None => Entity {
            kind: EntityKind::Player,
            name: name.to_string(),
            id,
            ..Entity::default()
        },
    }
}

fn decode_npc(identity: &str) -> Entity {
    let token = IdToken::parse(identity);
    Entity {
        kind: EntityKind::Npc,
        name: token.name.to_string(),
        id: token.id,
        instance_id: token.instance_id,
        ..Entity::default()
    }
}

/// One `Name {id}` token, the shared building block of NPC identities,
/// companion identities, and effect fields.
///
/// Whatever follows the closing brace is either a `:instanceId` suffix
/// (only when no space follows it) or an opaque remainder handed back to
/// the caller — the effect resolver decodes remainders as modifier tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdToken<'a> {
    pub name: &'a str,
    pub id: i64,
    pub instance_id: Option<i64>,
    pub remainder: Option<&'a str>,
}

impl<'a> IdToken<'a> {
    pub fn parse(token: &'a str) -> IdToken<'a> {
        let bytes = token.as_bytes();
        let Some(open) = memchr(b'{', bytes) else {
            return IdToken {
                name: token,
                ..IdToken::default()
            };
        };
        let close = memchr(b'}', &bytes[open..])
            .map(|offset| open + offset)
            .unwrap_or(bytes.len());

        let name = token[..open].strip_suffix(' ').unwrap_or(&token[..open]);
        let id = parse_i64(&token[open + 1..close]);

        let mut parsed = IdToken {
            name,
            id,
            ..IdToken::default()
        };
        if close + 1 < token.len() {
            let tail = &token[close + 1..];
            match tail.strip_prefix(':') {
                Some(instance) if !instance.contains(' ') => {
                    parsed.instance_id = Some(parse_i64(instance));
                }
                _ => parsed.remainder = Some(tail),
            }
        }
        parsed
    }
}
