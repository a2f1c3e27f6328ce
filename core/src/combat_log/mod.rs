//! Combat log line grammar and field resolvers.
//!
//! One log line is five bracketed fields, optionally followed by a
//! parenthesized value and an angle-bracketed value:
//!
//! ```text
//! [19:58:02.100] [@Hero#100] [Bantha {200}:123] [Strike {400}] [ApplyEffect {...}: Damage {836045448945501}] (100 kinetic {...}) <100>
//! ```
//!
//! Fields decode independently: [`parse_line`] only splits the brackets,
//! [`Entity::decode`] and [`EffectDescriptor::decode`] interpret the
//! subject/object and effect fields on demand.

mod effect;
mod entity;
mod line;

pub use effect::EffectDescriptor;
pub use entity::{Entity, EntityKey, EntityKind, Health, IdToken, Position};
pub use line::{LogLine, parse_line};

pub(crate) fn parse_i64(s: &str) -> i64 {
    s.parse::<i64>().unwrap_or_default()
}

pub(crate) fn parse_f32(s: &str) -> f32 {
    s.parse::<f32>().unwrap_or_default()
}
