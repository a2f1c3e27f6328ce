use super::entity::IdToken;

/// Decoded effect field: what happened, to what, and under which qualifier.
///
/// `AreaEntered {...}: Dromund Kaas {...}` ids both the event kind and the
/// destination; an instanced area carries its difficulty as a trailing
/// modifier token on the same field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EffectDescriptor {
    pub effect_type: String,
    pub type_id: i64,
    pub specific: String,
    pub specific_id: i64,
    pub modifier: Option<String>,
    pub modifier_id: Option<i64>,
}

impl EffectDescriptor {
    /// Split on the first `": "` and decode both halves as id tokens. A
    /// remainder on the specific token decodes once more as the modifier.
    pub fn decode(field: &str) -> EffectDescriptor {
        let (type_part, specific_part) = match field.split_once(": ") {
            Some((type_part, specific_part)) => (type_part, Some(specific_part)),
            None => (field, None),
        };

        let type_token = IdToken::parse(type_part);
        let mut descriptor = EffectDescriptor {
            effect_type: type_token.name.to_string(),
            type_id: type_token.id,
            ..EffectDescriptor::default()
        };

        if let Some(specific) = specific_part {
            let specific_token = IdToken::parse(specific);
            descriptor.specific = specific_token.name.to_string();
            descriptor.specific_id = specific_token.id;

            if let Some(remainder) = specific_token.remainder {
                let modifier_token = IdToken::parse(remainder.trim_start());
                descriptor.modifier = Some(modifier_token.name.to_string());
                descriptor.modifier_id = Some(modifier_token.id);
            }
        }
        descriptor
    }
}
