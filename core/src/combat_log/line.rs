use memchr::{memchr, memrchr};

/// Borrowed view over one raw log line.
///
/// The five bracketed fields are mandatory; a line missing any of them is
/// not well formed. The trailing detail groups are optional and their
/// meaning depends on the effect (server id and patch for area
/// transitions, value and threat for combat events).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine<'a> {
    pub timestamp: &'a str,
    pub subject: &'a str,
    pub object: &'a str,
    pub action: &'a str,
    pub effect: &'a str,
    pub detail1: Option<&'a str>,
    pub detail2: Option<&'a str>,
}

/// Split one line into its positional fields, or `None` when the line does
/// not match the grammar. Bracket contents never contain `]`, so each field
/// ends at the first closing bracket.
pub fn parse_line(raw: &str) -> Option<LogLine<'_>> {
    let raw = raw.strip_suffix('\r').unwrap_or(raw);

    let (timestamp, rest) = take_bracketed(raw)?;
    let (subject, rest) = take_bracketed(rest.strip_prefix(' ')?)?;
    let (object, rest) = take_bracketed(rest.strip_prefix(' ')?)?;
    let (action, rest) = take_bracketed(rest.strip_prefix(' ')?)?;
    let (effect, rest) = take_bracketed(rest.strip_prefix(' ')?)?;

    let (detail1, rest) = take_group(rest, " (", b')');
    let (detail2, _) = take_group(rest, " <", b'>');

    Some(LogLine {
        timestamp,
        subject,
        object,
        action,
        effect,
        detail1,
        detail2,
    })
}

fn take_bracketed(input: &str) -> Option<(&str, &str)> {
    let rest = input.strip_prefix('[')?;
    let end = memchr(b']', rest.as_bytes())?;
    Some((&rest[..end], &rest[end + 1..]))
}

/// Optional trailing group: `opener` through the last `closer` before any
/// `]`. The value itself may nest the closer, so the scan is greedy.
fn take_group<'a>(input: &'a str, opener: &str, closer: u8) -> (Option<&'a str>, &'a str) {
    let Some(tail) = input.strip_prefix(opener) else {
        return (None, input);
    };
    let bytes = tail.as_bytes();
    let limit = memchr(b']', bytes).unwrap_or(bytes.len());
    match memrchr(closer, &bytes[..limit]) {
        Some(end) => (Some(&tail[..end]), &tail[end + 1..]),
        None => (None, input),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAMAGE_LINE: &str = "[19:58:02.100] [@Hero#100] [Bantha {200}:123] [Strike {400}] \
         [ApplyEffect {836045448945477}: Damage {836045448945501}] (100 kinetic {836045448940873}) <100>";

    #[test]
    fn splits_all_fields() {
        let line = parse_line(DAMAGE_LINE).unwrap();
        assert_eq!(line.timestamp, "19:58:02.100");
        assert_eq!(line.subject, "@Hero#100");
        assert_eq!(line.object, "Bantha {200}:123");
        assert_eq!(line.action, "Strike {400}");
        assert_eq!(
            line.effect,
            "ApplyEffect {836045448945477}: Damage {836045448945501}"
        );
        assert_eq!(line.detail1, Some("100 kinetic {836045448940873}"));
        assert_eq!(line.detail2, Some("100"));
    }

    #[test]
    fn details_are_optional() {
        let line = parse_line("[10:00:00.000] [@A#1] [=] [Safe Login {1}] []").unwrap();
        assert_eq!(line.effect, "");
        assert_eq!(line.detail1, None);
        assert_eq!(line.detail2, None);
    }

    #[test]
    fn area_line_carries_server_and_patch() {
        let line = parse_line(
            "[10:00:01.000] [@A#1] [=] [] [AreaEntered {2}: Coruscant {3}] (he4000) <7.0.0a>",
        )
        .unwrap();
        assert_eq!(line.detail1, Some("he4000"));
        assert_eq!(line.detail2, Some("7.0.0a"));
    }

    #[test]
    fn nested_parens_in_detail1() {
        let line = parse_line(
            "[10:00:02.000] [@A#1] [B {9}] [Hit {8}] [ApplyEffect {7}: Damage {6}] \
             (1000 energy {5} (500 absorbed {4})) <1200>",
        )
        .unwrap();
        assert_eq!(line.detail1, Some("1000 energy {5} (500 absorbed {4})"));
        assert_eq!(line.detail2, Some("1200"));
    }

    #[test]
    fn malformed_lines_are_rejected() {
        assert!(parse_line("").is_none());
        assert!(parse_line("not a log line").is_none());
        assert!(parse_line("[10:00:00.000] [@A#1] [=] [Strike {1}]").is_none());
        assert!(parse_line("[10:00:00.000] unbracketed").is_none());
    }

    #[test]
    fn crlf_terminator_is_tolerated() {
        let line = parse_line("[10:00:00.000] [@A#1] [=] [Login {1}] []\r").unwrap();
        assert_eq!(line.effect, "");
    }

    #[test]
    fn bracket_fields_round_trip() {
        let line = parse_line(DAMAGE_LINE).unwrap();
        let rebuilt = format!(
            "[{}] [{}] [{}] [{}] [{}]",
            line.timestamp, line.subject, line.object, line.action, line.effect
        );
        assert!(DAMAGE_LINE.starts_with(&rebuilt));
    }
}
