use crate::types::MessageEntity;
use frazeo_core::{emphasize, escape_markdown};

fn marker(kind: &str) -> Option<&'static str> {
    match kind {
        "bold" => Some("*"),
        "italic" => Some("_"),
        "code" => Some("`"),
        "pre" => Some("```"),
        _ => None,
    }
}

/// Rebuild legacy Markdown from a message's plain text and its entities.
///
/// Telegram hands callback messages back with formatting stripped into
/// entities; this is the inverse of sending with `parse_mode = "Markdown"`
/// for the entity kinds legacy Markdown can express. Text outside entities
/// is escaped; entity content goes through [`emphasize`], so a marker
/// character inside a span comes back in the form it was sent. Legacy
/// Markdown cannot nest, so overlapping spans after the first are rendered
/// as plain text. Entity offsets are UTF-16 code units.
pub fn entities_to_markdown(text: &str, entities: &[MessageEntity]) -> String {
    let units: Vec<u16> = text.encode_utf16().collect();
    let mut spans: Vec<(usize, usize, &str)> = entities
        .iter()
        .filter_map(|e| {
            let end = e.offset.checked_add(e.length)?;
            let mark = marker(&e.kind)?;
            (e.length > 0 && end <= units.len()).then_some((e.offset, end, mark))
        })
        .collect();
    spans.sort_by_key(|&(start, end, _)| (start, std::cmp::Reverse(end)));

    let mut out = String::with_capacity(text.len() + spans.len() * 2);
    let mut pos = 0;
    for (start, end, mark) in spans {
        if start < pos {
            continue;
        }
        out.push_str(&escape_markdown(&String::from_utf16_lossy(&units[pos..start])));
        out.push_str(&emphasize(mark, &String::from_utf16_lossy(&units[start..end])));
        pos = end;
    }
    out.push_str(&escape_markdown(&String::from_utf16_lossy(&units[pos..])));
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn utf16_len(s: &str) -> usize {
        s.encode_utf16().count()
    }

    #[test]
    fn test_no_entities_escapes_text() {
        assert_eq!(entities_to_markdown("a_b", &[]), "a\\_b");
        assert_eq!(entities_to_markdown("", &[]), "");
    }

    #[test]
    fn test_bold_after_astral_emoji() {
        // "🔎" and the keycap sequence are several UTF-16 units each.
        let text = "🔎 query\n\n1️⃣ КОТ НАПЛАКАЛ — very_little";
        let q = utf16_len("🔎 ");
        let k = utf16_len("🔎 query\n\n1️⃣ ");
        let entities = vec![
            MessageEntity::new("bold", q, utf16_len("query")),
            MessageEntity::new("bold", k, utf16_len("КОТ НАПЛАКАЛ")),
        ];
        assert_eq!(
            entities_to_markdown(text, &entities),
            "🔎 *query*\n\n1️⃣ *КОТ НАПЛАКАЛ* — very\\_little"
        );
    }

    #[test]
    fn test_marker_inside_bold_restores_sent_text() {
        let sent = format!("🔎 {}", emphasize("*", "q*"));
        assert_eq!(sent, "🔎 *q*\\*");

        // Telegram reports either the whole "q*" or only "q" as bold.
        let q = utf16_len("🔎 ");
        let whole = [MessageEntity::new("bold", q, 2)];
        let split = [MessageEntity::new("bold", q, 1)];
        assert_eq!(entities_to_markdown("🔎 q*", &whole), sent);
        assert_eq!(entities_to_markdown("🔎 q*", &split), sent);
    }

    #[test]
    fn test_bold_keeps_other_specials_literal() {
        let text = "1️⃣ A_B — c_d";
        let entities = [MessageEntity::new("bold", utf16_len("1️⃣ "), 3)];
        assert_eq!(entities_to_markdown(text, &entities), "1️⃣ *A_B* — c\\_d");
    }

    #[test]
    fn test_kinds_and_unknown_entities() {
        let text = "a b c d";
        let entities = vec![
            MessageEntity::new("italic", 0, 1),
            MessageEntity::new("code", 2, 1),
            MessageEntity::new("url", 4, 1),
            MessageEntity::new("pre", 6, 1),
        ];
        assert_eq!(entities_to_markdown(text, &entities), "_a_ `b` c ```d```");
    }

    #[test]
    fn test_overlapping_and_out_of_range_entities() {
        let text = "abcdef";
        let entities = vec![
            MessageEntity::new("bold", 0, 4),
            MessageEntity::new("italic", 2, 3),
            MessageEntity::new("bold", 5, 10),
            MessageEntity::new("bold", 1, 0),
        ];
        assert_eq!(entities_to_markdown(text, &entities), "*abcd*ef");
    }
}
