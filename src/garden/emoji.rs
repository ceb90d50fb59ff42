//! Decoration catalog generated from Unicode `emoji-test.txt` data.
//!
//! Each fully-qualified line becomes one [`DecorationDef`]. Costs rise with
//! the entry's position so the long tail of the table stays aspirational.
//! The transform runs once at load time; the result is immutable.

use anyhow::{anyhow, Result};
use log::{debug, info};
use tokio::fs;

use super::catalog::DecorationDef;

/// Cost curve for generated decorations: `base + index * step`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmojiCostCurve {
    pub base: u64,
    pub step: u64,
}

impl Default for EmojiCostCurve {
    fn default() -> Self {
        Self { base: 10, step: 5 }
    }
}

impl EmojiCostCurve {
    pub fn cost_at(&self, index: usize) -> u64 {
        self.base.saturating_add(self.step.saturating_mul(index as u64))
    }
}

/// Parse the text of an `emoji-test.txt` file.
///
/// Lines look like
/// `1F468 200D 1F33E ; fully-qualified # 👨‍🌾 E4.0 man farmer`.
/// Comments, group headers and non fully-qualified entries are ignored.
pub fn parse_emoji_test(text: &str, curve: EmojiCostCurve) -> Vec<DecorationDef> {
    let mut out = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((codes, rest)) = line.split_once(';') else {
            continue;
        };
        let (status, comment) = match rest.split_once('#') {
            Some((status, comment)) => (status.trim(), comment.trim()),
            None => (rest.trim(), ""),
        };
        if status != "fully-qualified" {
            continue;
        }
        let Some(glyph) = glyph_from_codepoints(codes) else {
            debug!("skipping emoji line with bad codepoints: {}", codes.trim());
            continue;
        };
        let id = id_from_codepoints(codes);
        let name = name_from_comment(comment).unwrap_or_else(|| codepoint_label(codes));
        out.push(DecorationDef {
            id,
            glyph,
            name,
            cost: curve.cost_at(out.len()),
        });
    }
    out
}

/// Read and parse an `emoji-test.txt` file from disk.
pub async fn load_emoji_catalog(path: &str, curve: EmojiCostCurve) -> Result<Vec<DecorationDef>> {
    let text = fs::read_to_string(path)
        .await
        .map_err(|e| anyhow!("Failed to read emoji data {}: {}", path, e))?;
    let decorations = parse_emoji_test(&text, curve);
    if decorations.is_empty() {
        return Err(anyhow!("Emoji data {} contained no fully-qualified entries", path));
    }
    info!("Loaded {} decorations from {}", decorations.len(), path);
    Ok(decorations)
}

fn glyph_from_codepoints(codes: &str) -> Option<String> {
    let mut glyph = String::new();
    for hex in codes.split_whitespace() {
        let value = u32::from_str_radix(hex, 16).ok()?;
        glyph.push(char::from_u32(value)?);
    }
    if glyph.is_empty() {
        None
    } else {
        Some(glyph)
    }
}

fn id_from_codepoints(codes: &str) -> String {
    let joined = codes
        .split_whitespace()
        .map(|c| c.to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join("-");
    format!("emoji-{}", joined)
}

fn codepoint_label(codes: &str) -> String {
    codes
        .split_whitespace()
        .map(|c| format!("U+{}", c.to_ascii_uppercase()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// The comment is `<glyph> E<version> <name>`; keep only the name.
fn name_from_comment(comment: &str) -> Option<String> {
    let mut parts = comment.split_whitespace();
    parts.next()?;
    let version = parts.next()?;
    if !version.starts_with('E') {
        return None;
    }
    let name: Vec<&str> = parts.collect();
    if name.is_empty() {
        return None;
    }
    let name = name.join(" ");
    let mut chars = name.chars();
    chars
        .next()
        .map(|first| first.to_uppercase().collect::<String>() + chars.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# group: Smileys & Emotion
1F600                                                  ; fully-qualified     # 😀 E1.0 grinning face
263A FE0F                                              ; fully-qualified     # ☺️ E0.6 smiling face
263A                                                   ; unqualified         # ☺ E0.6 smiling face

# group: People & Body
1F468 200D 1F33E                                       ; fully-qualified     # 👨‍🌾 E4.0 man farmer
1F96C                                                  ; fully-qualified
";

    #[test]
    fn parses_fully_qualified_only() {
        let decorations = parse_emoji_test(SAMPLE, EmojiCostCurve::default());
        let ids: Vec<_> = decorations.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["emoji-1f600", "emoji-263a-fe0f", "emoji-1f468-200d-1f33e", "emoji-1f96c"]
        );
    }

    #[test]
    fn names_and_glyphs() {
        let decorations = parse_emoji_test(SAMPLE, EmojiCostCurve::default());
        assert_eq!(decorations[0].glyph, "😀");
        assert_eq!(decorations[0].name, "Grinning face");
        assert_eq!(decorations[2].glyph, "\u{1F468}\u{200D}\u{1F33E}");
        assert_eq!(decorations[2].name, "Man farmer");
        // No comment: fall back to the codepoints
        assert_eq!(decorations[3].name, "U+1F96C");
    }

    #[test]
    fn costs_increase_with_position() {
        let curve = EmojiCostCurve { base: 10, step: 5 };
        let decorations = parse_emoji_test(SAMPLE, curve);
        let costs: Vec<_> = decorations.iter().map(|d| d.cost).collect();
        assert_eq!(costs, vec![10, 15, 20, 25]);
    }

    #[test]
    fn bad_codepoints_are_skipped() {
        let text = "ZZZZ ; fully-qualified # ? E1.0 nonsense\n1F955 ; fully-qualified # 🥕 E3.0 carrot\n";
        let decorations = parse_emoji_test(text, EmojiCostCurve::default());
        assert_eq!(decorations.len(), 1);
        assert_eq!(decorations[0].name, "Carrot");
        assert_eq!(decorations[0].cost, 10);
    }
}
