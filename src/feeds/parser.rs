//! Tag-based RSS item extraction.
//!
//! Not an XML parser: it locates `<item>…</item>` regions and, inside each,
//! the first open/close pair for every field it cares about. That is enough
//! for the feeds proxies hand back, including ones that are not well-formed.

use chrono::{DateTime, Utc};

use super::FeedItem;
use crate::config::FeedSourceConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseLimits {
    pub max_items: usize,
    /// Maximum description length in characters.
    pub description_limit: usize,
}

impl Default for ParseLimits {
    fn default() -> Self {
        Self {
            max_items: 10,
            description_limit: 200,
        }
    }
}

/// Parse up to `limits.max_items` items out of a feed body.
pub fn parse_items(
    body: &str,
    source: &FeedSourceConfig,
    fetched_at: DateTime<Utc>,
    limits: ParseLimits,
) -> Vec<FeedItem> {
    item_regions(body)
        .into_iter()
        .take(limits.max_items)
        .enumerate()
        .map(|(index, fragment)| {
            let title = field_text(fragment, "title")
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "Untitled".to_string());
            let description: String = field_text(fragment, "description")
                .unwrap_or_default()
                .chars()
                .take(limits.description_limit)
                .collect();
            let link = field_text(fragment, "link").unwrap_or_default();
            let published = field_text(fragment, "pubDate")
                .and_then(|d| parse_date(&d))
                .unwrap_or(fetched_at);
            let category = field_text(fragment, "category")
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| source.category.clone());
            let id = if link.is_empty() {
                format!("{}-{}", source.id, index)
            } else {
                link.clone()
            };
            FeedItem {
                id,
                title,
                description,
                link,
                published,
                source: source.name.clone(),
                category,
            }
        })
        .collect()
}

/// Bodies of every `<item>` element, in document order.
fn item_regions(body: &str) -> Vec<&str> {
    let mut regions = Vec::new();
    let mut rest = body;
    while let Some((inner, after)) = next_element(rest, "item") {
        regions.push(inner);
        rest = after;
    }
    regions
}

/// Find the first `<tag ...>inner</tag>` in `s`. Returns the inner text and
/// the remainder after the closing tag. A self-closing `<tag/>` yields an
/// empty inner text.
fn next_element<'a>(s: &'a str, tag: &str) -> Option<(&'a str, &'a str)> {
    let open = format!("<{}", tag);
    let close = format!("</{}>", tag);
    let mut search_from = 0;
    loop {
        let start = search_from + s[search_from..].find(&open)?;
        let after_name = start + open.len();
        // Reject longer tag names sharing the prefix (<items>, <titleFoo>)
        match s[after_name..].chars().next() {
            Some('>') | Some('/') => {}
            Some(c) if c.is_whitespace() => {}
            _ => {
                search_from = after_name;
                continue;
            }
        }
        let open_end = after_name + s[after_name..].find('>')?;
        if s[..open_end].ends_with('/') {
            return Some(("", &s[open_end + 1..]));
        }
        let content_start = open_end + 1;
        let content_len = s[content_start..].find(&close)?;
        let inner = &s[content_start..content_start + content_len];
        return Some((inner, &s[content_start + content_len + close.len()..]));
    }
}

fn field_text(fragment: &str, tag: &str) -> Option<String> {
    next_element(fragment, tag).map(|(inner, _)| clean_text(inner))
}

/// CDATA unwrap, strip markup, decode entities, collapse whitespace.
/// Decoding runs last so escaped brackets come out as literal text.
fn clean_text(raw: &str) -> String {
    let unwrapped = unwrap_cdata(raw);
    let stripped = strip_markup(&unwrapped);
    let decoded = decode_entities(&stripped);
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn unwrap_cdata(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("<![CDATA[") {
        out.push_str(&rest[..start]);
        let inner_start = start + "<![CDATA[".len();
        match rest[inner_start..].find("]]>") {
            Some(end) => {
                out.push_str(&rest[inner_start..inner_start + end]);
                rest = &rest[inner_start + end + 3..];
            }
            None => {
                out.push_str(&rest[inner_start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// Remove `<...>` markup. Only sequences that look like tags are removed:
/// `<` followed by a letter, `/`, `!` or `?` and later closed by `>`. A lone
/// `<` such as in "i <3 kale" is kept.
pub fn strip_markup(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(lt) = rest.find('<') {
        out.push_str(&rest[..lt]);
        let after = &rest[lt + 1..];
        let looks_like_tag = after
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || matches!(c, '/' | '!' | '?'));
        match (looks_like_tag, after.find('>')) {
            (true, Some(gt)) => rest = &after[gt + 1..],
            _ => {
                out.push('<');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

const ENTITIES: [(&str, char); 6] = [
    ("&amp;", '&'),
    ("&lt;", '<'),
    ("&gt;", '>'),
    ("&quot;", '"'),
    ("&#39;", '\''),
    ("&apos;", '\''),
];

/// Decode the fixed set of named entities in a single pass, so `&amp;lt;`
/// becomes `&lt;` and not `<`. Anything else starting with `&` is kept.
pub fn decode_entities(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        match ENTITIES.iter().find(|(name, _)| tail.starts_with(name)) {
            Some((name, ch)) => {
                out.push(*ch);
                rest = &tail[name.len()..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(s)
        .or_else(|_| DateTime::parse_from_rfc3339(s))
        .map(|d| d.with_timezone(&Utc))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> FeedSourceConfig {
        FeedSourceConfig {
            id: "veg".to_string(),
            name: "Veg Weekly".to_string(),
            url: "https://veg.example/rss".to_string(),
            category: "vegetables".to_string(),
            enabled: true,
        }
    }

    fn fetched_at() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-05-01T08:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn decodes_entities() {
        assert_eq!(decode_entities("Cats &amp; Dogs"), "Cats & Dogs");
        assert_eq!(
            decode_entities("&lt;&gt;&quot;&#39;&apos;"),
            "<>\"''"
        );
        assert_eq!(decode_entities("&amp;lt; &nbsp; &"), "&lt; &nbsp; &");
    }

    #[test]
    fn strips_markup() {
        assert_eq!(strip_markup("<b>Hi</b> there"), "Hi there");
        assert_eq!(strip_markup("i <3 kale"), "i <3 kale");
        assert_eq!(strip_markup("<img src=\"x.png\"/>caption"), "caption");
    }

    #[test]
    fn parses_full_item() {
        let body = r#"<rss><channel><title>Veg</title>
            <item>
              <title>Kale &amp; Chard</title>
              <description><![CDATA[<p>Leafy <b>greens</b> are back</p>]]></description>
              <link>https://veg.example/kale</link>
              <pubDate>Tue, 29 Apr 2025 10:30:00 GMT</pubDate>
              <category>greens</category>
            </item>
        </channel></rss>"#;
        let items = parse_items(body, &source(), fetched_at(), ParseLimits::default());
        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert_eq!(item.title, "Kale & Chard");
        assert_eq!(item.description, "Leafy greens are back");
        assert_eq!(item.link, "https://veg.example/kale");
        assert_eq!(item.id, "https://veg.example/kale");
        assert_eq!(item.published.to_rfc3339(), "2025-04-29T10:30:00+00:00");
        assert_eq!(item.category, "greens");
        assert_eq!(item.source, "Veg Weekly");
    }

    #[test]
    fn escaped_brackets_stay_literal() {
        assert_eq!(clean_text("x &lt;y and z&gt; w"), "x <y and z> w");

        let body = "<item><title>Use &lt;b&gt; for bold</title>\
            <description><![CDATA[<p>if a &lt; b and c &gt; d</p>]]></description></item>";
        let items = parse_items(body, &source(), fetched_at(), ParseLimits::default());
        assert_eq!(items[0].title, "Use <b> for bold");
        assert_eq!(items[0].description, "if a < b and c > d");
    }

    #[test]
    fn missing_fields_fall_back() {
        let body = "<item><guid>1</guid></item>";
        let items = parse_items(body, &source(), fetched_at(), ParseLimits::default());
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Untitled");
        assert_eq!(items[0].description, "");
        assert_eq!(items[0].published, fetched_at());
        assert_eq!(items[0].category, "vegetables");
        assert_eq!(items[0].id, "veg-0");
    }

    #[test]
    fn caps_items_and_description() {
        let long = "x".repeat(500);
        let body: String = (0..15)
            .map(|i| format!("<item><title>n{}</title><description>{}</description></item>", i, long))
            .collect();
        let items = parse_items(&body, &source(), fetched_at(), ParseLimits::default());
        assert_eq!(items.len(), 10);
        assert_eq!(items[9].title, "n9");
        assert!(items.iter().all(|i| i.description.chars().count() == 200));
    }

    #[test]
    fn ignores_similar_tag_names() {
        let body = "<items><item><titleExtra>no</titleExtra><title lang=\"en\">yes</title></item></items>";
        let items = parse_items(body, &source(), fetched_at(), ParseLimits::default());
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "yes");
    }

    #[test]
    fn rfc3339_dates_are_accepted() {
        let body = "<item><pubDate>2025-03-02T01:02:03Z</pubDate></item>";
        let items = parse_items(body, &source(), fetched_at(), ParseLimits::default());
        assert_eq!(items[0].published.to_rfc3339(), "2025-03-02T01:02:03+00:00");
    }

    #[test]
    fn unparseable_body_yields_nothing() {
        let items = parse_items("<html>blocked</html>", &source(), fetched_at(), ParseLimits::default());
        assert!(items.is_empty());
    }
}
