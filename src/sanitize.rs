//! Markup stripping for user-supplied text
//!
//! No tags are allowed through. Text content is kept, except inside
//! `script` and `style` elements and comments, which are dropped entirely.

/// Elements whose content is removed along with the tags
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Removes all markup from `input`, keeping its text
///
/// A `<` that does not open a tag (e.g. `3 < 5`) is kept as text. An
/// unterminated tag swallows the rest of the input.
pub fn sanitize(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find('<') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];

        if let Some(comment) = tail.strip_prefix("<!--") {
            rest = comment.find("-->").map_or("", |end| &comment[end + 3..]);
            continue;
        }

        if !opens_tag(tail) {
            out.push('<');
            rest = &tail[1..];
            continue;
        }

        let Some(end) = tail.find('>') else {
            return out;
        };
        let inner = &tail[1..end];
        rest = &tail[end + 1..];

        if !inner.starts_with('/') {
            let name = tag_name(inner);
            if RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
                rest = skip_element_content(rest, &name);
            }
        }
    }

    out.push_str(rest);
    out
}

fn opens_tag(tail: &str) -> bool {
    let mut chars = tail.chars().skip(1);
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '!' || c == '?' => true,
        Some('/') => chars.next().is_some_and(|c| c.is_ascii_alphabetic()),
        _ => false,
    }
}

fn tag_name(inner: &str) -> String {
    inner
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase()
}

/// Skips to just past the closing tag of `name`, or to the end of input
fn skip_element_content<'a>(rest: &'a str, name: &str) -> &'a str {
    let closing = format!("</{}", name);
    let Some(pos) = rest.to_ascii_lowercase().find(&closing) else {
        return "";
    };
    let after = &rest[pos..];
    after.find('>').map_or("", |end| &after[end + 1..])
}
