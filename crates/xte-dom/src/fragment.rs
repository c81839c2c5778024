//! Fragment scanning
//!
//! Server endpoints answer with raw markup fragments. This scanner lifts
//! the structure the editor cares about out of such a fragment: the root
//! element's id and classes, and the ids of any auto-key module fields
//! rendered inside it. It is an attribute scanner, not an HTML parser.

/// Class marking a rendered auto-key module field
pub const AUTO_KEY_CLASS: &str = "mod_auto_key";

/// Structure lifted out of a markup fragment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FragmentInfo {
    /// `id` attribute of the fragment's first element
    pub elem_id: Option<String>,
    /// Classes of the fragment's first element
    pub classes: Vec<String>,
    /// Ids of auto-key fields anywhere in the fragment, in document order
    pub auto_key_fields: Vec<String>,
}

/// Scan a markup fragment
pub fn scan(markup: &str) -> FragmentInfo {
    let mut info = FragmentInfo::default();
    let mut first = true;

    for tag in tags(markup) {
        let attrs = parse_attrs(tag);
        let id = attr(&attrs, "id");
        let classes: Vec<String> = attr(&attrs, "class")
            .map(|c| c.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();

        if first {
            info.elem_id = id.map(str::to_string);
            info.classes = classes.clone();
            first = false;
        }
        if classes.iter().any(|c| c == AUTO_KEY_CLASS) {
            if let Some(id) = id {
                info.auto_key_fields.push(id.to_string());
            }
        }
    }
    info
}

/// Iterate over the bodies of opening tags in `markup`
fn tags(markup: &str) -> impl Iterator<Item = &str> {
    let mut rest = markup;
    std::iter::from_fn(move || {
        loop {
            let open = rest.find('<')?;
            let after = &rest[open + 1..];
            let close = after.find('>')?;
            let body = &after[..close];
            rest = &after[close + 1..];
            // Skip closing tags, comments, doctypes
            if body.starts_with('/') || body.starts_with('!') {
                continue;
            }
            return Some(body.trim_end_matches('/'));
        }
    })
}

/// Parse `name="value"` pairs from a tag body
fn parse_attrs(tag: &str) -> Vec<(&str, &str)> {
    let mut attrs = Vec::new();
    // Drop the tag name
    let mut rest = match tag.find(char::is_whitespace) {
        Some(i) => &tag[i..],
        None => return attrs,
    };
    loop {
        rest = rest.trim_start();
        let Some(eq) = rest.find('=') else {
            break;
        };
        let name = rest[..eq].trim();
        let after = rest[eq + 1..].trim_start();
        let Some(quote) = after.chars().next().filter(|&c| c == '"' || c == '\'') else {
            break;
        };
        let value_start = &after[1..];
        let Some(end) = value_start.find(quote) else {
            break;
        };
        attrs.push((name, &value_start[..end]));
        rest = &value_start[end + 1..];
    }
    attrs
}

fn attr<'a>(attrs: &[(&'a str, &'a str)], name: &str) -> Option<&'a str> {
    attrs.iter().find(|(n, _)| *n == name).map(|(_, v)| *v)
}
