//! Note content parsing: embeds and YAML frontmatter.

use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

use super::EmbedRef;

// ![[target]], ![[target#heading]], ![[target|400]]
static WIKI_EMBED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[\[([^\]\|]+)(?:\|[^\]]*)?\]\]").unwrap());

// ![alt](target) and ![alt](<target with spaces>)
static MARKDOWN_EMBED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[[^\]]*\]\((?:<([^>]+)>|([^)\s]+))(?:\s+[^)]*)?\)").unwrap());

// ``` or ~~~ opening/closing a fenced block
static FENCE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*(`{3,}|~{3,})").unwrap());

/// Byte ranges of fenced code blocks; an unclosed fence runs to the end.
fn fenced_ranges(content: &str) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut open: Option<(usize, char)> = None;
    let mut offset = 0;
    for line in content.split_inclusive('\n') {
        if let Some(m) = FENCE.captures(line).and_then(|c| c.get(1)) {
            let fence_char = m.as_str().chars().next().unwrap_or('`');
            match open {
                None => open = Some((offset, fence_char)),
                Some((start, c)) if c == fence_char => {
                    ranges.push(start..offset + line.len());
                    open = None;
                }
                Some(_) => {}
            }
        }
        offset += line.len();
    }
    if let Some((start, _)) = open {
        ranges.push(start..content.len());
    }
    ranges
}

fn is_external(target: &str) -> bool {
    let lower = target.to_ascii_lowercase();
    ["http://", "https://", "mailto:", "obsidian://", "data:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
}

/// Every embed in `content`, in document order. Embeds inside fenced code and
/// external URLs are ignored. Markdown targets are percent-decoded.
pub fn parse_embeds(content: &str) -> Vec<EmbedRef> {
    let fences = fenced_ranges(content);
    let in_fence = |pos: usize| fences.iter().any(|r| r.contains(&pos));

    let mut found: Vec<(usize, String)> = Vec::new();
    for cap in WIKI_EMBED.captures_iter(content) {
        let (Some(whole), Some(target)) = (cap.get(0), cap.get(1)) else {
            continue;
        };
        if !in_fence(whole.start()) {
            found.push((whole.start(), target.as_str().trim().to_string()));
        }
    }
    for cap in MARKDOWN_EMBED.captures_iter(content) {
        let Some(whole) = cap.get(0) else { continue };
        let Some(target) = cap.get(1).or_else(|| cap.get(2)) else {
            continue;
        };
        if in_fence(whole.start()) || is_external(target.as_str()) {
            continue;
        }
        let decoded = urlencoding::decode(target.as_str())
            .map(|s| s.into_owned())
            .unwrap_or_else(|_| target.as_str().to_string());
        found.push((whole.start(), decoded));
    }
    found.sort_by_key(|(pos, _)| *pos);
    found
        .into_iter()
        .filter(|(_, link)| !link.is_empty())
        .map(|(_, link)| EmbedRef { link })
        .collect()
}

/// Split `content` into its raw YAML frontmatter (without delimiters) and the body.
pub fn split_frontmatter(content: &str) -> (Option<&str>, &str) {
    let rest = if let Some(r) = content.strip_prefix("---\n") {
        r
    } else if let Some(r) = content.strip_prefix("---\r\n") {
        r
    } else {
        return (None, content);
    };
    let yaml_start = content.len() - rest.len();

    // An empty block closes immediately.
    if let Some(body) = rest.strip_prefix("---")
        && (body.is_empty() || body.starts_with('\n') || body.starts_with("\r\n"))
    {
        let body = body.strip_prefix("\r\n").or_else(|| body.strip_prefix('\n')).unwrap_or(body);
        return (Some(""), body);
    }

    let close = rest
        .find("\n---\n")
        .or_else(|| rest.find("\n---\r\n"))
        .or_else(|| rest.ends_with("\n---").then(|| rest.len() - 4));
    match close {
        Some(pos) => {
            let yaml = &content[yaml_start..yaml_start + pos];
            let after = &rest[pos + 4..];
            let body = after
                .strip_prefix("\r\n")
                .or_else(|| after.strip_prefix('\n'))
                .unwrap_or(after);
            (Some(yaml), body)
        }
        None => (None, content),
    }
}

/// Top-level frontmatter value for `key`; `None` when absent, null or unparsable.
pub fn frontmatter_value(content: &str, key: &str) -> Option<serde_yaml::Value> {
    let (yaml, _) = split_frontmatter(content);
    let value: serde_yaml::Value = serde_yaml::from_str(yaml?).ok()?;
    match value.get(key)? {
        serde_yaml::Value::Null => None,
        v => Some(v.clone()),
    }
}
