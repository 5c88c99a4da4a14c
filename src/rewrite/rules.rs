//! Removal and override rules.
//!
//! Removal rules are regex fragments compiled case-insensitively; every match is
//! deleted. Override rules are either a delimited regex literal (`/pattern/flags`)
//! or plain text, paired with a date-templated replacement.

use chrono::{DateTime, Local};
use regex::{Captures, Regex, RegexBuilder};
use std::sync::LazyLock;
use tracing::warn;

use super::date::expand_date_template;
use crate::config::OverrideRule;

static REGEX_LITERAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^/(.*)/([gimsuy]*)$").unwrap());

/// Compile a removal rule: case-insensitive, applied to every match.
pub fn compile_removal(rule: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(rule).case_insensitive(true).build()
}

/// Split `/pattern/flags` into its parts. Plain text yields `None`.
pub fn parse_regex_literal(source: &str) -> Option<(&str, &str)> {
    let caps = REGEX_LITERAL.captures(source)?;
    let pattern = caps.get(1)?.as_str();
    let flags = caps.get(2).map_or("", |m| m.as_str());
    Some((pattern, flags))
}

/// Compile the regex form of an override source, honoring the `i`, `m` and `s` flags.
/// `g`, `u` and `y` are accepted and ignored: replacement is always global.
pub fn compile_override(source: &str) -> Option<Result<Regex, regex::Error>> {
    let (pattern, flags) = parse_regex_literal(source)?;
    Some(
        RegexBuilder::new(pattern)
            .case_insensitive(flags.contains('i'))
            .multi_line(flags.contains('m'))
            .dot_matches_new_line(flags.contains('s'))
            .build(),
    )
}

/// Expand a `$` reference template for one match.
///
/// `$1`..`$99` name a group only when the group exists; two digits win when
/// both would. `$&` is the whole match, `` $` `` and `$'` the text before and
/// after it, `$<name>` a named group, and `$$` a literal `$`. Any other `$`
/// is kept as written.
pub fn expand_replacement(template: &str, re: &Regex, caps: &Captures<'_>, haystack: &str) -> String {
    let whole = caps.get(0).map_or(0..0, |m| m.range());
    let group_count = caps.len();
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        let bytes = after.as_bytes();
        let consumed = match bytes.first() {
            Some(b'$') => {
                out.push('$');
                1
            }
            Some(b'&') => {
                out.push_str(&haystack[whole.clone()]);
                1
            }
            Some(b'`') => {
                out.push_str(&haystack[..whole.start]);
                1
            }
            Some(b'\'') => {
                out.push_str(&haystack[whole.end..]);
                1
            }
            Some(b'<') => match after.find('>') {
                Some(end) if re.capture_names().flatten().any(|n| n == &after[1..end]) => {
                    out.push_str(caps.name(&after[1..end]).map_or("", |m| m.as_str()));
                    end + 1
                }
                _ => {
                    out.push('$');
                    0
                }
            },
            Some(d) if d.is_ascii_digit() => {
                let one = usize::from(d - b'0');
                let two = bytes
                    .get(1)
                    .filter(|b| b.is_ascii_digit())
                    .map(|b| one * 10 + usize::from(b - b'0'));
                match two {
                    Some(n) if n >= 1 && n < group_count => {
                        out.push_str(caps.get(n).map_or("", |m| m.as_str()));
                        2
                    }
                    _ if one >= 1 && one < group_count => {
                        out.push_str(caps.get(one).map_or("", |m| m.as_str()));
                        1
                    }
                    _ => {
                        out.push('$');
                        0
                    }
                }
            }
            _ => {
                out.push('$');
                0
            }
        };
        rest = &after[consumed..];
    }
    out.push_str(rest);
    out
}

/// Delete every match of every removal rule, in list order.
/// Invalid rules are logged and skipped.
pub fn remove_parts(path: &str, rules: &[String]) -> String {
    let mut out = path.to_string();
    for rule in rules {
        match compile_removal(rule) {
            Ok(re) => out = re.replace_all(&out, "").into_owned(),
            Err(e) => warn!(rule = %rule, error = %e, "Skipping invalid removal rule"),
        }
    }
    out
}

/// Apply override rules in list order.
///
/// A regex-literal source replaces all of its matches; a plain-text source
/// replaces its first occurrence. A rule takes one branch, never both.
pub fn apply_overrides(path: &str, rules: &[OverrideRule], date: Option<&DateTime<Local>>) -> String {
    let mut out = path.to_string();
    for rule in rules {
        let replacement = expand_date_template(&rule.replacement, date);
        match compile_override(&rule.source) {
            Some(Ok(re)) => {
                if re.is_match(&out) {
                    let replaced = re
                        .replace_all(&out, |caps: &Captures<'_>| expand_replacement(&replacement, &re, caps, &out))
                        .into_owned();
                    out = replaced;
                }
            }
            Some(Err(e)) => warn!(rule = %rule.source, error = %e, "Skipping invalid override rule"),
            None => {
                if !rule.source.is_empty() {
                    out = out.replacen(&rule.source, &replacement, 1);
                }
            }
        }
    }
    out
}
