//! Doc comment parsing.
//!
//! Turns the raw text of a `/** ... */` comment into a description and an
//! ordered list of `@tag` entries. Tag order is the source order and repeated
//! tags are kept as separate entries.

use crate::ast::{DocComment, DocTag};

/// Parse a raw `/** ... */` comment
pub fn parse_doc_comment(raw: &str) -> DocComment {
    let body = raw
        .strip_prefix("/**")
        .unwrap_or(raw)
        .strip_suffix("*/")
        .unwrap_or(raw);

    let lines: Vec<&str> = body.lines().map(strip_leading_star).collect();

    let mut description = Vec::new();
    let mut tags: Vec<(String, Vec<&str>)> = Vec::new();

    for line in lines {
        let trimmed = line.trim_start();
        if let Some(rest) = trimmed.strip_prefix('@') {
            let name_len = rest
                .find(|c: char| c.is_whitespace())
                .unwrap_or(rest.len());
            let (name, text) = rest.split_at(name_len);
            if !name.is_empty() {
                tags.push((name.to_string(), vec![text.trim_start()]));
                continue;
            }
        }

        match tags.last_mut() {
            Some((_, text)) => text.push(line),
            None => description.push(line),
        }
    }

    DocComment {
        description: description.join("\n").trim().to_string(),
        tags: tags
            .into_iter()
            .map(|(name, text)| DocTag {
                name,
                text: text.join("\n").trim().to_string(),
            })
            .collect(),
    }
}

/// Remove the ` * ` gutter of one comment line, keeping any further indentation
fn strip_leading_star(line: &str) -> &str {
    let trimmed = line.trim_start();
    match trimmed.strip_prefix('*') {
        Some(rest) => rest.strip_prefix(' ').unwrap_or(rest),
        None => trimmed,
    }
}
