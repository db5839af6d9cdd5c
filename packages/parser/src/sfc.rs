//! Single-file component block extraction.
//!
//! Only `<script>` blocks matter to the metadata engine; the template and
//! style blocks are located just far enough to be skipped.

use crate::error::{ParseError, ParseResult};
use crate::ast::Span;

/// One `<script>` block of a single-file component
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptBlock<'src> {
    pub content: &'src str,
    /// Byte offset of `content` within the whole file
    pub offset: usize,
    pub setup: bool,
    pub lang: Option<String>,
}

impl<'src> ScriptBlock<'src> {
    /// True when the block is written in the typed dialect
    pub fn is_typed(&self) -> bool {
        matches!(self.lang.as_deref(), Some("ts") | Some("tsx"))
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SfcDescriptor<'src> {
    pub scripts: Vec<ScriptBlock<'src>>,
    pub has_template: bool,
}

impl<'src> SfcDescriptor<'src> {
    pub fn setup_script(&self) -> Option<&ScriptBlock<'src>> {
        self.scripts.iter().find(|script| script.setup)
    }

    pub fn script(&self) -> Option<&ScriptBlock<'src>> {
        self.scripts.iter().find(|script| !script.setup)
    }
}

/// Split a single-file component into its script blocks
pub fn parse_sfc(source: &str) -> ParseResult<SfcDescriptor<'_>> {
    let mut descriptor = SfcDescriptor::default();
    let mut pos = 0;

    while let Some(rel) = source[pos..].find('<') {
        let start = pos + rel;
        let rest = &source[start..];

        if rest.starts_with("<!--") {
            pos = match rest.find("-->") {
                Some(end) => start + end + 3,
                None => source.len(),
            };
            continue;
        }

        let Some(tag) = top_level_tag_name(rest) else {
            pos = start + 1;
            continue;
        };

        let open_end = find_tag_end(source, start)?;
        let attrs = &source[start + 1 + tag.len()..open_end];
        let close = format!("</{}", tag);
        let content_start = open_end + 1;
        let content_end = source[content_start..]
            .find(&close)
            .map(|rel| content_start + rel)
            .ok_or_else(|| ParseError::unexpected_eof(source.len(), format!("'</{}>'", tag)))?;

        match tag {
            "script" => {
                let attributes = parse_attributes(attrs);
                descriptor.scripts.push(ScriptBlock {
                    content: &source[content_start..content_end],
                    offset: content_start,
                    setup: attributes.iter().any(|(name, _)| name == "setup"),
                    lang: attributes
                        .into_iter()
                        .find(|(name, _)| name == "lang")
                        .and_then(|(_, value)| value),
                });
            }
            "template" => descriptor.has_template = true,
            _ => {}
        }

        pos = source[content_end..]
            .find('>')
            .map(|rel| content_end + rel + 1)
            .unwrap_or(source.len());
    }

    if descriptor.scripts.iter().filter(|s| s.setup).count() > 1 {
        return Err(ParseError::invalid_syntax(
            Span::new(0, source.len()),
            "a component may contain at most one <script setup> block",
        ));
    }

    Ok(descriptor)
}

fn top_level_tag_name(rest: &str) -> Option<&'static str> {
    ["script", "template", "style"].into_iter().find(|tag| {
        rest[1..].starts_with(tag)
            && rest[1 + tag.len()..]
                .chars()
                .next()
                .map(|c| c == '>' || c.is_whitespace())
                .unwrap_or(false)
    })
}

/// Find the `>` closing an opening tag, skipping quoted attribute values
fn find_tag_end(source: &str, start: usize) -> ParseResult<usize> {
    let mut quote: Option<char> = None;

    for (i, c) in source[start..].char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"') | (None, '\'') => quote = Some(c),
            (None, '>') => return Ok(start + i),
            _ => {}
        }
    }

    Err(ParseError::unexpected_eof(source.len(), "'>'"))
}

fn parse_attributes(attrs: &str) -> Vec<(String, Option<String>)> {
    let mut result = Vec::new();
    let mut chars = attrs.trim().trim_end_matches('/').chars().peekable();

    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}

        let name: String = std::iter::from_fn(|| chars.next_if(|c| !c.is_whitespace() && *c != '='))
            .collect();
        if name.is_empty() {
            break;
        }

        while chars.next_if(|c| c.is_whitespace()).is_some() {}

        let value = if chars.next_if_eq(&'=').is_some() {
            while chars.next_if(|c| c.is_whitespace()).is_some() {}
            match chars.peek().copied() {
                Some(q @ ('"' | '\'')) => {
                    chars.next();
                    let value: String = std::iter::from_fn(|| chars.next_if(|c| *c != q)).collect();
                    chars.next();
                    Some(value)
                }
                _ => Some(std::iter::from_fn(|| chars.next_if(|c| !c.is_whitespace())).collect()),
            }
        } else {
            None
        };

        result.push((name, value));
    }

    result
}
