//! Generated-content ingestion.
//!
//! The AI side of the product hands back plain Markdown; this maps its
//! block structure onto document nodes. Ingestion is forgiving where manual
//! insertion is strict: a fence language outside the allow-list becomes
//! plain text, and an image with a URL the editor would reject is dropped,
//! because a generation result must never fail the insert.

use penmark_document::builtins::{tags, KNOWN_LANGUAGES};
use penmark_document::{DocumentError, DocumentNode, DocumentTree};
use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Parser, Tag, TagEnd};
use tracing::warn;

/// Parse `markdown` and append the resulting nodes at the end of the root.
/// Returns how many block nodes were appended.
pub fn append_markdown(tree: &mut DocumentTree, markdown: &str) -> Result<usize, DocumentError> {
    let nodes = markdown_to_nodes(tree, markdown);
    let appended = nodes.len();
    for node in nodes {
        tree.append_to_root(node)?;
    }
    Ok(appended)
}

/// Map Markdown block structure onto document nodes, minting keys from the
/// target tree.
pub fn markdown_to_nodes(tree: &mut DocumentTree, markdown: &str) -> Vec<DocumentNode> {
    let parser = Parser::new(markdown);
    let mut nodes: Vec<DocumentNode> = Vec::new();

    let mut text = String::new();
    let mut heading_level: Option<u8> = None;
    let mut in_code_block = false;
    let mut code_language = String::new();
    let mut code_text = String::new();
    let mut quote_depth = 0usize;
    let mut quote_text = String::new();
    let mut image: Option<(String, String)> = None; // (src, alt so far)

    for event in parser {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                heading_level = Some(heading_level_to_u8(level));
                text.clear();
            }
            Event::End(TagEnd::Heading(_)) => {
                let level = heading_level.take().unwrap_or(2);
                nodes.push(
                    DocumentNode::new(tree.mint_key(), tags::HEADING)
                        .attr("level", level)
                        .attr("text", text.trim()),
                );
                text.clear();
            }
            Event::Start(Tag::Paragraph) | Event::Start(Tag::Item) => {
                if quote_depth == 0 {
                    text.clear();
                }
            }
            Event::End(TagEnd::Paragraph) | Event::End(TagEnd::Item) => {
                if quote_depth > 0 {
                    if !quote_text.is_empty() {
                        quote_text.push('\n');
                    }
                    quote_text.push_str(text.trim());
                } else if !text.trim().is_empty() {
                    nodes.push(
                        DocumentNode::new(tree.mint_key(), tags::PARAGRAPH)
                            .attr("text", text.trim()),
                    );
                }
                text.clear();
            }
            Event::Start(Tag::BlockQuote(_)) => {
                quote_depth += 1;
            }
            Event::End(TagEnd::BlockQuote(_)) => {
                quote_depth = quote_depth.saturating_sub(1);
                if quote_depth == 0 {
                    nodes.push(
                        DocumentNode::new(tree.mint_key(), tags::BLOCKQUOTE)
                            .attr("text", quote_text.trim()),
                    );
                    quote_text.clear();
                }
            }
            Event::Start(Tag::CodeBlock(kind)) => {
                in_code_block = true;
                code_text.clear();
                code_language = match kind {
                    CodeBlockKind::Fenced(info) => normalized_language(&info),
                    CodeBlockKind::Indented => String::new(),
                };
            }
            Event::End(TagEnd::CodeBlock) => {
                in_code_block = false;
                let code = code_text.strip_suffix('\n').unwrap_or(&code_text);
                nodes.push(
                    DocumentNode::new(tree.mint_key(), tags::CODE)
                        .attr("code", code)
                        .attr("language", code_language.as_str()),
                );
                code_text.clear();
            }
            Event::Start(Tag::Image { dest_url, .. }) => {
                image = Some((dest_url.to_string(), String::new()));
            }
            Event::End(TagEnd::Image) => {
                if let Some((src, alt)) = image.take() {
                    if src.starts_with("http://") || src.starts_with("https://") {
                        let mut node =
                            DocumentNode::new(tree.mint_key(), tags::IMAGE).attr("src", src);
                        if !alt.trim().is_empty() {
                            node = node.attr("alt", alt.trim());
                        }
                        nodes.push(node);
                    } else {
                        warn!(%src, "dropping generated image with a non-http source");
                    }
                }
            }
            Event::Text(chunk) => {
                if let Some((_, alt)) = image.as_mut() {
                    alt.push_str(&chunk);
                } else if in_code_block {
                    code_text.push_str(&chunk);
                } else {
                    text.push_str(&chunk);
                }
            }
            Event::Code(chunk) => {
                if in_code_block {
                    code_text.push_str(&chunk);
                } else {
                    text.push_str(&chunk);
                }
            }
            Event::SoftBreak | Event::HardBreak => {
                if in_code_block {
                    code_text.push('\n');
                } else {
                    text.push(' ');
                }
            }
            _ => {}
        }
    }

    nodes
}

fn heading_level_to_u8(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// First token of the fence info string, downgraded to plain text when it is
/// not a language the editor knows.
fn normalized_language(info: &str) -> String {
    let language = info.split([',', ' ']).next().unwrap_or("").trim();
    if language.is_empty() || KNOWN_LANGUAGES.contains(&language) {
        language.to_string()
    } else {
        warn!(%language, "unknown fence language in generated content, treating as plain text");
        String::new()
    }
}
