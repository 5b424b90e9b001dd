//! Built-in node types.
//!
//! Each type registers a renderer, the shared blob codec and an
//! insertion-time validator. Payload rules:
//! - `image`: `src` (required http(s) URL), `alt` (optional)
//! - `video`: `src` (required; YouTube/Vimeo page URL or direct media URL),
//!   `title` (optional)
//! - `blockquote`: `text`
//! - `code`: `code`, `language` (fixed allow-list; empty means plain)
//! - `table` / `table-row` / `table-cell`: layout attributes live on the
//!   table node (`width`, `columnWidths`, `rowHeights`)

use crate::error::{DocumentError, RenderError};
use crate::host::HostNode;
use crate::node::{AttrMap, DocumentNode};
use crate::registry::{NodeTypeDefinition, NodeTypeRegistry, TypeFlags};
use crate::table;
use serde_json::Value;
use std::sync::Arc;

/// Type tags of the built-in node types.
pub mod tags {
    pub const ROOT: &str = "root";
    pub const PARAGRAPH: &str = "paragraph";
    pub const HEADING: &str = "heading";
    pub const IMAGE: &str = "image";
    pub const VIDEO: &str = "video";
    pub const BLOCKQUOTE: &str = "blockquote";
    pub const CODE: &str = "code";
    pub const TABLE: &str = "table";
    pub const TABLE_ROW: &str = "table-row";
    pub const TABLE_CELL: &str = "table-cell";
    /// Placeholder for blobs whose type tag is not registered.
    pub const UNSUPPORTED: &str = "unsupported";
}

/// Language identifiers accepted on code blocks.
pub const KNOWN_LANGUAGES: &[&str] = &[
    "bash", "c", "cpp", "csharp", "css", "go", "html", "java", "javascript", "json", "kotlin",
    "markdown", "php", "python", "ruby", "rust", "sql", "swift", "typescript", "yaml",
];

/// Built-in types that never have structural children.
pub fn is_leaf_type(tag: &str) -> bool {
    matches!(
        tag,
        tags::IMAGE | tags::VIDEO | tags::BLOCKQUOTE | tags::CODE | tags::UNSUPPORTED
    )
}

pub fn register_builtins(registry: &mut NodeTypeRegistry) {
    let flow = TypeFlags::default();
    let decorator = TypeFlags {
        is_decorator: true,
        ..TypeFlags::default()
    };
    let editable_decorator = TypeFlags {
        is_decorator: true,
        inline_editable: true,
        ..TypeFlags::default()
    };

    registry.register(
        tags::ROOT,
        NodeTypeDefinition::with_default_codec(1, flow, Arc::new(render_root), Arc::new(accept)),
    );
    registry.register(
        tags::PARAGRAPH,
        NodeTypeDefinition::with_default_codec(
            1,
            flow,
            Arc::new(render_paragraph),
            Arc::new(accept),
        ),
    );
    registry.register(
        tags::HEADING,
        NodeTypeDefinition::with_default_codec(
            1,
            flow,
            Arc::new(render_heading),
            Arc::new(validate_heading),
        ),
    );
    registry.register(
        tags::IMAGE,
        NodeTypeDefinition::with_default_codec(
            1,
            decorator,
            Arc::new(render_image),
            Arc::new(validate_image),
        ),
    );
    registry.register(
        tags::VIDEO,
        NodeTypeDefinition::with_default_codec(
            1,
            decorator,
            Arc::new(render_video),
            Arc::new(validate_video),
        ),
    );
    registry.register(
        tags::BLOCKQUOTE,
        NodeTypeDefinition::with_default_codec(
            1,
            editable_decorator,
            Arc::new(render_blockquote),
            Arc::new(validate_text_payload),
        ),
    );
    registry.register(
        tags::CODE,
        NodeTypeDefinition::with_default_codec(
            1,
            editable_decorator,
            Arc::new(render_code),
            Arc::new(validate_code),
        ),
    );
    registry.register(
        tags::TABLE,
        NodeTypeDefinition::with_default_codec(
            1,
            TypeFlags {
                resizable: true,
                ..TypeFlags::default()
            },
            Arc::new(render_table),
            Arc::new(accept),
        ),
    );
    registry.register(
        tags::TABLE_ROW,
        NodeTypeDefinition::with_default_codec(1, flow, Arc::new(render_table_row), Arc::new(accept)),
    );
    registry.register(
        tags::TABLE_CELL,
        NodeTypeDefinition::with_default_codec(1, flow, Arc::new(render_table_cell), Arc::new(accept)),
    );
    registry.register(
        tags::UNSUPPORTED,
        NodeTypeDefinition::with_default_codec(
            1,
            decorator,
            Arc::new(render_unsupported),
            Arc::new(accept),
        ),
    );
}

fn accept(_attrs: &AttrMap) -> Result<(), DocumentError> {
    Ok(())
}

fn validate_heading(attrs: &AttrMap) -> Result<(), DocumentError> {
    if let Some(level) = attrs.get("level") {
        match level.as_u64() {
            Some(1..=6) => {}
            _ => {
                return Err(DocumentError::invalid_attribute(
                    "level",
                    "expected an integer between 1 and 6",
                ))
            }
        }
    }
    Ok(())
}

fn validate_image(attrs: &AttrMap) -> Result<(), DocumentError> {
    let src = require_string(attrs, "src")?;
    check_http_url("src", src)
}

fn validate_video(attrs: &AttrMap) -> Result<(), DocumentError> {
    let src = require_string(attrs, "src")?;
    check_http_url("src", src)
}

fn validate_text_payload(attrs: &AttrMap) -> Result<(), DocumentError> {
    if let Some(text) = attrs.get("text") {
        if !text.is_string() {
            return Err(DocumentError::invalid_attribute("text", "expected a string"));
        }
    }
    Ok(())
}

fn validate_code(attrs: &AttrMap) -> Result<(), DocumentError> {
    if let Some(code) = attrs.get("code") {
        if !code.is_string() {
            return Err(DocumentError::invalid_attribute("code", "expected a string"));
        }
    }
    match attrs.get("language").and_then(Value::as_str) {
        None | Some("") => Ok(()),
        Some(language) if KNOWN_LANGUAGES.contains(&language) => Ok(()),
        Some(language) => Err(DocumentError::invalid_attribute(
            "language",
            format!("unknown language `{language}`"),
        )),
    }
}

fn require_string<'a>(attrs: &'a AttrMap, name: &str) -> Result<&'a str, DocumentError> {
    attrs
        .get(name)
        .and_then(Value::as_str)
        .ok_or_else(|| DocumentError::invalid_attribute(name, "required"))
}

/// Accepts `http://host/...` and `https://host/...`.
fn check_http_url(name: &str, value: &str) -> Result<(), DocumentError> {
    let rest = value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"))
        .ok_or_else(|| DocumentError::invalid_attribute(name, "expected an http(s) URL"))?;
    let host = rest.split('/').next().unwrap_or("");
    if host.is_empty() {
        return Err(DocumentError::invalid_attribute(name, "URL has no host"));
    }
    Ok(())
}

fn render_root(_node: &DocumentNode) -> Result<HostNode, RenderError> {
    Ok(HostNode::element("article").attr("class", "document"))
}

fn render_paragraph(node: &DocumentNode) -> Result<HostNode, RenderError> {
    Ok(HostNode::element("p").child(HostNode::text(node.attr_str("text").unwrap_or(""))))
}

fn render_heading(node: &DocumentNode) -> Result<HostNode, RenderError> {
    let level = node
        .attributes
        .get("level")
        .and_then(Value::as_u64)
        .unwrap_or(2)
        .clamp(1, 6);
    Ok(HostNode::element(format!("h{level}"))
        .child(HostNode::text(node.attr_str("text").unwrap_or(""))))
}

fn render_image(node: &DocumentNode) -> Result<HostNode, RenderError> {
    let src = node
        .attr_str("src")
        .ok_or_else(|| RenderError::new("image has no `src`"))?;
    check_http_url("src", src).map_err(|_| RenderError::new(format!("malformed image URL: {src}")))?;

    let mut img = HostNode::element("img").attr("src", src);
    if let Some(alt) = node.attr_str("alt") {
        img = img.attr("alt", alt);
    }
    Ok(HostNode::element("figure").attr("class", "image-block").child(img))
}

fn render_video(node: &DocumentNode) -> Result<HostNode, RenderError> {
    let src = node
        .attr_str("src")
        .ok_or_else(|| RenderError::new("video has no `src`"))?;
    check_http_url("src", src).map_err(|_| RenderError::new(format!("malformed video URL: {src}")))?;

    let view = match embed_url(src) {
        Some(embed) => HostNode::element("iframe")
            .attr("src", embed)
            .attr("allowfullscreen", "true"),
        None => HostNode::element("video").attr("src", src).attr("controls", "true"),
    };
    let mut figure = HostNode::element("figure").attr("class", "video-block").child(view);
    if let Some(title) = node.attr_str("title") {
        figure = figure.attr("title", title);
    }
    Ok(figure)
}

/// Player URL for known video hosts; `None` means a direct media URL.
fn embed_url(src: &str) -> Option<String> {
    let rest = src
        .strip_prefix("https://")
        .or_else(|| src.strip_prefix("http://"))?
        .trim_start_matches("www.");

    if let Some(id) = rest.strip_prefix("youtube.com/watch?v=") {
        let id = id.split('&').next()?;
        return Some(format!("https://www.youtube.com/embed/{id}"));
    }
    if let Some(id) = rest.strip_prefix("youtu.be/") {
        let id = id.split('?').next()?;
        return Some(format!("https://www.youtube.com/embed/{id}"));
    }
    if let Some(id) = rest.strip_prefix("vimeo.com/") {
        let id = id.split('?').next()?;
        if id.chars().all(|c| c.is_ascii_digit()) && !id.is_empty() {
            return Some(format!("https://player.vimeo.com/video/{id}"));
        }
    }
    None
}

fn render_blockquote(node: &DocumentNode) -> Result<HostNode, RenderError> {
    Ok(HostNode::element("blockquote")
        .attr("class", "quote-block")
        .child(HostNode::text(node.attr_str("text").unwrap_or(""))))
}

fn render_code(node: &DocumentNode) -> Result<HostNode, RenderError> {
    let language = node.attr_str("language").unwrap_or("");
    let mut code = HostNode::element("code");
    if !language.is_empty() {
        code = code.attr("class", format!("language-{language}"));
    }
    code = code.child(HostNode::text(node.attr_str("code").unwrap_or("")));
    Ok(HostNode::element("pre").attr("class", "code-block").child(code))
}

fn render_table(node: &DocumentNode) -> Result<HostNode, RenderError> {
    let mut element = HostNode::element("table");
    if let Some(width) = node.attr_str(table::ATTR_WIDTH) {
        element = element.style("width", width);
    }
    let widths = table::decode_dimensions(node.attr_str(table::ATTR_COLUMN_WIDTHS).unwrap_or(""));
    if !widths.is_empty() {
        let mut colgroup = HostNode::element("colgroup");
        for width in widths {
            let mut col = HostNode::element("col");
            if let Some(width) = width {
                col = col.style("width", format!("{}px", table::format_unit(width)));
            }
            colgroup = colgroup.child(col);
        }
        element = element.child(colgroup);
    }
    Ok(element)
}

fn render_table_row(_node: &DocumentNode) -> Result<HostNode, RenderError> {
    Ok(HostNode::element("tr"))
}

fn render_table_cell(_node: &DocumentNode) -> Result<HostNode, RenderError> {
    Ok(HostNode::element("td"))
}

fn render_unsupported(node: &DocumentNode) -> Result<HostNode, RenderError> {
    let original = node.attr_str("originalType").unwrap_or("unknown");
    Ok(HostNode::element("div")
        .attr("class", "unsupported-block")
        .child(HostNode::text(format!("Unsupported block: {original}"))))
}
