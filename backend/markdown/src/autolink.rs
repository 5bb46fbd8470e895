//! Bare URL autolinking (GitHub-flavored `www.` and `http(s)://` links).

use std::sync::LazyLock;

use regex::Regex;

use crate::ir::{Node, NodeKind};

// A link starts at the beginning of the run or after whitespace or one of
// `*_~(`. The last character may not be trailing punctuation.
static BARE_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:^|[\s*_~(])((?:https?://|www\.)[^\s<>]*[^\s<>.,:;!?'")\]*_~])"#).unwrap()
});

/// Rewrites text runs so bare URLs become link nodes. Link text, code and
/// raw HTML are left alone.
pub fn link_bare_urls(nodes: &mut Vec<Node>) {
    let mut out = Vec::with_capacity(nodes.len());
    for mut node in nodes.drain(..) {
        match node.kind {
            NodeKind::Text => split_text(node, &mut out),
            NodeKind::Link
            | NodeKind::Image
            | NodeKind::CodeSpan
            | NodeKind::CodeBlock
            | NodeKind::Html => out.push(node),
            _ => {
                link_bare_urls(&mut node.children);
                out.push(node);
            }
        }
    }
    *nodes = out;
}

fn split_text(node: Node, out: &mut Vec<Node>) {
    let text = node.literal().unwrap_or_default();
    if !BARE_URL_RE.is_match(text) {
        out.push(node);
        return;
    }

    let mut last = 0;
    for caps in BARE_URL_RE.captures_iter(text) {
        let Some(m) = caps.get(1) else { continue };
        if m.start() > last {
            out.push(Node::text(&text[last..m.start()]));
        }
        let url = m.as_str();
        let href = if url.starts_with("www.") {
            format!("http://{url}")
        } else {
            url.to_string()
        };
        out.push(Node::link(href, None, vec![Node::text(url)]));
        last = m.end();
    }
    if last < text.len() {
        out.push(Node::text(&text[last..]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::IrParser;

    #[test]
    fn test_bare_url_becomes_link() {
        let nodes = IrParser::parse("see https://example.com/docs, then www.rust-lang.org.");
        let para = &nodes[0];
        let links: Vec<_> = para
            .children
            .iter()
            .filter(|c| c.kind == NodeKind::Link)
            .collect();
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].attrs.href.as_deref(), Some("https://example.com/docs"));
        assert_eq!(links[1].attrs.href.as_deref(), Some("http://www.rust-lang.org"));
        assert_eq!(para.plain_text(), "see https://example.com/docs, then www.rust-lang.org.");
    }

    #[test]
    fn test_mid_word_urls_stay_text() {
        let nodes = IrParser::parse("awww.example.com and foohttps://x.io");
        let para = &nodes[0];
        assert!(para.children.iter().all(|c| c.kind == NodeKind::Text));
        assert_eq!(para.plain_text(), "awww.example.com and foohttps://x.io");
    }

    #[test]
    fn test_url_after_paren_keeps_prefix_text() {
        let nodes = IrParser::parse("docs (https://x.io) here");
        let para = &nodes[0];
        let kinds: Vec<_> = para.children.iter().map(|c| c.kind).collect();
        assert_eq!(kinds, vec![NodeKind::Text, NodeKind::Link, NodeKind::Text]);
        assert_eq!(para.children[0].literal(), Some("docs ("));
        assert_eq!(para.children[1].attrs.href.as_deref(), Some("https://x.io"));
        assert_eq!(para.children[2].literal(), Some(") here"));
    }

    #[test]
    fn test_angle_autolink_is_not_doubled() {
        let nodes = IrParser::parse("<https://example.com>");
        let para = &nodes[0];
        assert_eq!(para.children.len(), 1);
        assert_eq!(para.children[0].kind, NodeKind::Link);
        assert_eq!(para.children[0].children.len(), 1);
        assert_eq!(para.children[0].children[0].kind, NodeKind::Text);
    }

    #[test]
    fn test_code_span_urls_untouched() {
        let nodes = IrParser::parse("`https://example.com`");
        assert_eq!(nodes[0].children[0].kind, NodeKind::CodeSpan);
    }
}
