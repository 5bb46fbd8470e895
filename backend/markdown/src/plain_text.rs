//! Plain-text rendering of the node tree.
//!
//! Strips all formatting. Used as the raw-text fallback when a renderer fails,
//! and for alt text and labels.

use crate::ir::{Node, NodeKind};

pub struct PlainText;

impl PlainText {
    pub fn render(nodes: &[Node]) -> String {
        let mut output = String::new();
        for node in nodes {
            Self::write_node(node, &mut output);
        }
        output
    }

    fn write_node(node: &Node, output: &mut String) {
        match node.kind {
            NodeKind::Text | NodeKind::CodeSpan | NodeKind::Html => {
                output.push_str(node.literal().unwrap_or_default());
            }
            NodeKind::CodeBlock => {
                output.push_str(node.literal().unwrap_or_default());
                output.push('\n');
            }
            NodeKind::SoftBreak | NodeKind::HardBreak => output.push('\n'),
            NodeKind::HorizontalRule => output.push_str("---\n"),
            NodeKind::TaskListMarker => {
                output.push_str(if node.attrs.checked == Some(true) { "[x] " } else { "[ ] " });
            }
            NodeKind::TableCell => {
                Self::write_children(node, output);
                output.push('\t');
            }
            NodeKind::Heading(_)
            | NodeKind::Paragraph
            | NodeKind::ListItem
            | NodeKind::TableRow
            | NodeKind::FootnoteDefinition => {
                Self::write_children(node, output);
                if output.ends_with('\t') {
                    output.pop();
                }
                output.push('\n');
            }
            _ => Self::write_children(node, output),
        }
    }

    fn write_children(node: &Node, output: &mut String) {
        for child in &node.children {
            Self::write_node(child, output);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::IrParser;

    #[test]
    fn test_strips_formatting() {
        let nodes = IrParser::parse("# Hi\n\nSome *em* and `code`.\n");
        assert_eq!(PlainText::render(&nodes), "Hi\nSome em and code.\n");
    }

    #[test]
    fn test_table_cells_are_tab_separated() {
        let nodes = IrParser::parse("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert_eq!(PlainText::render(&nodes), "a\tb\n1\t2\n");
    }
}
