//! Flattened AST outline for the viewer
//!
//! The tree is flattened once, in pre-order, into [`OutlineRow`]s. Each row
//! records how many rows below it belong to its subtree, so collapsing a row
//! is just skipping that many rows when computing the visible list.

use crate::parser::ast::*;
use rustc_hash::FxHashSet;

/// Longest text preview shown for text and comment nodes
const PREVIEW_CHARS: usize = 40;

/// One line of the outline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineRow {
    pub depth: usize,
    pub label: String,
    pub kind: RowKind,
    pub span: Span,
    /// Number of rows in this row's subtree, excluding itself
    pub descendants: usize,
}

impl OutlineRow {
    pub fn has_children(&self) -> bool {
        self.descendants > 0
    }
}

/// Coarse row category, used for coloring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Block,
    Statement,
    Element,
    Component,
    Attribute,
    Expression,
    Text,
    Comment,
}

/// Pre-order rows of a whole document
#[derive(Debug, Clone, Default)]
pub struct Outline {
    rows: Vec<OutlineRow>,
}

impl Outline {
    pub fn new(document: &Document) -> Self {
        let mut outline = Outline::default();
        for node in &document.nodes {
            outline.node(node, 0);
        }
        outline
    }

    pub fn rows(&self) -> &[OutlineRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Indices of rows not hidden under a collapsed ancestor
    pub fn visible(&self, collapsed: &FxHashSet<usize>) -> Vec<usize> {
        let mut visible = Vec::with_capacity(self.rows.len());
        let mut index = 0;
        while index < self.rows.len() {
            visible.push(index);
            if collapsed.contains(&index) {
                index += self.rows[index].descendants;
            }
            index += 1;
        }
        visible
    }

    // ===== Flattening =====

    /// Push a row and return its index
    fn push(&mut self, depth: usize, kind: RowKind, label: String, span: Span) -> usize {
        self.rows.push(OutlineRow {
            depth,
            label,
            kind,
            span,
            descendants: 0,
        });
        self.rows.len() - 1
    }

    /// Record the subtree size of `index` once its children are pushed
    fn close(&mut self, index: usize) {
        self.rows[index].descendants = self.rows.len() - index - 1;
    }

    fn node(&mut self, node: &Node, depth: usize) {
        match node {
            Node::Frontmatter(frontmatter) => {
                let row = self.push(depth, RowKind::Block, "frontmatter".to_string(), frontmatter.span);
                for statement in &frontmatter.statements {
                    self.push(depth + 1, RowKind::Statement, statement_label(statement), statement.span());
                }
                self.close(row);
            }
            Node::If(block) => {
                let row = self.push(depth, RowKind::Block, "{if}".to_string(), block.span);
                for (i, branch) in block.branches.iter().enumerate() {
                    let label = match (&branch.guard, i) {
                        (Some(guard), 0) => format!("if {}", guard),
                        (Some(guard), _) => format!("else if {}", guard),
                        (None, _) => "else".to_string(),
                    };
                    let branch_row = self.push(depth + 1, RowKind::Block, label, branch.span);
                    self.nodes(&branch.body, depth + 2);
                    self.close(branch_row);
                }
                self.close(row);
            }
            Node::For(block) => {
                let label = format!("{{for {} of {}}}", block.binding, block.source);
                let row = self.push(depth, RowKind::Block, label, block.span);
                self.nodes(&block.body, depth + 1);
                self.close(row);
            }
            Node::Expression { expr, span } => {
                self.push(depth, RowKind::Expression, format!("{{{}}}", expr), *span);
            }
            Node::Component(element) | Node::Html(element) => {
                let kind = if matches!(node, Node::Component(_)) {
                    RowKind::Component
                } else {
                    RowKind::Element
                };
                let label = if element.is_self_closing() {
                    format!("<{} />", element.name)
                } else {
                    format!("<{}>", element.name)
                };
                let row = self.push(depth, kind, label, element.span);
                self.attributes(&element.attributes, depth + 1);
                self.nodes(element.children(), depth + 1);
                self.close(row);
            }
            Node::DynamicComponent(dynamic) => {
                let target = match &dynamic.target {
                    DynamicTarget::Literal(name) => format!("\"{}\"", name),
                    DynamicTarget::Binding(name) => format!("{{{}}}", name),
                };
                let row = self.push(depth, RowKind::Component, format!("<={} />", target), dynamic.span);
                self.attributes(&dynamic.attributes, depth + 1);
                self.close(row);
            }
            Node::Style(raw) | Node::Script(raw) => {
                let name = if matches!(node, Node::Style(_)) { "style" } else { "script" };
                let label = format!("<{}> ({} bytes)", name, raw.content.len());
                let row = self.push(depth, RowKind::Element, label, raw.span);
                self.attributes(&raw.attributes, depth + 1);
                self.close(row);
            }
            Node::Text { content, span } => {
                self.push(depth, RowKind::Text, format!("\"{}\"", preview(content)), *span);
            }
            Node::Comment { content, span } => {
                let label = format!("<!--{}-->", preview(content));
                self.push(depth, RowKind::Comment, label, *span);
            }
        }
    }

    fn nodes(&mut self, nodes: &[Node], depth: usize) {
        for node in nodes {
            self.node(node, depth);
        }
    }

    fn attributes(&mut self, attributes: &[Attribute], depth: usize) {
        for attribute in attributes {
            let label = match attribute {
                Attribute::Shorthand { name, .. } => format!("{{{}}}", name),
                Attribute::Expression { name, value, .. } => format!("{}={{{}}}", name, value),
                Attribute::String { name, value, .. } => format!("{}=\"{}\"", name, value),
                Attribute::Boolean { name, .. } => name.clone(),
            };
            self.push(depth, RowKind::Attribute, label, attribute.span());
        }
    }
}

fn statement_label(statement: &Statement) -> String {
    match statement {
        Statement::Import { component, source, .. } => {
            format!("import {} from \"{}\"", component, source)
        }
        Statement::Prop { name, default: Some(default), .. } => format!("prop {} = {}", name, default),
        Statement::Prop { name, default: None, .. } => format!("prop {}", name),
        Statement::Let {
            is_const,
            name,
            value,
            ..
        } => {
            let keyword = if *is_const { "const" } else { "let" };
            format!("{} {} = {}", keyword, name, value)
        }
        Statement::Expression { expr, .. } => expr.to_string(),
    }
}

/// Single-line, length-capped preview of free text
fn preview(text: &str) -> String {
    let flat: String = text
        .chars()
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .collect();
    if flat.chars().count() > PREVIEW_CHARS {
        let truncated: String = flat.chars().take(PREVIEW_CHARS).collect();
        format!("{}…", truncated)
    } else {
        flat
    }
}
