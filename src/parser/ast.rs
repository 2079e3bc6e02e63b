// AST (Abstract Syntax Tree) definitions for Pico templates

use serde::Serialize;
use std::fmt;

/// Byte range into the source buffer (`start..end`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Smallest span covering both `self` and `other`
    pub fn to(self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Source location information for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(offset: usize, line: usize, column: usize) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Maps byte offsets to 1-based line/column pairs.
///
/// Columns count characters, not bytes.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            source
                .bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self { line_starts }
    }

    pub fn location(&self, source: &str, offset: usize) -> SourceLocation {
        let offset = offset.min(source.len());
        let line = match self.line_starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(next) => next - 1,
        };
        let line_start = self.line_starts[line];
        let column = source
            .get(line_start..offset)
            .map(|s| s.chars().count())
            .unwrap_or(offset - line_start);
        SourceLocation::new(offset, line + 1, column + 1)
    }
}

/// Root of a parsed template
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Document {
    pub nodes: Vec<Node>,
}

impl Document {
    pub fn new() -> Self {
        Document::default()
    }

    pub fn frontmatter(&self) -> Option<&Frontmatter> {
        self.nodes.iter().find_map(|node| match node {
            Node::Frontmatter(fm) => Some(fm),
            _ => None,
        })
    }
}

/// Template-level nodes
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    Frontmatter(Frontmatter),
    If(IfBlock),
    For(ForBlock),
    Expression { expr: Expr, span: Span },
    Component(Element),
    DynamicComponent(DynamicComponent),
    Style(RawElement),
    Script(RawElement),
    Html(Element),
    Text { content: String, span: Span },
    Comment { content: String, span: Span },
}

impl Node {
    pub fn span(&self) -> Span {
        match self {
            Node::Frontmatter(fm) => fm.span,
            Node::If(block) => block.span,
            Node::For(block) => block.span,
            Node::Expression { span, .. } => *span,
            Node::Component(el) | Node::Html(el) => el.span,
            Node::DynamicComponent(dc) => dc.span,
            Node::Style(raw) | Node::Script(raw) => raw.span,
            Node::Text { span, .. } => *span,
            Node::Comment { span, .. } => *span,
        }
    }

    /// Short label for the node kind, used by outlines and diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Frontmatter(_) => "frontmatter",
            Node::If(_) => "if",
            Node::For(_) => "for",
            Node::Expression { .. } => "expression",
            Node::Component(_) => "component",
            Node::DynamicComponent(_) => "dynamic component",
            Node::Style(_) => "style",
            Node::Script(_) => "script",
            Node::Html(_) => "element",
            Node::Text { .. } => "text",
            Node::Comment { .. } => "comment",
        }
    }
}

/// `---` delimited preamble
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frontmatter {
    pub statements: Vec<Statement>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Statement {
    Import {
        component: String,
        source: String,
        span: Span,
    },
    Prop {
        name: String,
        default: Option<Expr>,
        span: Span,
    },
    Let {
        is_const: bool,
        name: String,
        value: Expr,
        span: Span,
    },
    Expression {
        expr: Expr,
        span: Span,
    },
}

impl Statement {
    pub fn span(&self) -> Span {
        match self {
            Statement::Import { span, .. }
            | Statement::Prop { span, .. }
            | Statement::Let { span, .. }
            | Statement::Expression { span, .. } => *span,
        }
    }
}

/// `{if}` … `{else if}` … `{else}` … `{/if}`
///
/// Only the last branch may lack a guard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IfBlock {
    pub branches: Vec<IfBranch>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IfBranch {
    pub guard: Option<Expr>,
    pub body: Vec<Node>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForBlock {
    pub binding: String,
    pub source: Expr,
    pub body: Vec<Node>,
    pub span: Span,
}

/// Component or HTML element. `children == None` means self-closing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<Attribute>,
    pub children: Option<Vec<Node>>,
    pub span: Span,
}

impl Element {
    pub fn is_self_closing(&self) -> bool {
        self.children.is_none()
    }

    pub fn children(&self) -> &[Node] {
        self.children.as_deref().unwrap_or(&[])
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|attr| attr.name() == name)
    }
}

/// `<="tag" … />` or `<={binding} … />`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DynamicComponent {
    pub target: DynamicTarget,
    pub attributes: Vec<Attribute>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DynamicTarget {
    Literal(String),
    Binding(String),
}

/// `<style>` / `<script>` with its body kept verbatim
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawElement {
    pub attributes: Vec<Attribute>,
    pub content: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    /// `{name}`, equivalent to `name={name}`
    Shorthand { name: String, span: Span },
    Expression { name: String, value: Expr, span: Span },
    String { name: String, value: String, span: Span },
    Boolean { name: String, span: Span },
}

impl Attribute {
    pub fn name(&self) -> &str {
        match self {
            Attribute::Shorthand { name, .. }
            | Attribute::Expression { name, .. }
            | Attribute::String { name, .. }
            | Attribute::Boolean { name, .. } => name,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Attribute::Shorthand { span, .. }
            | Attribute::Expression { span, .. }
            | Attribute::String { span, .. }
            | Attribute::Boolean { span, .. } => *span,
        }
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    // Logical
    Or,
    And,
    // Equality / relational
    StrictEq,
    StrictNe,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Or => "||",
            BinaryOp::And => "&&",
            BinaryOp::StrictEq => "===",
            BinaryOp::StrictNe => "!==",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
        }
    }
}

/// Prefix operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryOp {
    Not,   // !x
    Neg,   // -x
    Plus,  // +x
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Not => "!",
            UnaryOp::Neg => "-",
            UnaryOp::Plus => "+",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn as_identifier(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Identifier(name) => Some(name),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExprKind {
    Identifier(String),
    Number(f64),
    String(String),
    Boolean(bool),
    Null,
    Undefined,
    Template(Vec<TemplatePart>),
    Member {
        object: Box<Expr>,
        property: String,
        optional: bool,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Ternary {
        condition: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },
    Array(Vec<Expr>),
    Object(Vec<Property>),
    Paren(Box<Expr>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplatePart {
    Text(String),
    Substitution(Expr),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Property {
    pub key: PropertyKey,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKey {
    Identifier(String),
    String(String),
}

/// Renders the expression back as source text with every binary and ternary
/// operation wrapped in parentheses, so the printed form shows the tree shape.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Identifier(name) => write!(f, "{}", name),
            ExprKind::Number(n) => write!(f, "{}", n),
            ExprKind::String(s) => write!(f, "{:?}", s),
            ExprKind::Boolean(b) => write!(f, "{}", b),
            ExprKind::Null => write!(f, "null"),
            ExprKind::Undefined => write!(f, "undefined"),
            ExprKind::Template(parts) => {
                write!(f, "`")?;
                for part in parts {
                    match part {
                        TemplatePart::Text(text) => write!(f, "{}", text)?,
                        TemplatePart::Substitution(expr) => write!(f, "${{{}}}", expr)?,
                    }
                }
                write!(f, "`")
            }
            ExprKind::Member {
                object,
                property,
                optional,
            } => {
                let dot = if *optional { "?." } else { "." };
                write!(f, "{}{}{}", object, dot, property)
            }
            ExprKind::Call { callee, args } => {
                write!(f, "{}(", callee)?;
                write_list(f, args)?;
                write!(f, ")")
            }
            ExprKind::Binary { op, left, right } => {
                write!(f, "({} {} {})", left, op.symbol(), right)
            }
            ExprKind::Unary { op, operand } => write!(f, "{}{}", op.symbol(), operand),
            ExprKind::Ternary {
                condition,
                then_branch,
                else_branch,
            } => write!(f, "({} ? {} : {})", condition, then_branch, else_branch),
            ExprKind::Array(items) => {
                write!(f, "[")?;
                write_list(f, items)?;
                write!(f, "]")
            }
            ExprKind::Object(props) => {
                write!(f, "{{")?;
                for (i, prop) in props.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    match &prop.key {
                        PropertyKey::Identifier(name) => write!(f, "{}: {}", name, prop.value)?,
                        PropertyKey::String(name) => write!(f, "{:?}: {}", name, prop.value)?,
                    }
                }
                write!(f, "}}")
            }
            ExprKind::Paren(inner) => write!(f, "{}", inner),
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[Expr]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_index_locations() {
        let source = "ab\ncd\n\nx";
        let index = LineIndex::new(source);

        assert_eq!(index.location(source, 0), SourceLocation::new(0, 1, 1));
        assert_eq!(index.location(source, 1), SourceLocation::new(1, 1, 2));
        assert_eq!(index.location(source, 3), SourceLocation::new(3, 2, 1));
        assert_eq!(index.location(source, 6), SourceLocation::new(6, 3, 1));
        assert_eq!(index.location(source, 7), SourceLocation::new(7, 4, 1));
        // Offsets past the end clamp to the end of input
        assert_eq!(index.location(source, 99), SourceLocation::new(8, 4, 2));
    }

    #[test]
    fn test_line_index_counts_characters() {
        let source = "é{x}";
        let index = LineIndex::new(source);
        // 'é' is two bytes but one column
        assert_eq!(index.location(source, 2).column, 2);
    }

    #[test]
    fn test_span_union() {
        let a = Span::new(4, 6);
        let b = Span::new(1, 5);
        assert_eq!(a.to(b), Span::new(1, 6));
        assert_eq!(a.len(), 2);
    }
}
