use crate::edit::{splice, Edit};
use crate::go::errors::GoSyntaxError;
use crate::go::parser::GoParser;
use tree_sitter::{Node, Tree};

/// One parsed Go file: source text plus its syntax tree.
///
/// The tree is always in sync with the text. [`GoSource::apply`] splices a
/// batch of edits and reparses, so callers never hold stale node offsets
/// across a mutation.
pub struct GoSource {
    text: String,
    tree: Tree,
    parser: GoParser,
}

/// Information about an ERROR or MISSING node in the parse tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorNode {
    pub byte_start: usize,
    pub byte_end: usize,
    /// Zero-based row
    pub line: usize,
    /// Zero-based byte column
    pub column: usize,
}

impl GoSource {
    /// Parse `text`, refusing sources that contain syntax errors.
    pub fn parse(text: impl Into<String>) -> Result<Self, GoSyntaxError> {
        let source = Self::parse_lenient(text)?;
        source.check_syntax()?;
        Ok(source)
    }

    /// Parse `text` without rejecting syntax errors.
    pub fn parse_lenient(text: impl Into<String>) -> Result<Self, GoSyntaxError> {
        let text = text.into();
        let mut parser = GoParser::new()?;
        let tree = parser.parse(&text)?;
        Ok(Self { text, tree, parser })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }

    /// Get the root node of the tree.
    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// Extract text for a node's byte range.
    pub fn node_text(&self, node: Node<'_>) -> &str {
        &self.text[node.byte_range()]
    }

    /// Byte offset of the start of the line containing `byte`.
    pub fn line_start(&self, byte: usize) -> usize {
        self.text[..byte].rfind('\n').map_or(0, |i| i + 1)
    }

    /// Leading whitespace of the line containing `byte`.
    pub fn line_indent(&self, byte: usize) -> &str {
        let start = self.line_start(byte);
        let line = &self.text[start..];
        let width = line
            .find(|c: char| c != ' ' && c != '\t')
            .unwrap_or(line.len());
        &line[..width]
    }

    /// Check if the tree contains any ERROR or MISSING nodes.
    pub fn has_errors(&self) -> bool {
        self.tree.root_node().has_error()
    }

    /// Get all ERROR and MISSING nodes in the tree.
    pub fn error_nodes(&self) -> Vec<ErrorNode> {
        let mut errors = Vec::new();
        collect_error_nodes(self.tree.root_node(), &mut errors);
        errors
    }

    /// Fail with the first syntax error, if any.
    pub fn check_syntax(&self) -> Result<(), GoSyntaxError> {
        if !self.has_errors() {
            return Ok(());
        }
        let errors = self.error_nodes();
        let Some(first) = errors.first() else {
            return Err(GoSyntaxError::ParseFailed);
        };
        match errors.len() {
            1 => Err(GoSyntaxError::SyntaxError {
                line: first.line + 1,
                column: first.column + 1,
            }),
            count => Err(GoSyntaxError::MultipleSyntaxErrors {
                count,
                line: first.line + 1,
                column: first.column + 1,
            }),
        }
    }

    /// Splice `edits` into the text and reparse.
    ///
    /// An empty batch is a no-op and keeps the current tree.
    pub fn apply(&mut self, edits: Vec<Edit>) -> Result<(), GoSyntaxError> {
        if edits.is_empty() {
            return Ok(());
        }
        let text = splice(&self.text, edits)?;
        self.tree = self.parser.parse(&text)?;
        self.text = text;
        Ok(())
    }
}

fn collect_error_nodes(node: Node<'_>, errors: &mut Vec<ErrorNode>) {
    if node.is_error() || node.is_missing() {
        errors.push(ErrorNode {
            byte_start: node.start_byte(),
            byte_end: node.end_byte(),
            line: node.start_position().row,
            column: node.start_position().column,
        });
        return;
    }

    if !node.has_error() {
        return;
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_error_nodes(child, errors);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rejects_broken_source() {
        let result = GoSource::parse("package main\n\ntype T struct {\n");
        assert!(result.is_err());
    }

    #[test]
    fn apply_reparses() {
        let mut source = GoSource::parse("package main\n").unwrap();
        let end = source.text().len();
        source
            .apply(vec![Edit::insert(end, "\ntype T struct{}\n")])
            .unwrap();

        assert_eq!(source.text(), "package main\n\ntype T struct{}\n");
        assert!(!source.has_errors());
        let mut cursor = source.root().walk();
        let kinds: Vec<_> = source
            .root()
            .named_children(&mut cursor)
            .map(|n| n.kind())
            .collect();
        assert_eq!(kinds, vec!["package_clause", "type_declaration"]);
    }

    #[test]
    fn line_indent_of_nested_line() {
        let source = GoSource::parse("package main\n\nfunc f() {\n\tx := 1\n\t_ = x\n}\n").unwrap();
        let offset = source.text().find("x :=").unwrap();
        assert_eq!(source.line_indent(offset), "\t");
        assert_eq!(source.line_start(offset), offset - 1);
    }
}
