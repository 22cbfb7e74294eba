use tree_sitter::Node;

/// Pre-order visitor over syntax nodes.
///
/// `visit` returns whether the walk should descend into the node's
/// children. Closures of the same shape are visitors too.
pub trait Visitor<'tree> {
    fn visit(&mut self, node: Node<'tree>) -> bool;
}

impl<'tree, F> Visitor<'tree> for F
where
    F: FnMut(Node<'tree>) -> bool,
{
    fn visit(&mut self, node: Node<'tree>) -> bool {
        self(node)
    }
}

/// Walk the subtree rooted at `root` in document order.
pub fn walk<'tree, V>(root: Node<'tree>, visitor: &mut V)
where
    V: Visitor<'tree> + ?Sized,
{
    let mut cursor = root.walk();
    loop {
        let descend = visitor.visit(cursor.node());
        if descend && cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::go::GoSource;

    #[test]
    fn visits_nested_type_specs_in_order() {
        let source = GoSource::parse(
            "package main\n\ntype A struct{}\n\nfunc f() {\n\ttype B int\n\t_ = B(0)\n}\n",
        )
        .unwrap();

        let mut names = Vec::new();
        walk(source.root(), &mut |node: Node<'_>| {
            if node.kind() == "type_spec" {
                if let Some(name) = node.child_by_field_name("name") {
                    names.push(source.node_text(name).to_string());
                }
            }
            true
        });

        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn returning_false_skips_children() {
        let source = GoSource::parse("package main\n\nfunc f() {\n\ttype B int\n}\n").unwrap();

        let mut seen_type_spec = false;
        walk(source.root(), &mut |node: Node<'_>| {
            if node.kind() == "type_spec" {
                seen_type_spec = true;
            }
            node.kind() != "function_declaration"
        });

        assert!(!seen_type_spec);
    }
}
