//! Struct field augmenter: append missing fields to named struct types.

use crate::config::{FieldSpec, StructSpec};
use crate::edit::Edit;
use crate::format::{render_fields, FieldLine};
use crate::go::{walk, GoSource, GoSyntaxError, Visitor};
use crate::typeref::TypeRef;
use tree_sitter::Node;

/// What the augmenter did (or skipped) for one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructEvent {
    FieldAdded { type_name: String, field: String },
    FieldExists { type_name: String, field: String },
    /// The name matched a declaration whose type is not a struct.
    NotAStruct { type_name: String },
    /// No declaration carries this name.
    StructNotFound { type_name: String },
}

/// Append every missing field of `specs` to the matching struct
/// declarations of `source`.
///
/// Nothing here is an error: existing fields, missing declarations and
/// non-struct declarations are reported as events and skipped.
pub fn augment_structs(
    source: &mut GoSource,
    specs: &[StructSpec],
) -> Result<Vec<StructEvent>, GoSyntaxError> {
    let (edits, events) = plan_structs(source, specs);
    source.apply(edits)?;
    Ok(events)
}

/// Collects every type declaration, including grouped and function-local ones.
#[derive(Default)]
struct TypeDeclCollector<'tree> {
    found: Vec<Node<'tree>>,
}

impl<'tree> Visitor<'tree> for TypeDeclCollector<'tree> {
    fn visit(&mut self, node: Node<'tree>) -> bool {
        if matches!(node.kind(), "type_spec" | "type_alias") {
            self.found.push(node);
        }
        true
    }
}

/// Compute the edits for all matching declarations without mutating.
pub fn plan_structs(source: &GoSource, specs: &[StructSpec]) -> (Vec<Edit>, Vec<StructEvent>) {
    let mut edits = Vec::new();
    let mut events = Vec::new();
    let mut matched = vec![false; specs.len()];

    let mut collector = TypeDeclCollector::default();
    walk(source.root(), &mut collector);

    for decl in collector.found {
        let Some(name_node) = decl.child_by_field_name("name") else {
            continue;
        };
        let type_name = source.node_text(name_node);

        let wanted: Vec<&StructSpec> = specs
            .iter()
            .zip(matched.iter_mut())
            .filter(|(spec, _)| spec.name == type_name)
            .map(|(spec, seen)| {
                *seen = true;
                spec
            })
            .collect();
        if wanted.is_empty() {
            continue;
        }

        let field_list = decl
            .child_by_field_name("type")
            .filter(|ty| ty.kind() == "struct_type")
            .and_then(|ty| child_of_kind(ty, "field_declaration_list"));
        let Some(field_list) = field_list else {
            events.push(StructEvent::NotAStruct {
                type_name: type_name.to_string(),
            });
            continue;
        };

        let mut names = existing_field_names(source, field_list);
        let mut additions = Vec::new();
        for field in wanted.iter().flat_map(|spec| &spec.fields) {
            if names.iter().any(|n| n == &field.name) {
                events.push(StructEvent::FieldExists {
                    type_name: type_name.to_string(),
                    field: field.name.clone(),
                });
                continue;
            }
            names.push(field.name.clone());
            additions.push(new_field(field));
            events.push(StructEvent::FieldAdded {
                type_name: type_name.to_string(),
                field: field.name.clone(),
            });
        }

        if !additions.is_empty() {
            edits.push(append_fields(source, field_list, additions));
        }
    }

    for (spec, seen) in specs.iter().zip(&matched) {
        if !seen {
            events.push(StructEvent::StructNotFound {
                type_name: spec.name.clone(),
            });
        }
    }

    (edits, events)
}

/// Build the field for a spec: identifier, `pkg.Name`, or either behind `*`.
fn new_field(field: &FieldSpec) -> FieldLine {
    let ty = TypeRef::parse(&field.ty);
    let tag = (!field.tags.is_empty()).then(|| format!("`{}`", field.tags));
    FieldLine::new(field.name.clone(), ty.to_string(), tag)
}

fn child_of_kind<'tree>(node: Node<'tree>, kind: &str) -> Option<Node<'tree>> {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find(|child| child.kind() == kind);
    found
}

/// First declared name of every field; embedded fields have none.
fn existing_field_names(source: &GoSource, field_list: Node<'_>) -> Vec<String> {
    let mut cursor = field_list.walk();
    field_list
        .named_children(&mut cursor)
        .filter(|child| child.kind() == "field_declaration")
        .filter_map(|decl| decl.child_by_field_name("name"))
        .map(|name| source.node_text(name).to_string())
        .collect()
}

/// One physical line of a struct body.
struct BodyLine<'tree> {
    field: Option<Node<'tree>>,
    comment: Option<Node<'tree>>,
    start_row: usize,
    end_row: usize,
    end_byte: usize,
    /// More than one field on the line, or a comment that spans lines.
    irregular: bool,
}

impl<'tree> BodyLine<'tree> {
    fn new(node: Node<'tree>) -> Self {
        let is_field = node.kind() == "field_declaration";
        let start_row = node.start_position().row;
        let end_row = node.end_position().row;
        Self {
            field: is_field.then_some(node),
            comment: (!is_field).then_some(node),
            start_row,
            end_row,
            end_byte: node.end_byte(),
            irregular: !is_field && start_row != end_row,
        }
    }

    fn absorb(&mut self, node: Node<'tree>) {
        let trailing_comment = node.kind() == "comment"
            && self.field.is_some()
            && self.comment.is_none()
            && node.start_position().row == node.end_position().row;
        if trailing_comment {
            self.comment = Some(node);
        } else {
            self.irregular = true;
        }
        self.end_row = node.end_position().row;
        self.end_byte = node.end_byte();
    }

    /// A single-line field, the only thing gofmt aligns with its neighbours.
    fn is_aligned_field(&self) -> bool {
        self.field.is_some() && !self.irregular && self.start_row == self.end_row
    }
}

fn body_lines<'tree>(field_list: Node<'tree>) -> Vec<BodyLine<'tree>> {
    let mut lines: Vec<BodyLine<'tree>> = Vec::new();
    let mut cursor = field_list.walk();
    for child in field_list.named_children(&mut cursor) {
        if !matches!(child.kind(), "field_declaration" | "comment") {
            continue;
        }
        match lines.last_mut() {
            Some(last) if last.end_row == child.start_position().row => last.absorb(child),
            _ => lines.push(BodyLine::new(child)),
        }
    }
    lines
}

fn field_line(source: &GoSource, decl: Node<'_>, comment: Option<Node<'_>>) -> FieldLine {
    let mut cursor = decl.walk();
    let names: Vec<String> = decl
        .children_by_field_name("name", &mut cursor)
        .map(|name| source.node_text(name).to_string())
        .collect();

    // An embedded pointer's `*` is not part of the type node.
    let ty = match decl.child_by_field_name("type") {
        Some(ty) if names.is_empty() => source.text()[decl.start_byte()..ty.end_byte()].to_string(),
        Some(ty) => source.node_text(ty).to_string(),
        None => String::new(),
    };

    FieldLine {
        names,
        ty,
        tag: decl
            .child_by_field_name("tag")
            .map(|tag| source.node_text(tag).to_string()),
        comment: comment.map(|c| source.node_text(c).to_string()),
    }
}

/// Edit appending `additions` to the end of a struct body.
///
/// The trailing alignment section (single-line fields on consecutive lines
/// right before the new ones) is re-laid out together with the additions.
/// A one-line body is expanded to one field per line.
fn append_fields(source: &GoSource, field_list: Node<'_>, additions: Vec<FieldLine>) -> Edit {
    let open_end = field_list.start_byte() + 1;
    let close_start = field_list.end_byte() - 1;
    let one_line = field_list.start_position().row == field_list.end_position().row;
    let indent = source.line_indent(close_start).to_string();
    let field_indent = format!("{indent}\t");

    if one_line {
        let mut rendered = Vec::new();
        let mut run: Vec<FieldLine> = Vec::new();
        let mut cursor = field_list.walk();
        for child in field_list.named_children(&mut cursor) {
            match child.kind() {
                "field_declaration" => run.push(field_line(source, child, None)),
                "comment" => match run.last_mut() {
                    Some(last) if last.comment.is_none() => {
                        last.comment = Some(source.node_text(child).to_string());
                    }
                    _ => {
                        rendered.extend(render_fields(&field_indent, &run));
                        run.clear();
                        rendered.push(format!("{field_indent}{}", source.node_text(child)));
                    }
                },
                _ => {}
            }
        }
        run.extend(additions);
        rendered.extend(render_fields(&field_indent, &run));

        // gofmt writes `struct{}` but `struct {` before a multi-line body.
        let start = field_list
            .prev_sibling()
            .map_or(field_list.start_byte(), |keyword| keyword.end_byte());
        let body = format!(" {{\n{}\n{indent}}}", rendered.join("\n"));
        return Edit::replace(source.text(), start, field_list.end_byte(), body);
    }

    let lines = body_lines(field_list);
    let section_len = trailing_section_len(&lines);
    if section_len == 0 {
        let anchor = lines.last().map_or(open_end, |line| line.end_byte);
        let rendered = render_fields(&field_indent, &additions);
        return Edit::insert(anchor, format!("\n{}", rendered.join("\n")));
    }

    let section = &lines[lines.len() - section_len..];
    let mut fields: Vec<FieldLine> = section
        .iter()
        .filter_map(|line| line.field.map(|decl| field_line(source, decl, line.comment)))
        .collect();
    fields.extend(additions);

    let start = section
        .first()
        .and_then(|line| line.field)
        .map_or(open_end, |decl| source.line_start(decl.start_byte()));
    let end = section.last().map_or(open_end, |line| line.end_byte);

    Edit::replace(
        source.text(),
        start,
        end,
        render_fields(&field_indent, &fields).join("\n"),
    )
}

/// Number of trailing lines that form one gofmt alignment section.
fn trailing_section_len(lines: &[BodyLine<'_>]) -> usize {
    let mut len = 0;
    let mut next_row: Option<usize> = None;
    for line in lines.iter().rev() {
        if !line.is_aligned_field() {
            break;
        }
        if let Some(row) = next_row {
            if line.end_row + 1 != row {
                break;
            }
        }
        next_row = Some(line.start_row);
        len += 1;
    }
    len
}
