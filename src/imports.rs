//! Import editor: make sure requested imports exist, adding only if absent.
//!
//! Placement mirrors what `astutil.AddNamedImport` followed by gofmt
//! produces: the new spec joins the group of the existing import with the
//! longest shared path prefix, at its sorted position.

use crate::config::Import;
use crate::edit::Edit;
use crate::go::{GoSource, GoSyntaxError};
use tree_sitter::Node;

/// What happened to one requested import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    Added,
    AlreadyPresent,
}

/// The edit needed for one import, or why none is needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportPlan {
    Edit(Edit),
    NoOp(String),
}

/// An existing import spec, flattened out of the tree.
#[derive(Debug, Clone)]
struct SpecInfo {
    name: Option<String>,
    path: String,
    /// Byte range of the spec's whole line(s), newline excluded.
    line_start: usize,
    line_end: usize,
    /// Index of the blank-line/comment separated group within its declaration.
    group: usize,
}

#[derive(Debug, Clone)]
struct DeclInfo {
    byte_start: usize,
    byte_end: usize,
    /// `import ( ... )` rather than a single spec.
    parenthesized: bool,
    specs: Vec<SpecInfo>,
    indent: String,
}

impl DeclInfo {
    /// cgo preambles are bound to the declaration importing "C".
    fn imports_c(&self) -> bool {
        self.specs.iter().any(|spec| spec.path == "C")
    }
}

/// Add every import of `imports` to `source`, in order.
pub fn ensure_imports(
    source: &mut GoSource,
    imports: &[Import],
) -> Result<Vec<(Import, ImportOutcome)>, GoSyntaxError> {
    let mut outcomes = Vec::with_capacity(imports.len());
    for import in imports {
        let outcome = match plan_import(source, import) {
            ImportPlan::Edit(edit) => {
                source.apply(vec![edit])?;
                ImportOutcome::Added
            }
            ImportPlan::NoOp(_) => ImportOutcome::AlreadyPresent,
        };
        outcomes.push((import.clone(), outcome));
    }
    Ok(outcomes)
}

/// Plan the addition of one import against the current tree.
pub fn plan_import(source: &GoSource, import: &Import) -> ImportPlan {
    let alias = import.alias_name();
    let decls = collect_import_decls(source);

    let present = decls
        .iter()
        .flat_map(|decl| &decl.specs)
        .any(|spec| spec.path == import.path && spec.name.as_deref() == alias);
    if present {
        return ImportPlan::NoOp(format!("import {} already present", import));
    }

    let new_spec = spec_text(alias, &import.path);

    let Some((decl_index, spec_index)) = best_match(&decls, &import.path) else {
        return ImportPlan::Edit(new_declaration(source, &new_spec));
    };
    let decl = &decls[decl_index];

    match (decl.parenthesized, spec_index) {
        (true, None) => {
            // An empty `import ()` holding one spec loses its parentheses.
            ImportPlan::Edit(Edit::replace(
                source.text(),
                decl.byte_start,
                decl.byte_end,
                format!("import {new_spec}"),
            ))
        }
        (true, Some(spec_index)) => {
            ImportPlan::Edit(insert_into_group(decl, spec_index, alias, &import.path, &new_spec))
        }
        (false, _) => ImportPlan::Edit(parenthesize(source, decl, alias, &import.path, &new_spec)),
    }
}

fn spec_text(alias: Option<&str>, path: &str) -> String {
    match alias {
        Some(alias) => format!("{alias} \"{path}\""),
        None => format!("\"{path}\""),
    }
}

fn sort_key<'a>(name: Option<&'a str>, path: &'a str) -> (&'a str, &'a str) {
    (path, name.unwrap_or(""))
}

/// Number of `/`-terminated path segments two import paths share.
fn match_len(a: &str, b: &str) -> usize {
    a.bytes()
        .zip(b.bytes())
        .take_while(|(x, y)| x == y)
        .filter(|(x, _)| *x == b'/')
        .count()
}

/// A path whose first element contains a dot (`github.com/...`).
fn is_third_party(path: &str) -> bool {
    path.split('/').next().is_some_and(|first| first.contains('.'))
}

/// Pick the declaration (and spec within it) the new import should join.
///
/// Returns `None` when no declaration can take the import.
fn best_match(decls: &[DeclInfo], path: &str) -> Option<(usize, Option<usize>)> {
    let third_party = is_third_party(path);
    let mut best: Option<(usize, Option<usize>)> = None;
    let mut best_len: Option<usize> = None;

    for (d, decl) in decls.iter().enumerate() {
        if decl.imports_c() {
            continue;
        }
        if decl.specs.is_empty() && best_len.is_none() && best.is_none() {
            best = Some((d, None));
        }

        let mut seen_third_party = false;
        for (s, spec) in decl.specs.iter().enumerate() {
            let n = match_len(&spec.path, path);
            let better = match best_len {
                None => true,
                Some(len) => n > len || (len == 0 && !seen_third_party && third_party),
            };
            if better {
                best_len = Some(n);
                best = Some((d, Some(s)));
            }
            seen_third_party |= is_third_party(&spec.path);
        }
    }
    best
}

fn insert_into_group(
    decl: &DeclInfo,
    anchor: usize,
    alias: Option<&str>,
    path: &str,
    new_spec: &str,
) -> Edit {
    let group = decl.specs[anchor].group;
    let members: Vec<&SpecInfo> = decl.specs.iter().filter(|s| s.group == group).collect();
    let key = sort_key(alias, path);

    let indent = &decl.indent;
    match members
        .iter()
        .find(|s| sort_key(s.name.as_deref(), &s.path) > key)
    {
        Some(next) => Edit::insert(next.line_start, format!("{indent}\t{new_spec}\n")),
        None => {
            let last = members.last().map_or(decl.specs[anchor].line_end, |s| s.line_end);
            Edit::insert(last, format!("\n{indent}\t{new_spec}"))
        }
    }
}

/// Turn `import "fmt"` into a parenthesized block holding both specs.
fn parenthesize(
    source: &GoSource,
    decl: &DeclInfo,
    alias: Option<&str>,
    path: &str,
    new_spec: &str,
) -> Edit {
    let indent = &decl.indent;
    let mut entries: Vec<((String, String), String)> = decl
        .specs
        .iter()
        .map(|s| {
            let key = (s.path.clone(), s.name.clone().unwrap_or_default());
            (key, spec_text(s.name.as_deref(), &s.path))
        })
        .collect();
    entries.push((
        (path.to_string(), alias.unwrap_or("").to_string()),
        new_spec.to_string(),
    ));
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    let mut block = String::from("import (\n");
    for (_, text) in &entries {
        block.push_str(&format!("{indent}\t{text}\n"));
    }
    block.push_str(&format!("{indent})"));

    Edit::replace(source.text(), decl.byte_start, decl.byte_end, block)
}

/// Add a fresh `import "path"` declaration after the last import
/// declaration, or after the package clause.
///
/// A comment that starts on the anchor's last line stays on that line.
fn new_declaration(source: &GoSource, new_spec: &str) -> Edit {
    let root = source.root();
    let mut cursor = root.walk();
    let mut package = None;
    let mut last_import = None;
    for child in root.children(&mut cursor) {
        match child.kind() {
            "package_clause" => package = Some(child),
            "import_declaration" => last_import = Some(child),
            _ => {}
        }
    }

    // gofmt keeps consecutive import declarations on adjacent lines.
    let (anchor, separator) = match (last_import, package) {
        (Some(decl), _) => (decl, "\n"),
        (None, Some(clause)) => (clause, "\n\n"),
        (None, None) => return Edit::insert(0, format!("import {new_spec}\n\n")),
    };

    let row = anchor.end_position().row;
    let at = anchor
        .next_sibling()
        .filter(|next| next.kind() == "comment" && next.start_position().row == row)
        .map_or(anchor.end_byte(), |comment| comment.end_byte());

    Edit::insert(at, format!("{separator}import {new_spec}"))
}

fn collect_import_decls(source: &GoSource) -> Vec<DeclInfo> {
    let root = source.root();
    let mut cursor = root.walk();
    root.children(&mut cursor)
        .filter(|n| n.kind() == "import_declaration")
        .map(|decl| decl_info(source, decl))
        .collect()
}

fn decl_info(source: &GoSource, decl: Node<'_>) -> DeclInfo {
    let indent = source.line_indent(decl.start_byte()).to_string();
    let mut info = DeclInfo {
        byte_start: decl.start_byte(),
        byte_end: decl.end_byte(),
        parenthesized: false,
        specs: Vec::new(),
        indent,
    };

    let mut cursor = decl.walk();
    for child in decl.named_children(&mut cursor) {
        match child.kind() {
            "import_spec" => info.specs.extend(spec_info(source, child, 0)),
            "import_spec_list" => {
                info.parenthesized = true;
                info.specs = list_specs(source, child);
            }
            _ => {}
        }
    }
    info
}

/// Specs of a parenthesized list, grouped the way gofmt sorts them: a
/// blank line or a comment-only line starts a new group.
fn list_specs(source: &GoSource, list: Node<'_>) -> Vec<SpecInfo> {
    let mut specs = Vec::new();
    let mut group = 0;
    let mut last_row: Option<usize> = None;

    let mut cursor = list.walk();
    for child in list.named_children(&mut cursor) {
        let row = child.start_position().row;
        match child.kind() {
            "import_spec" => {
                if let Some(last) = last_row {
                    if row > last + 1 {
                        group += 1;
                    }
                }
                specs.extend(spec_info(source, child, group));
                last_row = Some(child.end_position().row);
            }
            "comment" => {
                let trailing = last_row == Some(row);
                if !trailing {
                    group += 1;
                    last_row = None;
                }
            }
            _ => {}
        }
    }
    specs
}

fn spec_info(source: &GoSource, spec: Node<'_>, group: usize) -> Option<SpecInfo> {
    let path = spec.child_by_field_name("path")?;
    let name = spec
        .child_by_field_name("name")
        .map(|n| source.node_text(n).to_string());

    let line_start = source.line_start(spec.start_byte());
    let text = source.text();
    let line_end = text[spec.end_byte()..]
        .find('\n')
        .map_or(text.len(), |i| spec.end_byte() + i);

    Some(SpecInfo {
        name,
        path: unquote(source.node_text(path)).to_string(),
        line_start,
        line_end,
        group,
    })
}

fn unquote(literal: &str) -> &str {
    literal
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .or_else(|| literal.strip_prefix('`').and_then(|s| s.strip_suffix('`')))
        .unwrap_or(literal)
}
