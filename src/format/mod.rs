//! Canonical layout for the regions we touch, and write-back.
//!
//! Untouched text is emitted exactly as parsed; the file as a whole is never
//! normalized. Struct field lines that receive new neighbours are laid out
//! the way gofmt lays them out: the cells `names | type | tag | comment`
//! aligned with [`align_cells`].

pub mod align;
pub mod writer;

pub use align::align_cells;
pub use writer::{render, write_atomic, FormatError, WriteError};

/// One struct field, split into the parts gofmt aligns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldLine {
    /// Declared names; empty for an embedded field.
    pub names: Vec<String>,
    /// Type text, including a leading `*` for embedded pointers.
    pub ty: String,
    /// Tag literal including its quotes or backticks.
    pub tag: Option<String>,
    /// Trailing comment on the same line.
    pub comment: Option<String>,
}

impl FieldLine {
    pub fn new(name: impl Into<String>, ty: impl Into<String>, tag: Option<String>) -> Self {
        Self {
            names: vec![name.into()],
            ty: ty.into(),
            tag,
            comment: None,
        }
    }

    /// Cells as go/printer emits them.
    ///
    /// A named field without a tag uses its one spare separator in front of
    /// the comment; an embedded field has two spare separators, leaving an
    /// empty column before the comment.
    pub fn cells(&self) -> Vec<String> {
        let mut cells = Vec::with_capacity(4);
        let mut spare = if self.names.is_empty() {
            cells.push(self.ty.clone());
            2
        } else {
            cells.push(self.names.join(", "));
            cells.push(self.ty.clone());
            1
        };

        if let Some(tag) = &self.tag {
            cells.push(tag.clone());
            spare = 0;
        }

        if let Some(comment) = &self.comment {
            // The first spare separator doubles as the comment separator.
            for _ in 1..spare {
                cells.push(String::new());
            }
            cells.push(comment.clone());
        }
        cells
    }
}

/// Lay out a contiguous run of field lines, each prefixed with `indent`.
pub fn render_fields(indent: &str, fields: &[FieldLine]) -> Vec<String> {
    let rows: Vec<Vec<String>> = fields.iter().map(FieldLine::cells).collect();
    align_cells(&rows)
        .into_iter()
        .map(|line| format!("{indent}{line}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_field_cells() {
        let mut field = FieldLine::new("Name", "string", None);
        assert_eq!(field.cells(), vec!["Name", "string"]);

        field.comment = Some("// the name".to_string());
        assert_eq!(field.cells(), vec!["Name", "string", "// the name"]);

        field.tag = Some("`json:\"name\"`".to_string());
        assert_eq!(
            field.cells(),
            vec!["Name", "string", "`json:\"name\"`", "// the name"]
        );
    }

    #[test]
    fn embedded_field_cells() {
        let field = FieldLine {
            names: Vec::new(),
            ty: "*Base".to_string(),
            tag: None,
            comment: Some("// base".to_string()),
        };
        assert_eq!(field.cells(), vec!["*Base", "", "// base"]);
    }

    #[test]
    fn multiple_names_are_comma_joined() {
        let field = FieldLine {
            names: vec!["X".to_string(), "Y".to_string()],
            ty: "int".to_string(),
            tag: None,
            comment: None,
        };
        assert_eq!(field.cells(), vec!["X, Y", "int"]);
    }

    #[test]
    fn render_fields_indents_and_aligns() {
        let lines = render_fields(
            "\t",
            &[
                FieldLine::new("Name", "string", None),
                FieldLine::new(
                    "CreatedAt",
                    "time.Time",
                    Some("`json:\"created_at\"`".to_string()),
                ),
            ],
        );
        assert_eq!(
            lines,
            vec![
                "\tName      string",
                "\tCreatedAt time.Time `json:\"created_at\"`",
            ]
        );
    }
}
