//! Textual type references such as `string`, `time.Time` or `*pkg.Foo`.

use std::fmt;

/// A parsed type reference: optional pointer marker, optional package
/// qualifier, base identifier.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TypeRef {
    pub pointer: bool,
    pub qualifier: Option<String>,
    pub base: String,
}

impl TypeRef {
    /// Split a type reference string.
    ///
    /// Only a single leading `*` and the first `.` are significant: `a.b.c`
    /// yields qualifier `a` and base `b.c`. Any input is accepted.
    pub fn parse(input: &str) -> Self {
        let (pointer, rest) = match input.strip_prefix('*') {
            Some(rest) => (true, rest),
            None => (false, input),
        };

        match rest.split_once('.') {
            Some((qualifier, base)) => Self {
                pointer,
                qualifier: Some(qualifier.to_string()),
                base: base.to_string(),
            },
            None => Self {
                pointer,
                qualifier: None,
                base: rest.to_string(),
            },
        }
    }

    pub fn is_qualified(&self) -> bool {
        self.qualifier.is_some()
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.pointer {
            f.write_str("*")?;
        }
        if let Some(qualifier) = &self.qualifier {
            write!(f, "{qualifier}.")?;
        }
        f.write_str(&self.base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn plain_identifier() {
        let t = TypeRef::parse("string");
        assert!(!t.pointer);
        assert_eq!(t.qualifier, None);
        assert_eq!(t.base, "string");
    }

    #[test]
    fn qualified_pointer() {
        let t = TypeRef::parse("*pkg.Foo");
        assert!(t.pointer);
        assert_eq!(t.qualifier.as_deref(), Some("pkg"));
        assert_eq!(t.base, "Foo");
        assert_eq!(t.to_string(), "*pkg.Foo");
    }

    #[test]
    fn only_first_dot_splits() {
        let t = TypeRef::parse("a.b.c");
        assert_eq!(t.qualifier.as_deref(), Some("a"));
        assert_eq!(t.base, "b.c");
    }

    #[test]
    fn empty_input_gives_empty_base() {
        let t = TypeRef::parse("");
        assert_eq!(t, TypeRef::default());

        let star = TypeRef::parse("*");
        assert!(star.pointer);
        assert_eq!(star.base, "");
    }

    #[test]
    fn only_one_star_is_consumed() {
        let t = TypeRef::parse("**int");
        assert!(t.pointer);
        assert_eq!(t.base, "*int");
    }

    proptest! {
        #[test]
        fn reparse_of_rendered_is_stable(input in "\\*?[a-zA-Z_.*\\[\\]]{0,16}") {
            let parsed = TypeRef::parse(&input);
            let reparsed = TypeRef::parse(&parsed.to_string());
            prop_assert_eq!(parsed, reparsed);
        }
    }
}
