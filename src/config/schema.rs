use serde::Deserialize;
use std::fmt;
use std::path::Path;

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub rules: Vec<Rule>,
}

impl Config {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        for (index, rule) in self.rules.iter().enumerate() {
            let missing = |field: String| ValidationIssue::MissingField {
                rule: index,
                file: rule.file.clone(),
                field,
            };

            if rule.file.trim().is_empty() {
                issues.push(missing("file".to_string()));
            } else if Path::new(&rule.file).is_absolute() {
                issues.push(ValidationIssue::InvalidValue {
                    rule: index,
                    file: rule.file.clone(),
                    message: "file must be relative to the root path".to_string(),
                });
            }

            for (i, import) in rule.imports.iter().enumerate() {
                if import.path.trim().is_empty() {
                    issues.push(missing(format!("imports[{i}].path")));
                }
            }

            for (s, spec) in rule.structs.iter().enumerate() {
                if spec.name.trim().is_empty() {
                    issues.push(missing(format!("structs[{s}].name")));
                }
                for (f, field) in spec.fields.iter().enumerate() {
                    if field.name.trim().is_empty() {
                        issues.push(missing(format!("structs[{s}].fields[{f}].name")));
                    }
                    if field.ty.trim().is_empty() {
                        issues.push(missing(format!("structs[{s}].fields[{f}].type")));
                    }
                }
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }
}

/// One target file and what to add to it.
#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct Rule {
    pub file: String,
    #[serde(default)]
    pub imports: Vec<Import>,
    #[serde(default)]
    pub structs: Vec<StructSpec>,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct Import {
    pub path: String,
    /// Empty means the unaliased form.
    #[serde(default)]
    pub alias: String,
}

impl Import {
    pub fn alias_name(&self) -> Option<&str> {
        (!self.alias.is_empty()).then_some(self.alias.as_str())
    }
}

impl fmt::Display for Import {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.alias_name() {
            Some(alias) => write!(f, "{alias} \"{}\"", self.path),
            None => write!(f, "\"{}\"", self.path),
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct StructSpec {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    /// Type reference such as `string`, `time.Time` or `*pkg.Foo`.
    #[serde(rename = "type")]
    pub ty: String,
    /// Raw tag text, placed between backticks as-is.
    #[serde(default)]
    pub tags: String,
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    MissingField {
        rule: usize,
        file: String,
        field: String,
    },
    InvalidValue {
        rule: usize,
        file: String,
        message: String,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::MissingField { rule, file, field } => {
                if file.is_empty() {
                    write!(f, "rule #{rule} missing required field '{field}'")
                } else {
                    write!(f, "rule #{rule} ({file}) missing required field '{field}'")
                }
            }
            ValidationIssue::InvalidValue {
                rule,
                file,
                message,
            } => write!(f, "rule #{rule} ({file}) has invalid configuration: {message}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_collects_all_issues() {
        let config = Config {
            rules: vec![Rule {
                file: String::new(),
                imports: vec![Import::default()],
                structs: vec![StructSpec {
                    name: "User".to_string(),
                    fields: vec![FieldSpec {
                        name: "ID".to_string(),
                        ty: " ".to_string(),
                        tags: String::new(),
                    }],
                }],
            }],
        };

        let err = config.validate().unwrap_err();
        let fields: Vec<_> = err
            .issues
            .iter()
            .filter_map(|issue| match issue {
                ValidationIssue::MissingField { field, .. } => Some(field.as_str()),
                ValidationIssue::InvalidValue { .. } => None,
            })
            .collect();
        assert_eq!(
            fields,
            vec!["file", "imports[0].path", "structs[0].fields[0].type"]
        );
    }

    #[test]
    fn absolute_file_is_rejected() {
        let config = Config {
            rules: vec![Rule {
                file: "/etc/model.go".to_string(),
                ..Rule::default()
            }],
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err.issues[0],
            ValidationIssue::InvalidValue { rule: 0, .. }
        ));
    }

    #[test]
    fn empty_rule_list_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn import_display() {
        let plain = Import {
            path: "time".to_string(),
            alias: String::new(),
        };
        let aliased = Import {
            path: "github.com/acme/log".to_string(),
            alias: "alog".to_string(),
        };
        assert_eq!(plain.to_string(), "\"time\"");
        assert_eq!(aliased.to_string(), "alog \"github.com/acme/log\"");
        assert_eq!(plain.alias_name(), None);
    }
}
