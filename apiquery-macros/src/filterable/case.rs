//! Field name casing, following serde's `rename_all` rules for struct fields.

use proc_macro2::Span;
use syn::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameRule {
    LowerCase,
    UpperCase,
    PascalCase,
    CamelCase,
    SnakeCase,
    ScreamingSnakeCase,
    KebabCase,
    ScreamingKebabCase,
}

const RULES: &[(&str, RenameRule)] = &[
    ("lowercase", RenameRule::LowerCase),
    ("UPPERCASE", RenameRule::UpperCase),
    ("PascalCase", RenameRule::PascalCase),
    ("camelCase", RenameRule::CamelCase),
    ("snake_case", RenameRule::SnakeCase),
    ("SCREAMING_SNAKE_CASE", RenameRule::ScreamingSnakeCase),
    ("kebab-case", RenameRule::KebabCase),
    ("SCREAMING-KEBAB-CASE", RenameRule::ScreamingKebabCase),
];

impl RenameRule {
    pub fn parse(name: &str, span: Span) -> Result<Self> {
        RULES
            .iter()
            .find(|(rule, _)| *rule == name)
            .map(|(_, rule)| *rule)
            .ok_or_else(|| {
                let expected: Vec<&str> = RULES.iter().map(|(rule, _)| *rule).collect();
                Error::new(
                    span,
                    format!(
                        "unknown rename rule \"{name}\". Expected one of: {}",
                        expected.join(", ")
                    ),
                )
            })
    }

    /// Apply to a snake_case field name.
    pub fn apply_to_field(self, field: &str) -> String {
        match self {
            RenameRule::LowerCase | RenameRule::SnakeCase => field.to_string(),
            RenameRule::UpperCase | RenameRule::ScreamingSnakeCase => field.to_ascii_uppercase(),
            RenameRule::PascalCase => to_pascal_case(field),
            RenameRule::CamelCase => {
                let pascal = to_pascal_case(field);
                let mut chars = pascal.chars();
                match chars.next() {
                    Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
                    None => pascal,
                }
            }
            RenameRule::KebabCase => field.replace('_', "-"),
            RenameRule::ScreamingKebabCase => field.to_ascii_uppercase().replace('_', "-"),
        }
    }
}

/// `display_name` -> `DisplayName`; also used for field enum variants.
pub fn to_pascal_case(field: &str) -> String {
    let mut pascal = String::with_capacity(field.len());
    let mut capitalize = true;
    for ch in field.chars() {
        if ch == '_' {
            capitalize = true;
        } else if capitalize {
            pascal.push(ch.to_ascii_uppercase());
            capitalize = false;
        } else {
            pascal.push(ch);
        }
    }
    pascal
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pascal_case() {
        assert_eq!(to_pascal_case("display_name"), "DisplayName");
        assert_eq!(to_pascal_case("id"), "Id");
        assert_eq!(to_pascal_case("_private_field"), "PrivateField");
        assert_eq!(to_pascal_case("already"), "Already");
    }

    #[test]
    fn test_apply_to_field() {
        let field = "created_at";
        assert_eq!(RenameRule::CamelCase.apply_to_field(field), "createdAt");
        assert_eq!(RenameRule::PascalCase.apply_to_field(field), "CreatedAt");
        assert_eq!(RenameRule::SnakeCase.apply_to_field(field), "created_at");
        assert_eq!(RenameRule::ScreamingSnakeCase.apply_to_field(field), "CREATED_AT");
        assert_eq!(RenameRule::KebabCase.apply_to_field(field), "created-at");
        assert_eq!(RenameRule::ScreamingKebabCase.apply_to_field(field), "CREATED-AT");
        assert_eq!(RenameRule::UpperCase.apply_to_field(field), "CREATED_AT");
    }

    #[test]
    fn test_parse_rule() {
        let span = Span::call_site();
        assert_eq!(RenameRule::parse("camelCase", span).unwrap(), RenameRule::CamelCase);
        assert!(RenameRule::parse("CamelCase", span).is_err());
    }
}
