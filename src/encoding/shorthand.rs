//! Shorthand encoding strings
//!
//! Grammar, tried in order (first full match wins):
//!
//! ```text
//! count():T     count()
//! agg(field):T  agg(field)
//! field:T       field
//! ```
//!
//! `T` is one of `Q`, `N`, `O`, `T` or the full type name. A suffix that is not
//! a type, or a prefix that is not an aggregate op, does not match its pattern
//! and therefore stays part of the field name.

use crate::schema::{Aggregate, FieldType};
use regex::Regex;
use std::sync::LazyLock;

/// Components recovered from a shorthand string
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Shorthand {
    pub field: Option<String>,
    pub aggregate: Option<Aggregate>,
    pub field_type: Option<FieldType>,
}

static PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    let types = FieldType::ALL
        .iter()
        .flat_map(|t| [t.as_str().to_string(), t.code().to_string()])
        .collect::<Vec<_>>()
        .join("|");
    let aggregates = Aggregate::allowed().join("|");

    let field = r"(?P<field>.*)";
    let type_ = format!("(?P<type>{})", types);
    let count = r"(?P<aggregate>count)";
    let aggregate = format!("(?P<aggregate>{})", aggregates);

    [
        format!(r"^{count}\(\):{type_}$"),
        format!(r"^{count}\(\)$"),
        format!(r"^{aggregate}\({field}\):{type_}$"),
        format!(r"^{aggregate}\({field}\)$"),
        format!(r"^{field}:{type_}$"),
        format!(r"^{field}$"),
    ]
    .iter()
    .map(|p| Regex::new(p).expect("shorthand pattern is a valid regex"))
    .collect()
});

/// Parse a shorthand encoding string.
///
/// An empty string yields an empty [`Shorthand`]. `count()` without a type
/// suffix is quantitative.
pub fn parse_shorthand(shorthand: &str) -> Shorthand {
    if shorthand.is_empty() {
        return Shorthand::default();
    }

    let caps = PATTERNS.iter().find_map(|re| re.captures(shorthand));
    let mut parsed = Shorthand::default();
    if let Some(caps) = caps {
        parsed.field = caps
            .name("field")
            .map(|m| m.as_str().to_string())
            .filter(|f| !f.is_empty());
        parsed.aggregate = caps
            .name("aggregate")
            .and_then(|m| m.as_str().parse::<Aggregate>().ok());
        parsed.field_type = caps
            .name("type")
            .and_then(|m| FieldType::from_shorthand(m.as_str()));
    }

    if parsed.aggregate == Some(Aggregate::Count) && parsed.field_type.is_none() {
        parsed.field_type = Some(FieldType::Quantitative);
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh(field: Option<&str>, aggregate: Option<Aggregate>, t: Option<FieldType>) -> Shorthand {
        Shorthand {
            field: field.map(str::to_string),
            aggregate,
            field_type: t,
        }
    }

    #[test]
    fn test_field_only() {
        assert_eq!(parse_shorthand("foo"), sh(Some("foo"), None, None));
        assert_eq!(parse_shorthand(""), Shorthand::default());
    }

    #[test]
    fn test_field_with_type() {
        assert_eq!(
            parse_shorthand("foo:Q"),
            sh(Some("foo"), None, Some(FieldType::Quantitative))
        );
        assert_eq!(
            parse_shorthand("foo:temporal"),
            sh(Some("foo"), None, Some(FieldType::Temporal))
        );
        assert_eq!(
            parse_shorthand("a:b:O"),
            sh(Some("a:b"), None, Some(FieldType::Ordinal))
        );
    }

    #[test]
    fn test_aggregate_forms() {
        assert_eq!(
            parse_shorthand("mean(price):Q"),
            sh(Some("price"), Some(Aggregate::Mean), Some(FieldType::Quantitative))
        );
        assert_eq!(
            parse_shorthand("sum(amount)"),
            sh(Some("amount"), Some(Aggregate::Sum), None)
        );
    }

    #[test]
    fn test_count() {
        assert_eq!(
            parse_shorthand("count()"),
            sh(None, Some(Aggregate::Count), Some(FieldType::Quantitative))
        );
        assert_eq!(
            parse_shorthand("count():O"),
            sh(None, Some(Aggregate::Count), Some(FieldType::Ordinal))
        );
        assert_eq!(
            parse_shorthand("count(*):Q"),
            sh(Some("*"), Some(Aggregate::Count), Some(FieldType::Quantitative))
        );
    }

    #[test]
    fn test_invalid_parts_stay_in_field() {
        assert_eq!(parse_shorthand("foo:X"), sh(Some("foo:X"), None, None));
        assert_eq!(
            parse_shorthand("avg(foo):Q"),
            sh(Some("avg(foo)"), None, Some(FieldType::Quantitative))
        );
    }
}
