//! Minimal DataHub URN handling: `urn:li:<type>:<key>`.
//!
//! Keys are either opaque (`urn:li:tag:PII`) or tuples
//! (`urn:li:dataset:(urn:li:dataPlatform:snowflake,db.t,PROD)`) whose elements
//! may themselves be URNs containing parentheses and commas.

use std::fmt;

pub const URN_PREFIX: &str = "urn:li:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Urn<'a> {
    pub entity_type: &'a str,
    pub key: &'a str,
}

impl<'a> Urn<'a> {
    /// Returns `None` for anything that is not `urn:li:<type>:<key>` with a
    /// non-empty type and key.
    pub fn parse(s: &'a str) -> Option<Self> {
        let rest = s.strip_prefix(URN_PREFIX)?;
        let (entity_type, key) = rest.split_once(':')?;
        if entity_type.is_empty() || key.is_empty() {
            return None;
        }
        Some(Self { entity_type, key })
    }

    /// Tuple elements of the key, or `None` if the key is not a tuple.
    pub fn tuple_parts(&self) -> Option<Vec<&'a str>> {
        split_tuple(self.key)
    }
}

impl fmt::Display for Urn<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{URN_PREFIX}{}:{}", self.entity_type, self.key)
    }
}

pub fn make_urn(entity_type: &str, key: &str) -> String {
    format!("{URN_PREFIX}{entity_type}:{key}")
}

pub fn make_tuple_urn(entity_type: &str, parts: &[&str]) -> String {
    format!("{URN_PREFIX}{entity_type}:({})", parts.join(","))
}

/// Split `(a,b,c)` at top-level commas. Unbalanced input yields `None`.
pub fn split_tuple(key: &str) -> Option<Vec<&str>> {
    let inner = key.strip_prefix('(')?.strip_suffix(')')?;
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (i, c) in inner.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.checked_sub(1)?,
            ',' if depth == 0 => {
                parts.push(&inner[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return None;
    }
    parts.push(&inner[start..]);
    Some(parts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_urn() {
        let urn = Urn::parse("urn:li:tag:PII").unwrap();
        assert_eq!(urn.entity_type, "tag");
        assert_eq!(urn.key, "PII");
        assert_eq!(urn.tuple_parts(), None);
        assert_eq!(urn.to_string(), "urn:li:tag:PII");
    }

    #[test]
    fn rejects_non_urns() {
        assert_eq!(Urn::parse(""), None);
        assert_eq!(Urn::parse("PII"), None);
        assert_eq!(Urn::parse("urn:li:tag"), None);
        assert_eq!(Urn::parse("urn:li::x"), None);
    }

    #[test]
    fn splits_nested_tuple_keys() {
        let urn =
            Urn::parse("urn:li:dataset:(urn:li:dataPlatform:snowflake,inst.db.t,PROD)").unwrap();
        assert_eq!(
            urn.tuple_parts().unwrap(),
            vec!["urn:li:dataPlatform:snowflake", "inst.db.t", "PROD"]
        );

        let nested = split_tuple("((a,b),c)").unwrap();
        assert_eq!(nested, vec!["(a,b)", "c"]);
    }

    #[test]
    fn unbalanced_tuple_is_not_a_tuple() {
        assert_eq!(split_tuple("(a,(b,c)"), None);
        assert_eq!(split_tuple("(a,b))"), None);
    }
}
