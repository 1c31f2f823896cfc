//! qualifiedName conventions.
//!
//! A qualifiedName is a `/`-separated path: the parent's qualifiedName, any
//! kind-specific namespace segments, then the local name or source-system id.
//! Connections sit at the root as `default/{connector}/{epoch}`, so the first
//! three segments of any deeper path identify its connection.

use crate::error::{CatalogError, Result};

pub const SEPARATOR: char = '/';

/// Join a parent qualifiedName with further path segments.
pub fn join(parent: &str, segments: &[&str]) -> String {
    let mut qualified_name = String::from(parent);
    for segment in segments {
        qualified_name.push(SEPARATOR);
        qualified_name.push_str(segment);
    }
    qualified_name
}

/// Reject an empty parent identifier before any derivation.
pub fn require<'a>(type_name: &str, field: &str, value: &'a str) -> Result<&'a str> {
    if value.is_empty() {
        Err(CatalogError::missing_relationship(type_name, &[field]))
    } else {
        Ok(value)
    }
}

/// Check that a parent object carries every identifying field listed.
/// Reports all missing fields at once, in the order given.
pub fn require_fields(parent_type: &str, fields: &[(&str, Option<&str>)]) -> Result<()> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| value.map_or(true, str::is_empty))
        .map(|(field, _)| *field)
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(CatalogError::missing_relationship(parent_type, &missing))
    }
}

/// First three segments if they have the `default/{connector}/{epoch}` shape.
fn connection_segments(qualified_name: &str) -> Option<[&str; 3]> {
    let mut tokens = qualified_name.split(SEPARATOR);
    let (root, connector, epoch) = (tokens.next()?, tokens.next()?, tokens.next()?);
    let epoch_ok = !epoch.is_empty() && epoch.bytes().all(|b| b.is_ascii_digit());
    (root == "default" && !connector.is_empty() && epoch_ok).then_some([root, connector, epoch])
}

/// The connection qualifiedName a path lives under, if it is rooted at one.
pub fn connection_qualified_name(qualified_name: &str) -> Option<String> {
    connection_segments(qualified_name).map(|segments| segments.join("/"))
}

/// Connector segment (`snowflake`, `airflow`, ...) of a connection-rooted path.
pub fn connector_name(qualified_name: &str) -> Option<String> {
    connection_segments(qualified_name).map(|[_, connector, _]| connector.to_string())
}

/// Last segment of a qualifiedName.
pub fn name_from(qualified_name: &str) -> &str {
    qualified_name
        .rsplit(SEPARATOR)
        .next()
        .unwrap_or(qualified_name)
}

/// Drop the last `count` segments; `None` if that would leave nothing.
pub fn ancestor(qualified_name: &str, count: usize) -> Option<&str> {
    let mut current = qualified_name;
    for _ in 0..count {
        let idx = current.rfind(SEPARATOR)?;
        current = &current[..idx];
    }
    if current.is_empty() {
        None
    } else {
        Some(current)
    }
}
