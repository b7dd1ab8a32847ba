//! Dotted element names
//!
//! A full name is the dot-joined chain of name segments from the root's
//! children down to the element. The root itself has the empty full name.

use crate::errors::{DsmError, Result};

pub const SEPARATOR: char = '.';

/// Check that `name` is usable as a single name segment
///
/// # Errors
///
/// Returns `InvalidName` if the name is empty, whitespace-only or contains
/// the separator.
pub fn validate_name_part(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(DsmError::InvalidName {
            name: name.to_string(),
            reason: "name cannot be empty or whitespace-only".to_string(),
        });
    }
    if name.contains(SEPARATOR) {
        return Err(DsmError::InvalidName {
            name: name.to_string(),
            reason: format!("name cannot contain '{}'", SEPARATOR),
        });
    }
    Ok(())
}

/// Split a full name into its segments
///
/// # Errors
///
/// Returns `InvalidName` if any segment is empty.
pub fn split_full_name(full_name: &str) -> Result<Vec<&str>> {
    if full_name.is_empty() {
        return Ok(Vec::new());
    }
    let parts: Vec<&str> = full_name.split(SEPARATOR).collect();
    for part in &parts {
        if part.trim().is_empty() {
            return Err(DsmError::InvalidName {
                name: full_name.to_string(),
                reason: "full name contains an empty segment".to_string(),
            });
        }
    }
    Ok(parts)
}

/// Join a parent full name and a child segment
pub fn join(parent_full_name: &str, name: &str) -> String {
    if parent_full_name.is_empty() {
        name.to_string()
    } else {
        format!("{}{}{}", parent_full_name, SEPARATOR, name)
    }
}

/// Strip `parent_full_name` from the front of `full_name`
///
/// Returns the remainder if `full_name` lies below the parent, otherwise
/// `None`.
pub fn relative_to<'a>(full_name: &'a str, parent_full_name: &str) -> Option<&'a str> {
    if parent_full_name.is_empty() {
        return Some(full_name);
    }
    full_name
        .strip_prefix(parent_full_name)
        .and_then(|rest| rest.strip_prefix(SEPARATOR))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_and_join() {
        assert_eq!(split_full_name("a.b.c").unwrap(), vec!["a", "b", "c"]);
        assert!(split_full_name("").unwrap().is_empty());
        assert_eq!(join("", "a"), "a");
        assert_eq!(join("a.b", "c"), "a.b.c");
    }

    #[test]
    fn test_split_rejects_empty_segment() {
        assert!(matches!(
            split_full_name("a..b"),
            Err(DsmError::InvalidName { .. })
        ));
    }

    #[test]
    fn test_relative_to() {
        assert_eq!(relative_to("pkg.a.b", "pkg"), Some("a.b"));
        assert_eq!(relative_to("pkg.a", ""), Some("pkg.a"));
        assert_eq!(relative_to("pkgx.a", "pkg"), None);
        assert_eq!(relative_to("other.a", "pkg"), None);
    }

    #[test]
    fn test_validate_name_part() {
        assert!(validate_name_part("Main").is_ok());
        assert!(validate_name_part("").is_err());
        assert!(validate_name_part("a.b").is_err());
    }
}
