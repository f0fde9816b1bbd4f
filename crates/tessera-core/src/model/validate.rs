use crate::{MAX_FIELD_NAME_LEN, MAX_OWNER_PATH_LEN, error::ModelError};

/// Names the owner model resolves itself; never valid as attribute names.
const RESERVED: &[&str] = &["pk"];

/// Ensure an attribute name is non-empty, ASCII, bounded, and not reserved.
pub(crate) fn validate_attribute_name(name: &str) -> Result<(), ModelError> {
    let fail = |reason: String| ModelError::InvalidName {
        name: name.to_string(),
        reason,
    };

    if name.is_empty() {
        return Err(fail("name is empty".to_string()));
    }
    if name.len() > MAX_FIELD_NAME_LEN {
        return Err(fail(format!("exceeds max length {MAX_FIELD_NAME_LEN}")));
    }
    if !name.is_ascii() {
        return Err(fail("must be ASCII".to_string()));
    }
    // `__` separates attribute and lookup kind in filter expressions
    if name.contains("__") {
        return Err(fail("must not contain '__'".to_string()));
    }
    if RESERVED.contains(&name) {
        return Err(fail(format!("the word '{name}' is reserved")));
    }

    Ok(())
}

/// Ensure an owner path is non-empty, ASCII, and bounded.
pub(crate) fn validate_owner_path(path: &str) -> Result<(), ModelError> {
    let fail = |reason: &str| ModelError::InvalidName {
        name: path.to_string(),
        reason: reason.to_string(),
    };

    if path.is_empty() {
        return Err(fail("owner path is empty"));
    }
    if path.len() > MAX_OWNER_PATH_LEN {
        return Err(fail("owner path too long"));
    }
    if !path.is_ascii() {
        return Err(fail("owner path must be ASCII"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_reserved_and_separator_names() {
        assert!(validate_attribute_name("").is_err(), "empty names should fail");
        assert!(
            validate_attribute_name("pk").is_err(),
            "reserved words should be rejected"
        );
        assert!(validate_attribute_name("full__name").is_err());
        assert!(validate_attribute_name(&"x".repeat(MAX_FIELD_NAME_LEN + 1)).is_err());
    }

    #[test]
    fn accepts_plain_identifier() {
        assert!(validate_attribute_name("full_name").is_ok());
        assert!(validate_owner_path("music::Person").is_ok());
    }
}
