//! Accessor method name to property name conversion.

use crate::error::{BindError, BindResult};

/// Property name for an accessor method name.
///
/// `getFooBar` and `setFooBar` give `fooBar`, `isActive` gives `active`,
/// `getURL` keeps its capitalization, and `get_foo_bar` gives `foo_bar`.
pub fn method_to_property(method: &str) -> BindResult<String> {
    let rest = if let Some(rest) = method.strip_prefix("is") {
        rest
    } else if let Some(rest) = method.strip_prefix("get").or_else(|| method.strip_prefix("set")) {
        rest
    } else {
        return Err(BindError::Reflection(format!(
            "Error parsing property name '{}'.  Didn't start with 'is', 'get' or 'set'.",
            method
        )));
    };

    if let Some(snake) = rest.strip_prefix('_') {
        if snake.is_empty() {
            return Err(BindError::Reflection(format!(
                "Error parsing property name '{}'.  No property after the prefix.",
                method
            )));
        }
        return Ok(snake.to_string());
    }

    let mut chars = rest.chars();
    let Some(first) = chars.next() else {
        return Err(BindError::Reflection(format!(
            "Error parsing property name '{}'.  No property after the prefix.",
            method
        )));
    };
    let keep_case = chars.next().is_some_and(char::is_uppercase);
    if keep_case {
        Ok(rest.to_string())
    } else {
        let mut name = String::with_capacity(rest.len());
        name.extend(first.to_lowercase());
        name.push_str(&rest[first.len_utf8()..]);
        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_case_accessors() {
        assert_eq!(method_to_property("getName").unwrap(), "name");
        assert_eq!(method_to_property("setFooBar").unwrap(), "fooBar");
        assert_eq!(method_to_property("isActive").unwrap(), "active");
        assert_eq!(method_to_property("getURL").unwrap(), "URL");
        assert_eq!(method_to_property("getX").unwrap(), "x");
    }

    #[test]
    fn test_snake_case_accessors() {
        assert_eq!(method_to_property("get_foo_bar").unwrap(), "foo_bar");
        assert_eq!(method_to_property("is_active").unwrap(), "active");
        assert_eq!(method_to_property("set_name").unwrap(), "name");
    }

    #[test]
    fn test_rejects_non_accessors() {
        assert!(method_to_property("fetchName").is_err());
        assert!(method_to_property("get").is_err());
        assert!(method_to_property("is_").is_err());
    }
}
