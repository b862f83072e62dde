//! Type mapping utilities for the Arduino backend.
//!
//! # Type Mapping
//!
//! | BASIC Type | C++ Type  | Default   |
//! |------------|-----------|-----------|
//! | Integer    | `int`     | `0`       |
//! | Long       | `long`    | `0`       |
//! | Byte       | `uint8_t` | `0`       |
//! | Boolean    | `bool`    | `false`   |
//! | Single     | `float`   | `0`       |
//! | Double     | `float`   | `0`       |
//! | String     | `String`  | `""`      |
//!
//! Any other name (a library class or a `Type` record) passes through
//! unchanged. A missing `As` clause means `int`.

/// BASIC primitive type names (lowercase).
const BASIC_TYPES: [&str; 7] = [
    "integer", "long", "byte", "boolean", "single", "double", "string",
];

/// Maps a BASIC type name to its C++ spelling.
pub(super) fn cpp_type(name: Option<&str>) -> String {
    let Some(name) = name else {
        return "int".to_string();
    };
    match name.to_ascii_lowercase().as_str() {
        "integer" => "int",
        "long" => "long",
        "byte" => "uint8_t",
        "boolean" => "bool",
        "single" | "double" => "float",
        "string" => "String",
        _ => name,
    }
    .to_string()
}

/// Default initializer for a C++ type.
pub(super) fn default_init(cpp_type: &str) -> &'static str {
    match cpp_type {
        "bool" => "false",
        "String" => "\"\"",
        _ => "0",
    }
}

/// True for a class or record type name: capitalized and not a primitive.
pub(super) fn is_object_type(name: &str) -> bool {
    name.starts_with(|c: char| c.is_ascii_uppercase())
        && !BASIC_TYPES.contains(&name.to_ascii_lowercase().as_str())
}

/// Size of one array dimension declared with upper bound `bound`.
///
/// Literal bounds are incremented; named bounds get `+ 1`.
pub(super) fn dimension_size(bound: &str) -> String {
    bound
        .parse::<u64>()
        .ok()
        .and_then(|n| n.checked_add(1))
        .map(|n| n.to_string())
        .unwrap_or_else(|| format!("{} + 1", bound))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_types() {
        assert_eq!(cpp_type(Some("Integer")), "int");
        assert_eq!(cpp_type(Some("BYTE")), "uint8_t");
        assert_eq!(cpp_type(Some("double")), "float");
        assert_eq!(cpp_type(Some("String")), "String");
        assert_eq!(cpp_type(None), "int");
    }

    #[test]
    fn test_unknown_type_passes_through() {
        assert_eq!(cpp_type(Some("BLEServer")), "BLEServer");
    }

    #[test]
    fn test_defaults() {
        assert_eq!(default_init("bool"), "false");
        assert_eq!(default_init("String"), "\"\"");
        assert_eq!(default_init("uint8_t"), "0");
    }

    #[test]
    fn test_object_types() {
        assert!(is_object_type("Preferences"));
        assert!(is_object_type("Point"));
        assert!(!is_object_type("String"));
        assert!(!is_object_type("Integer"));
        assert!(!is_object_type("uint8_t"));
    }

    #[test]
    fn test_dimension_size() {
        assert_eq!(dimension_size("2"), "3");
        assert_eq!(dimension_size("MAX_ITEMS"), "MAX_ITEMS + 1");
        assert_eq!(
            dimension_size("18446744073709551615"),
            "18446744073709551615 + 1"
        );
    }
}
