//! Element own properties
//!
//! A property is either plain data stored on the element instance or a link
//! that proxies one of the element's attributes.

use std::fmt;

/// Value read from or written to an element property
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PropertyValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl PropertyValue {
    pub fn is_null(&self) -> bool {
        matches!(self, PropertyValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            PropertyValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Null => f.write_str("null"),
            PropertyValue::Bool(b) => write!(f, "{}", b),
            PropertyValue::Number(n) if n.is_infinite() => {
                f.write_str(if *n > 0.0 { "Infinity" } else { "-Infinity" })
            }
            // Negative zero stringifies as "0"
            PropertyValue::Number(n) if *n == 0.0 => f.write_str("0"),
            PropertyValue::Number(n) => write!(f, "{}", n),
            PropertyValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::Text(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::Text(s)
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        PropertyValue::Bool(b)
    }
}

impl From<f64> for PropertyValue {
    fn from(n: f64) -> Self {
        PropertyValue::Number(n)
    }
}

impl<T: Into<PropertyValue>> From<Option<T>> for PropertyValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(PropertyValue::Null)
    }
}

/// Own property slot on an element
#[derive(Debug, Clone, PartialEq)]
pub enum Property {
    /// Plain value stored on the instance
    Data(PropertyValue),
    /// Accessor mirroring the named attribute
    Attribute(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_as_attribute_string() {
        assert_eq!(PropertyValue::Number(3.0).to_string(), "3");
        assert_eq!(PropertyValue::Number(1.5).to_string(), "1.5");
        assert_eq!(PropertyValue::Bool(true).to_string(), "true");
        assert_eq!(PropertyValue::from("x").to_string(), "x");
    }

    #[test]
    fn test_number_display() {
        assert_eq!(PropertyValue::Number(2.0).to_string(), "2");
        assert_eq!(PropertyValue::Number(-0.0).to_string(), "0");
        assert_eq!(PropertyValue::Number(1e20).to_string(), "100000000000000000000");
        assert_eq!(PropertyValue::Number(0.5).to_string(), "0.5");
        assert_eq!(PropertyValue::Number(f64::INFINITY).to_string(), "Infinity");
        assert_eq!(PropertyValue::Number(f64::NEG_INFINITY).to_string(), "-Infinity");
        assert_eq!(PropertyValue::Number(f64::NAN).to_string(), "NaN");
    }

    #[test]
    fn test_from_option() {
        assert_eq!(PropertyValue::from(None::<&str>), PropertyValue::Null);
        assert_eq!(PropertyValue::from(Some("a")), PropertyValue::Text("a".into()));
    }
}
