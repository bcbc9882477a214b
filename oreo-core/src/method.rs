use crate::error::{OreoError, Result};
use serde::{Deserialize, Serialize};

/// HTTP methods admitted by the route catalog.
///
/// Every method maps to one bit; a `methodValue` is the OR of the bits of
/// the granted methods. Per-method fields in persisted documents are keyed
/// by the decimal string of the bit ("1", "2", "4", "8").
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

/// All supported methods, in bit order.
pub const ALL_METHODS: [Method; 4] = [Method::Get, Method::Post, Method::Put, Method::Delete];

impl Method {
    /// Parse a method name. Input is trimmed and upper-cased first; anything
    /// outside GET/POST/PUT/DELETE is rejected.
    pub fn parse(method: &str) -> Result<Method> {
        match method.trim().to_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "DELETE" => Ok(Method::Delete),
            other => Err(OreoError::UnsupportedMethod(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }

    pub fn bit(&self) -> u8 {
        match self {
            Method::Get => 1,
            Method::Post => 2,
            Method::Put => 4,
            Method::Delete => 8,
        }
    }

    /// Decimal-bit string used as a per-method document key.
    pub fn bit_str(&self) -> &'static str {
        match self {
            Method::Get => "1",
            Method::Post => "2",
            Method::Put => "4",
            Method::Delete => "8",
        }
    }

    pub fn from_bit(bit: u8) -> Option<Method> {
        match bit {
            1 => Some(Method::Get),
            2 => Some(Method::Post),
            4 => Some(Method::Put),
            8 => Some(Method::Delete),
            _ => None,
        }
    }

    pub fn from_bit_str(bit: &str) -> Option<Method> {
        match bit {
            "1" => Some(Method::Get),
            "2" => Some(Method::Post),
            "4" => Some(Method::Put),
            "8" => Some(Method::Delete),
            _ => None,
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fold a set of methods into a methodValue bitmask.
pub fn method_value(methods: &[Method]) -> u8 {
    methods.iter().fold(0, |acc, m| acc | m.bit())
}

/// Unfold a methodValue into the methods whose bits are set.
/// Bits outside 1|2|4|8 are ignored.
pub fn bits_to_methods(value: u8) -> Vec<Method> {
    ALL_METHODS
        .iter()
        .copied()
        .filter(|m| value & m.bit() > 0)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalizes_case_and_whitespace() {
        assert_eq!(Method::parse(" get ").unwrap(), Method::Get);
        assert_eq!(Method::parse("Post").unwrap(), Method::Post);
        assert_eq!(Method::parse("PUT").unwrap(), Method::Put);
        assert_eq!(Method::parse("delete").unwrap(), Method::Delete);
    }

    #[test]
    fn test_parse_rejects_unknown_methods() {
        assert!(Method::parse("PATCH").is_err());
        assert!(Method::parse("HEAD").is_err());
        assert!(Method::parse("").is_err());
    }

    #[test]
    fn test_bits() {
        assert_eq!(Method::Get.bit(), 1);
        assert_eq!(Method::Post.bit(), 2);
        assert_eq!(Method::Put.bit(), 4);
        assert_eq!(Method::Delete.bit(), 8);
    }

    #[test]
    fn test_bit_strings_round_trip() {
        for m in ALL_METHODS {
            assert_eq!(Method::from_bit_str(m.bit_str()), Some(m));
            assert_eq!(Method::from_bit(m.bit()), Some(m));
        }
        assert_eq!(Method::from_bit_str("3"), None);
        assert_eq!(Method::from_bit(16), None);
    }

    #[test]
    fn test_method_value_round_trip_all_subsets() {
        // Every subset of {GET, POST, PUT, DELETE} survives fold + unfold.
        for mask in 0u8..16 {
            let methods = bits_to_methods(mask);
            assert_eq!(method_value(&methods), mask);
        }
    }

    #[test]
    fn test_bits_to_methods_ignores_stray_bits() {
        assert_eq!(bits_to_methods(16), vec![]);
        assert_eq!(bits_to_methods(17), vec![Method::Get]);
    }
}
