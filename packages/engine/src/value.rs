//! # Projected Values
//!
//! Everything a member read can produce, as a closed set of variants:
//!
//! - [`Value::Null`]: no matching child element or attribute (also used to delete)
//! - [`Value::Primitive`]: text, or a typed scalar restored from its type tag
//! - [`Value::Fields`]: attribute bag of an element without text or children
//! - [`Value::Object`]: nested object bound to an element with children
//! - [`Value::List`]: ordered items of an implicit, tagged or homogeneous list

use crate::type_tag::PrimitiveKind;
use crate::wrapper::XmlObject;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Bool(bool),
    Char(char),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    String(String),
}

impl Primitive {
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            Primitive::Bool(_) => PrimitiveKind::Bool,
            Primitive::Char(_) => PrimitiveKind::Char,
            Primitive::I8(_) => PrimitiveKind::I8,
            Primitive::I16(_) => PrimitiveKind::I16,
            Primitive::I32(_) => PrimitiveKind::I32,
            Primitive::I64(_) => PrimitiveKind::I64,
            Primitive::U8(_) => PrimitiveKind::U8,
            Primitive::U16(_) => PrimitiveKind::U16,
            Primitive::U32(_) => PrimitiveKind::U32,
            Primitive::U64(_) => PrimitiveKind::U64,
            Primitive::F32(_) => PrimitiveKind::F32,
            Primitive::F64(_) => PrimitiveKind::F64,
            Primitive::String(_) => PrimitiveKind::String,
        }
    }

    /// Canonical literal text, the inverse of [`PrimitiveKind::parse_literal`].
    ///
    /// Floats use the shortest decimal form that parses back to the same value.
    pub fn to_literal(&self) -> String {
        match self {
            Primitive::Bool(true) => "True".to_string(),
            Primitive::Bool(false) => "False".to_string(),
            Primitive::Char(c) => c.to_string(),
            Primitive::I8(n) => n.to_string(),
            Primitive::I16(n) => n.to_string(),
            Primitive::I32(n) => n.to_string(),
            Primitive::I64(n) => n.to_string(),
            Primitive::U8(n) => n.to_string(),
            Primitive::U16(n) => n.to_string(),
            Primitive::U32(n) => n.to_string(),
            Primitive::U64(n) => n.to_string(),
            Primitive::F32(n) => n.to_string(),
            Primitive::F64(n) => n.to_string(),
            Primitive::String(s) => s.clone(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Primitive::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Primitive::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Any integer kind that fits in an `i64`
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Primitive::I8(n) => Some(i64::from(*n)),
            Primitive::I16(n) => Some(i64::from(*n)),
            Primitive::I32(n) => Some(i64::from(*n)),
            Primitive::I64(n) => Some(*n),
            Primitive::U8(n) => Some(i64::from(*n)),
            Primitive::U16(n) => Some(i64::from(*n)),
            Primitive::U32(n) => Some(i64::from(*n)),
            Primitive::U64(n) => i64::try_from(*n).ok(),
            _ => None,
        }
    }

    /// Any numeric kind, widened to `f64`
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Primitive::F32(n) => Some(f64::from(*n)),
            Primitive::F64(n) => Some(*n),
            Primitive::U64(n) => Some(*n as f64),
            _ => self.as_i64().map(|n| n as f64),
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_literal())
    }
}

macro_rules! primitive_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Primitive {
                fn from(value: $ty) -> Self {
                    Primitive::$variant(value)
                }
            }

            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Primitive(Primitive::$variant(value))
                }
            }
        )*
    };
}

primitive_from!(
    bool => Bool,
    char => Char,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    String => String,
);

impl From<&str> for Primitive {
    fn from(value: &str) -> Self {
        Primitive::String(value.to_string())
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Primitive(Primitive::String(value.to_string()))
    }
}

/// Attribute bag projected from an element that has attributes but no text or children.
///
/// Keys are the attribute local names with the configured field prefix; values are
/// always the literal attribute text.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldBag {
    fields: Vec<(String, String)>,
}

impl FieldBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Primitive(Primitive),
    Fields(FieldBag),
    Object(XmlObject),
    List(Vec<Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short description of the variant, for logs and error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Primitive(p) => p.kind().canonical_name(),
            Value::Fields(_) => "fields",
            Value::Object(_) => "object",
            Value::List(_) => "list",
        }
    }

    pub fn as_primitive(&self) -> Option<&Primitive> {
        match self {
            Value::Primitive(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_primitive().and_then(Primitive::as_str)
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.as_primitive().and_then(Primitive::as_bool)
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_primitive().and_then(Primitive::as_i64)
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.as_primitive().and_then(Primitive::as_f64)
    }

    pub fn as_fields(&self) -> Option<&FieldBag> {
        match self {
            Value::Fields(bag) => Some(bag),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&XmlObject> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn into_object(self) -> Option<XmlObject> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn into_list(self) -> Option<Vec<Value>> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Whether every object reachable from this value is still bound to a live element
    pub fn is_alive(&self) -> bool {
        match self {
            Value::Object(obj) => obj.is_alive(),
            Value::List(items) => items.iter().all(Value::is_alive),
            Value::Null | Value::Primitive(_) | Value::Fields(_) => true,
        }
    }
}

impl From<Primitive> for Value {
    fn from(value: Primitive) -> Self {
        Value::Primitive(value)
    }
}

impl From<XmlObject> for Value {
    fn from(value: XmlObject) -> Self {
        Value::Object(value)
    }
}

impl From<FieldBag> for Value {
    fn from(value: FieldBag) -> Self {
        Value::Fields(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_round_trip_per_kind() {
        let samples = vec![
            Primitive::Bool(true),
            Primitive::Bool(false),
            Primitive::Char('é'),
            Primitive::I8(-8),
            Primitive::I16(-1600),
            Primitive::I32(i32::MIN),
            Primitive::I64(i64::MAX),
            Primitive::U8(255),
            Primitive::U16(65535),
            Primitive::U32(u32::MAX),
            Primitive::U64(u64::MAX),
            Primitive::F32(0.0546),
            Primitive::F64(0.1 + 0.2),
            Primitive::F64(1e300),
            Primitive::F64(f64::NEG_INFINITY),
            Primitive::String(" keep  spacing ".to_string()),
        ];

        for sample in samples {
            let literal = sample.to_literal();
            let parsed = sample.kind().parse_literal(&literal);
            assert_eq!(parsed, Some(sample.clone()), "literal {:?}", literal);
        }
    }

    #[test]
    fn test_float_literal_is_plain_decimal() {
        assert_eq!(Primitive::F32(0.0546).to_literal(), "0.0546");
        assert_eq!(Primitive::F64(0.555).to_literal(), "0.555");
        assert_eq!(Primitive::F64(12.0).to_literal(), "12");
    }

    #[test]
    fn test_bool_literal() {
        assert_eq!(Primitive::Bool(true).to_literal(), "True");
        assert_eq!(Primitive::Bool(false).to_literal(), "False");
    }

    #[test]
    fn test_numeric_accessors() {
        assert_eq!(Value::from(5u8).as_i64(), Some(5));
        assert_eq!(Value::from(u64::MAX).as_i64(), None);
        assert_eq!(Value::from(2.5f32).as_f64(), Some(2.5));
        assert_eq!(Value::from("x").as_i64(), None);
    }

    #[test]
    fn test_conversions() {
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some("a")), Value::from("a"));
        assert_eq!(
            Value::from(vec![1, 2]),
            Value::List(vec![Value::from(1), Value::from(2)])
        );
    }

    #[test]
    fn test_field_bag_insert_overwrites() {
        let mut bag = FieldBag::new();
        bag.insert("_id", "1");
        bag.insert("_name", "x");
        bag.insert("_id", "2");
        assert_eq!(bag.len(), 2);
        assert_eq!(bag.get("_id"), Some("2"));
        assert_eq!(bag.keys().collect::<Vec<_>>(), vec!["_id", "_name"]);
    }
}
