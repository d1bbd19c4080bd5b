//! # Type Tag Convention
//!
//! A scalar element written by the engine carries its primitive type in a reserved
//! attribute so the exact kind can be restored on read:
//!
//! ```text
//! <Id _dataType="System.Int32">123</Id>
//! <Tags _dataType="list"><Item ...>...</Item></Tags>
//! ```
//!
//! Type names are written in their canonical `System.*` spelling and resolved
//! case-insensitively, with short aliases (`int32`, `i32`, `double`, ...) accepted.

use crate::value::Primitive;

/// Default name of the reserved type-tag attribute
pub const DATA_TYPE_ATTRIBUTE: &str = "_dataType";

/// Spelling written on list containers
pub const LIST_TAG: &str = "list";

/// Tag values that mark an element as a list container (compared case-insensitively)
pub const LIST_KEYWORDS: [&str; 2] = ["list", "array"];

pub fn is_list_keyword(value: &str) -> bool {
    LIST_KEYWORDS.iter().any(|k| k.eq_ignore_ascii_case(value))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Bool,
    Char,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    String,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 13] = [
        PrimitiveKind::Bool,
        PrimitiveKind::Char,
        PrimitiveKind::I8,
        PrimitiveKind::I16,
        PrimitiveKind::I32,
        PrimitiveKind::I64,
        PrimitiveKind::U8,
        PrimitiveKind::U16,
        PrimitiveKind::U32,
        PrimitiveKind::U64,
        PrimitiveKind::F32,
        PrimitiveKind::F64,
        PrimitiveKind::String,
    ];

    /// Name written into the type-tag attribute
    pub fn canonical_name(self) -> &'static str {
        match self {
            PrimitiveKind::Bool => "System.Boolean",
            PrimitiveKind::Char => "System.Char",
            PrimitiveKind::I8 => "System.SByte",
            PrimitiveKind::I16 => "System.Int16",
            PrimitiveKind::I32 => "System.Int32",
            PrimitiveKind::I64 => "System.Int64",
            PrimitiveKind::U8 => "System.Byte",
            PrimitiveKind::U16 => "System.UInt16",
            PrimitiveKind::U32 => "System.UInt32",
            PrimitiveKind::U64 => "System.UInt64",
            PrimitiveKind::F32 => "System.Single",
            PrimitiveKind::F64 => "System.Double",
            PrimitiveKind::String => "System.String",
        }
    }

    /// Resolve a type-tag value to a primitive kind.
    ///
    /// Accepts the canonical names, the names without the `System.` namespace,
    /// assembly-qualified names (`System.Int32, mscorlib`) and short aliases.
    pub fn resolve(tag: &str) -> Option<Self> {
        let name = tag.split(',').next().unwrap_or("").trim().to_ascii_lowercase();
        let name = name.strip_prefix("system.").unwrap_or(&name);

        let kind = match name {
            "boolean" | "bool" => PrimitiveKind::Bool,
            "char" => PrimitiveKind::Char,
            "sbyte" | "int8" | "i8" => PrimitiveKind::I8,
            "int16" | "short" | "i16" => PrimitiveKind::I16,
            "int32" | "int" | "i32" => PrimitiveKind::I32,
            "int64" | "long" | "i64" => PrimitiveKind::I64,
            "byte" | "uint8" | "u8" => PrimitiveKind::U8,
            "uint16" | "ushort" | "u16" => PrimitiveKind::U16,
            "uint32" | "uint" | "u32" => PrimitiveKind::U32,
            "uint64" | "ulong" | "u64" => PrimitiveKind::U64,
            "single" | "float" | "float32" | "f32" => PrimitiveKind::F32,
            "double" | "float64" | "f64" => PrimitiveKind::F64,
            "string" | "str" => PrimitiveKind::String,
            _ => return None,
        };
        Some(kind)
    }

    /// Convert literal text into a value of this kind
    pub fn parse_literal(self, text: &str) -> Option<Primitive> {
        let trimmed = text.trim();
        let value = match self {
            PrimitiveKind::Bool => {
                if trimmed.eq_ignore_ascii_case("true") {
                    Primitive::Bool(true)
                } else if trimmed.eq_ignore_ascii_case("false") {
                    Primitive::Bool(false)
                } else {
                    return None;
                }
            }
            PrimitiveKind::Char => {
                let mut chars = text.chars();
                let c = chars.next()?;
                if chars.next().is_some() {
                    return None;
                }
                Primitive::Char(c)
            }
            PrimitiveKind::I8 => Primitive::I8(trimmed.parse().ok()?),
            PrimitiveKind::I16 => Primitive::I16(trimmed.parse().ok()?),
            PrimitiveKind::I32 => Primitive::I32(trimmed.parse().ok()?),
            PrimitiveKind::I64 => Primitive::I64(trimmed.parse().ok()?),
            PrimitiveKind::U8 => Primitive::U8(trimmed.parse().ok()?),
            PrimitiveKind::U16 => Primitive::U16(trimmed.parse().ok()?),
            PrimitiveKind::U32 => Primitive::U32(trimmed.parse().ok()?),
            PrimitiveKind::U64 => Primitive::U64(trimmed.parse().ok()?),
            PrimitiveKind::F32 => Primitive::F32(trimmed.parse().ok()?),
            PrimitiveKind::F64 => Primitive::F64(trimmed.parse().ok()?),
            PrimitiveKind::String => Primitive::String(text.to_string()),
        };
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_canonical_names() {
        for kind in PrimitiveKind::ALL {
            assert_eq!(PrimitiveKind::resolve(kind.canonical_name()), Some(kind));
        }
    }

    #[test]
    fn test_resolve_aliases_case_insensitive() {
        assert_eq!(PrimitiveKind::resolve("int32"), Some(PrimitiveKind::I32));
        assert_eq!(PrimitiveKind::resolve("SYSTEM.INT64"), Some(PrimitiveKind::I64));
        assert_eq!(PrimitiveKind::resolve("float64"), Some(PrimitiveKind::F64));
        assert_eq!(PrimitiveKind::resolve("bool"), Some(PrimitiveKind::Bool));
        assert_eq!(
            PrimitiveKind::resolve("System.Int32, mscorlib, Version=4.0.0.0"),
            Some(PrimitiveKind::I32)
        );
        assert_eq!(PrimitiveKind::resolve("System.Guid"), None);
        assert_eq!(PrimitiveKind::resolve(""), None);
    }

    #[test]
    fn test_list_keywords() {
        assert!(is_list_keyword("list"));
        assert!(is_list_keyword("Array"));
        assert!(is_list_keyword("LIST"));
        assert!(!is_list_keyword("System.Int32"));
        assert!(!is_list_keyword(" list "));
        assert!(!is_list_keyword("lists"));
    }

    #[test]
    fn test_parse_literal() {
        assert_eq!(PrimitiveKind::I32.parse_literal("12345"), Some(Primitive::I32(12345)));
        assert_eq!(PrimitiveKind::I32.parse_literal(" 7 "), Some(Primitive::I32(7)));
        assert_eq!(PrimitiveKind::I32.parse_literal("abc"), None);
        assert_eq!(PrimitiveKind::U8.parse_literal("256"), None);
        assert_eq!(PrimitiveKind::Bool.parse_literal("True"), Some(Primitive::Bool(true)));
        assert_eq!(PrimitiveKind::F32.parse_literal("0,0546"), None);
        assert_eq!(PrimitiveKind::Char.parse_literal("x"), Some(Primitive::Char('x')));
        assert_eq!(PrimitiveKind::Char.parse_literal("xy"), None);
        assert_eq!(
            PrimitiveKind::String.parse_literal(" padded "),
            Some(Primitive::String(" padded ".to_string()))
        );
    }
}
