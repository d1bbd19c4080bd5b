//! # Member Dispatch
//!
//! [`MemberAccess`] is the seam a host uses to forward "member read" and "member
//! assigned" events to an object. [`MemberPath`] addresses members several levels
//! deep (`Customer.Address[2].City`) on top of it.

use crate::error::{EngineError, EngineResult};
use crate::value::Value;
use crate::wrapper::XmlObject;
use std::fmt;
use std::str::FromStr;

/// Dynamic member access by name
pub trait MemberAccess {
    /// Value of `name`, or [`Value::Null`] when there is no such member
    fn get_member(&self, name: &str) -> EngineResult<Value>;

    /// Assign `value` to `name`; [`Value::Null`] removes the member
    fn set_member(&self, name: &str, value: Value) -> EngineResult<()>;
}

impl MemberAccess for XmlObject {
    fn get_member(&self, name: &str) -> EngineResult<Value> {
        self.get(name)
    }

    fn set_member(&self, name: &str, value: Value) -> EngineResult<()> {
        self.set(name, value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSegment {
    pub name: String,
    /// List indices applied in order, `Matrix[1][0]` has two
    pub indices: Vec<usize>,
}

/// Dotted member path with optional list indices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberPath {
    source: String,
    segments: Vec<PathSegment>,
}

impl MemberPath {
    pub fn parse(path: &str) -> EngineResult<Self> {
        let source = path.trim();
        if source.is_empty() {
            return Err(EngineError::invalid_path(path, "path is empty"));
        }

        let segments = source
            .split('.')
            .map(|part| parse_segment(source, part))
            .collect::<EngineResult<Vec<_>>>()?;

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Read the value at this path. A missing member anywhere along the way yields
    /// [`Value::Null`].
    pub fn resolve(&self, root: &XmlObject) -> EngineResult<Value> {
        let mut current = root.clone();
        let last = self.segments.len() - 1;

        for (position, segment) in self.segments.iter().enumerate() {
            let mut value = current.get_member(&segment.name)?;
            for index in &segment.indices {
                value = self.index(value, *index)?;
            }

            if position == last {
                return Ok(value);
            }
            current = match value {
                Value::Null => return Ok(Value::Null),
                Value::Object(object) => object,
                other => {
                    return Err(EngineError::invalid_path(
                        &self.source,
                        format!("{} is a {}, not an object", segment.name, other.kind_name()),
                    ))
                }
            };
        }

        Ok(Value::Null)
    }

    /// Assign `value` at this path. Intermediate members must already be objects.
    ///
    /// An index on the final segment replaces one item of the list held by that
    /// member (an index equal to the length appends); index 0 of a member that is
    /// not a list replaces the member itself. Assigning null to an item removes it.
    pub fn assign(&self, root: &XmlObject, value: Value) -> EngineResult<()> {
        let (target, parents) = self
            .segments
            .split_last()
            .ok_or_else(|| EngineError::invalid_path(&self.source, "path is empty"))?;

        let mut current = root.clone();
        for segment in parents {
            let mut member = current.get_member(&segment.name)?;
            for index in &segment.indices {
                member = self.index(member, *index)?;
            }
            current = match member {
                Value::Object(object) => object,
                Value::Null => {
                    return Err(EngineError::invalid_path(
                        &self.source,
                        format!("{} does not exist", segment.name),
                    ))
                }
                other => {
                    return Err(EngineError::invalid_path(
                        &self.source,
                        format!("{} is a {}, not an object", segment.name, other.kind_name()),
                    ))
                }
            };
        }

        match target.indices.as_slice() {
            [] => current.set_member(&target.name, value),
            [index] => {
                let replaced = match current.get_member(&target.name)? {
                    Value::List(mut items) => {
                        if *index < items.len() && value.is_null() {
                            items.remove(*index);
                        } else if *index < items.len() {
                            items[*index] = value;
                        } else if *index == items.len() && !value.is_null() {
                            items.push(value);
                        } else {
                            return Err(self.out_of_range(*index, items.len()));
                        }
                        Value::List(items)
                    }
                    _ if *index == 0 => value,
                    _ => return Err(self.out_of_range(*index, 1)),
                };
                current.set_member(&target.name, replaced)
            }
            _ => Err(EngineError::invalid_path(
                &self.source,
                "only one index is supported on the assigned member",
            )),
        }
    }

    fn index(&self, value: Value, index: usize) -> EngineResult<Value> {
        match value {
            Value::List(mut items) => {
                if index < items.len() {
                    Ok(items.swap_remove(index))
                } else {
                    Err(self.out_of_range(index, items.len()))
                }
            }
            Value::Null => Ok(Value::Null),
            single if index == 0 => Ok(single),
            _ => Err(self.out_of_range(index, 1)),
        }
    }

    fn out_of_range(&self, index: usize, len: usize) -> EngineError {
        EngineError::invalid_path(
            &self.source,
            format!("index {} is out of range for {} item(s)", index, len),
        )
    }
}

fn parse_segment(path: &str, part: &str) -> EngineResult<PathSegment> {
    let part = part.trim();
    let (name, mut rest) = match part.find('[') {
        Some(open) => (&part[..open], &part[open..]),
        None => (part, ""),
    };
    if name.is_empty() {
        return Err(EngineError::invalid_path(path, "empty member name"));
    }

    let mut indices = Vec::new();
    while !rest.is_empty() {
        let close = rest
            .find(']')
            .filter(|_| rest.starts_with('['))
            .ok_or_else(|| EngineError::invalid_path(path, format!("malformed index in {:?}", part)))?;
        let index = rest[1..close].trim().parse::<usize>().map_err(|_| {
            EngineError::invalid_path(path, format!("{:?} is not a list index", &rest[1..close]))
        })?;
        indices.push(index);
        rest = &rest[close + 1..];
    }

    Ok(PathSegment {
        name: name.to_string(),
        indices,
    })
}

impl FromStr for MemberPath {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for MemberPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_path() {
        let path = MemberPath::parse("Customer.Address[2].Lines[0][1]").unwrap();
        let segments = path.segments();
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].name, "Customer");
        assert!(segments[0].indices.is_empty());
        assert_eq!(segments[1].indices, vec![2]);
        assert_eq!(segments[2].indices, vec![0, 1]);
        assert_eq!(path.to_string(), "Customer.Address[2].Lines[0][1]");
    }

    #[test]
    fn test_parse_errors() {
        for bad in ["", "a..b", "a[", "a[x]", "[1]", "a[1]b"] {
            assert!(
                matches!(MemberPath::parse(bad), Err(EngineError::InvalidPath { .. })),
                "{:?} should be rejected",
                bad
            );
        }
    }
}
