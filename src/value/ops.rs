//! Operators
//!
//! Arithmetic, comparison and indexing over `Value`. Equality never fails and
//! treats two absent values as equal; every other operator rejects an absent
//! operand instead of reading it as zero or empty.

use super::{Value, ValueKind};
use crate::error::{Result, ValueError};
use std::cmp::Ordering;
use std::sync::Arc;

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl BinaryOp {
    fn verb(&self) -> &'static str {
        match self {
            BinaryOp::Add => "add",
            BinaryOp::Sub => "subtract",
            BinaryOp::Mul => "multiply",
            BinaryOp::Div => "divide",
            BinaryOp::Rem => "take the remainder of",
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => "compare",
            BinaryOp::Eq | BinaryOp::Ne => "test equality of",
        }
    }
}

impl Value {
    /// Apply a binary operator
    pub fn binary(&self, op: BinaryOp, rhs: &Value) -> Result<Value> {
        match op {
            BinaryOp::Eq => return Ok(Value::Boolean(self == rhs)),
            BinaryOp::Ne => return Ok(Value::Boolean(self != rhs)),
            _ => {}
        }

        if self.is_absent() || rhs.is_absent() {
            return Err(ValueError::absent(op.verb()));
        }

        match op {
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => {
                self.arithmetic(op, rhs)
            }
            _ => self.compare(op, rhs),
        }
    }

    fn arithmetic(&self, op: BinaryOp, rhs: &Value) -> Result<Value> {
        match (self, rhs) {
            (Value::Integer(a), Value::Integer(b)) => {
                if matches!(op, BinaryOp::Div | BinaryOp::Rem) && *b == 0 {
                    return Err(ValueError::Arithmetic {
                        detail: "division by zero".to_string(),
                    });
                }
                let result = match op {
                    BinaryOp::Add => a.checked_add(*b),
                    BinaryOp::Sub => a.checked_sub(*b),
                    BinaryOp::Mul => a.checked_mul(*b),
                    BinaryOp::Div => a.checked_div(*b),
                    _ => a.checked_rem(*b),
                };
                result.map(Value::Integer).ok_or_else(|| ValueError::Arithmetic {
                    detail: format!("integer overflow: {} {} {}", a, op.verb(), b),
                })
            }
            (Value::Float(a), Value::Float(b)) => Ok(Value::Float(match op {
                BinaryOp::Add => a + b,
                BinaryOp::Sub => a - b,
                BinaryOp::Mul => a * b,
                BinaryOp::Div => a / b,
                _ => a % b,
            })),
            (Value::String(a), Value::String(b)) if op == BinaryOp::Add => {
                let mut joined = String::with_capacity(a.len() + b.len());
                joined.push_str(a);
                joined.push_str(b);
                Ok(Value::String(joined))
            }
            _ => Err(mismatch(op.verb(), self, rhs)),
        }
    }

    fn compare(&self, op: BinaryOp, rhs: &Value) -> Result<Value> {
        let ordering = match (self, rhs) {
            (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            _ => return Err(mismatch(op.verb(), self, rhs)),
        };

        // NaN compares false against everything
        let Some(ordering) = ordering else {
            return Ok(Value::Boolean(false));
        };

        Ok(Value::Boolean(match op {
            BinaryOp::Lt => ordering == Ordering::Less,
            BinaryOp::Le => ordering != Ordering::Greater,
            BinaryOp::Gt => ordering == Ordering::Greater,
            _ => ordering != Ordering::Less,
        }))
    }

    /// Unary minus
    pub fn negate(&self) -> Result<Value> {
        match self {
            Value::Absent => Err(ValueError::absent("negate")),
            Value::Integer(n) => n.checked_neg().map(Value::Integer).ok_or_else(|| {
                ValueError::Arithmetic {
                    detail: format!("integer overflow: negate {}", n),
                }
            }),
            Value::Float(n) => Ok(Value::Float(-n)),
            other => Err(ValueError::mismatch("negate", other.kind().name())),
        }
    }

    /// Logical not
    pub fn not(&self) -> Result<Value> {
        match self {
            Value::Absent => Err(ValueError::absent("logically negate")),
            Value::Boolean(b) => Ok(Value::Boolean(!b)),
            other => Err(ValueError::mismatch("logically negate", other.kind().name())),
        }
    }

    /// Read `self[key]`
    ///
    /// Arrays and sequences take integer keys, maps and documents take string
    /// keys. A missing map key reads as absent.
    pub fn index(&self, key: &Value) -> Result<Value> {
        if self.is_absent() || key.is_absent() {
            return Err(ValueError::absent("index"));
        }

        match (self, key) {
            (Value::Array(items), Value::Integer(i)) => {
                let slot = checked_slot(*i, items.len())?;
                Ok(items[slot].clone())
            }
            (Value::Map(entries), Value::String(k)) => {
                Ok(entries.get(k).cloned().unwrap_or(Value::Absent))
            }
            (Value::Document(doc), Value::String(k)) => Ok(doc
                .get(k.as_str())
                .map(|d| Value::document(d.clone()))
                .unwrap_or(Value::Absent)),
            (Value::Document(doc), Value::Integer(i)) => match doc.as_array() {
                Some(items) => {
                    let slot = checked_slot(*i, items.len())?;
                    Ok(Value::document(items[slot].clone()))
                }
                None => Err(ValueError::mismatch("index", "a non-array document by position")),
            },
            (Value::Markup(markup), Value::Integer(i)) => {
                let slot = checked_slot(*i, markup.len())?;
                Ok(Value::markup(markup.item(slot)?))
            }
            _ => Err(mismatch("index", self, key)),
        }
    }

    /// Write `self[key] = value`
    ///
    /// Writing one past the end of an array appends. Shared composites are
    /// copied before the write.
    pub fn set_index(&mut self, key: &Value, value: Value) -> Result<()> {
        if key.is_absent() {
            return Err(ValueError::absent("index"));
        }
        match (self, key) {
            (Value::Absent, _) => Err(ValueError::absent("index")),
            (Value::Array(items), Value::Integer(i)) => {
                let len = items.len();
                if *i < 0 || *i as usize > len {
                    return Err(ValueError::IndexOutOfRange { index: *i, length: len });
                }
                let items = Arc::make_mut(items);
                if *i as usize == len {
                    items.push(value);
                } else {
                    items[*i as usize] = value;
                }
                Ok(())
            }
            (Value::Map(entries), Value::String(k)) => {
                Arc::make_mut(entries).insert(k.clone(), value);
                Ok(())
            }
            (target, key) => Err(mismatch("assign through", target, key)),
        }
    }

    /// Number of elements, entries, characters or items
    pub fn length(&self) -> Result<usize> {
        match self {
            Value::Absent => Err(ValueError::absent("take the length of")),
            Value::String(s) => Ok(s.chars().count()),
            Value::Array(items) => Ok(items.len()),
            Value::Map(entries) => Ok(entries.len()),
            Value::Markup(markup) => Ok(markup.len()),
            Value::Document(doc) => match doc.as_ref() {
                serde_json::Value::Array(items) => Ok(items.len()),
                serde_json::Value::Object(entries) => Ok(entries.len()),
                _ => Err(ValueError::mismatch("take the length of", "a scalar document")),
            },
            Value::Struct(s) => Ok(s.len()),
            other => Err(ValueError::mismatch("take the length of", other.kind().name())),
        }
    }
}

fn checked_slot(index: i64, length: usize) -> Result<usize> {
    if index < 0 || index as usize >= length {
        return Err(ValueError::IndexOutOfRange { index, length });
    }
    Ok(index as usize)
}

fn mismatch(verb: &str, left: &Value, right: &Value) -> ValueError {
    let found = if left.kind() == right.kind() && left.kind() != ValueKind::Any {
        format!("{} values", left.kind())
    } else {
        format!("{} and {}", left.kind(), right.kind())
    };
    ValueError::mismatch(verb, found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ValueMap;

    #[test]
    fn test_absent_equality_law() {
        let present = Value::Integer(0);
        assert_eq!(Value::Absent.binary(BinaryOp::Eq, &Value::Absent).unwrap(), Value::Boolean(true));
        assert_eq!(Value::Absent.binary(BinaryOp::Ne, &Value::Absent).unwrap(), Value::Boolean(false));
        assert_eq!(Value::Absent.binary(BinaryOp::Eq, &present).unwrap(), Value::Boolean(false));
        assert_eq!(present.binary(BinaryOp::Ne, &Value::Absent).unwrap(), Value::Boolean(true));
    }

    #[test]
    fn test_absent_operand_fails() {
        for op in [BinaryOp::Add, BinaryOp::Lt, BinaryOp::Rem] {
            let err = Value::Absent.binary(op, &Value::Integer(1)).unwrap_err();
            assert!(matches!(err, ValueError::ReferenceAbsence { .. }));
        }
        assert!(Value::Absent.index(&Value::Integer(0)).is_err());
        assert!(Value::Absent.negate().is_err());
        assert!(Value::Absent.length().is_err());
    }

    #[test]
    fn test_absent_negation_messages() {
        assert_eq!(
            Value::Absent.negate().unwrap_err().to_string(),
            "reference absence: cannot negate an absent value"
        );
        assert_eq!(
            Value::Absent.not().unwrap_err().to_string(),
            "reference absence: cannot logically negate an absent value"
        );
    }

    #[test]
    fn test_integer_arithmetic() {
        let a = Value::Integer(7);
        let b = Value::Integer(2);
        assert_eq!(a.binary(BinaryOp::Add, &b).unwrap(), Value::Integer(9));
        assert_eq!(a.binary(BinaryOp::Div, &b).unwrap(), Value::Integer(3));
        assert_eq!(a.binary(BinaryOp::Rem, &b).unwrap(), Value::Integer(1));
        assert!(a.binary(BinaryOp::Div, &Value::Integer(0)).is_err());
        assert!(Value::Integer(i64::MAX).binary(BinaryOp::Add, &b).is_err());
    }

    #[test]
    fn test_no_implicit_coercion() {
        let err = Value::Integer(1).binary(BinaryOp::Add, &Value::Float(1.0)).unwrap_err();
        assert_eq!(err.to_string(), "type mismatch: cannot add integer and float");
    }

    #[test]
    fn test_string_concat_and_compare() {
        let a = Value::from("ab");
        let b = Value::from("cd");
        assert_eq!(a.binary(BinaryOp::Add, &b).unwrap(), Value::from("abcd"));
        assert_eq!(a.binary(BinaryOp::Lt, &b).unwrap(), Value::Boolean(true));
    }

    #[test]
    fn test_index_map_missing_key_is_absent() {
        let mut entries = ValueMap::new();
        entries.insert("k".to_string(), Value::Integer(1));
        let map = Value::map(entries);
        assert_eq!(map.index(&Value::from("k")).unwrap(), Value::Integer(1));
        assert_eq!(map.index(&Value::from("missing")).unwrap(), Value::Absent);
    }

    #[test]
    fn test_set_index_copies_shared_array() {
        let original = Value::array(vec![Value::Integer(1)]);
        let mut copy = original.clone();
        copy.set_index(&Value::Integer(0), Value::Integer(5)).unwrap();
        copy.set_index(&Value::Integer(1), Value::Integer(6)).unwrap();
        assert_eq!(original.index(&Value::Integer(0)).unwrap(), Value::Integer(1));
        assert_eq!(copy.length().unwrap(), 2);
        assert!(copy.set_index(&Value::Integer(5), Value::Absent).is_err());
    }

    #[test]
    fn test_index_out_of_range() {
        let array = Value::array(vec![Value::Integer(1)]);
        let err = array.index(&Value::Integer(3)).unwrap_err();
        assert!(err.to_string().starts_with("index out of range"));
    }
}
