//! Struct Values
//!
//! Fixed-shape records. Field slots are resolved ahead of time against a
//! `StructType`, so access at run time is by integer index only.

use super::{write_nested, Value, ValueKind};
use crate::error::{Result, ValueError};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Declared field of a struct type
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub name: String,
    pub kind: ValueKind,
    /// Whether the field may hold `Value::Absent`
    pub nullable: bool,
    pub default: Option<Value>,
}

impl FieldDef {
    pub fn new(name: &str, kind: ValueKind) -> Self {
        FieldDef {
            name: name.to_string(),
            kind,
            nullable: false,
            default: None,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    fn initial_value(&self) -> Option<Value> {
        match &self.default {
            Some(v) => Some(v.clone()),
            None if self.nullable => Some(Value::Absent),
            None => self.kind.zero(),
        }
    }
}

/// Shape of a struct: ordered fields and their slots
#[derive(Debug, Clone, PartialEq)]
pub struct StructType {
    name: String,
    fields: Vec<FieldDef>,
    slots: HashMap<String, usize>,
}

impl StructType {
    /// Build a struct type, validating field names and defaults
    pub fn new(name: &str, fields: Vec<FieldDef>) -> Result<Self> {
        let mut slots = HashMap::with_capacity(fields.len());
        for (index, field) in fields.iter().enumerate() {
            if slots.insert(field.name.clone(), index).is_some() {
                return Err(ValueError::schema(format!(
                    "duplicate field '{}' in struct '{}'",
                    field.name, name
                )));
            }
            match field.initial_value() {
                Some(initial) => check_assignable(name, field, &initial)?,
                None => {
                    return Err(ValueError::schema(format!(
                        "field '{}' of struct '{}' needs a default value",
                        field.name, name
                    )))
                }
            }
        }
        Ok(StructType {
            name: name.to_string(),
            fields,
            slots,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Resolve a field name to its slot
    pub fn slot(&self, field: &str) -> Result<usize> {
        self.slots.get(field).copied().ok_or_else(|| {
            ValueError::schema(format!("struct '{}' has no field '{}'", self.name, field))
        })
    }

    fn field(&self, index: usize) -> Result<&FieldDef> {
        self.fields.get(index).ok_or_else(|| {
            ValueError::schema(format!(
                "struct '{}' has no field at slot {} ({} fields)",
                self.name,
                index,
                self.fields.len()
            ))
        })
    }
}

/// An instance of a `StructType`
#[derive(Debug, Clone, PartialEq)]
pub struct StructValue {
    ty: Arc<StructType>,
    values: Vec<Value>,
}

impl StructValue {
    /// New instance with every field at its initial value
    pub fn new(ty: Arc<StructType>) -> Self {
        let values = ty
            .fields
            .iter()
            .map(|f| f.initial_value().unwrap_or(Value::Absent))
            .collect();
        StructValue { ty, values }
    }

    pub fn struct_type(&self) -> &Arc<StructType> {
        &self.ty
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn field_at(&self, index: usize) -> Result<&Value> {
        self.ty.field(index)?;
        Ok(&self.values[index])
    }

    pub fn set_field(&mut self, index: usize, value: Value) -> Result<()> {
        let field = self.ty.field(index)?;
        check_assignable(&self.ty.name, field, &value)?;
        self.values[index] = value;
        Ok(())
    }

    /// Read a field by name, resolving its slot first
    pub fn get(&self, field: &str) -> Result<&Value> {
        let slot = self.ty.slot(field)?;
        self.field_at(slot)
    }
}

/// Read field `index` of a struct reference
///
/// An absent reference fails; it is never replaced by a default instance.
pub fn field_at(value: &Value, index: usize) -> Result<Value> {
    match value {
        Value::Absent => Err(ValueError::absent("access a field of")),
        Value::Struct(s) => s.field_at(index).cloned(),
        other => Err(ValueError::mismatch("access a field of", other.kind().name())),
    }
}

fn check_assignable(struct_name: &str, field: &FieldDef, value: &Value) -> Result<()> {
    if value.is_absent() {
        if field.nullable {
            return Ok(());
        }
        return Err(ValueError::schema(format!(
            "field '{}' of struct '{}' cannot hold an absent value",
            field.name, struct_name
        )));
    }
    if !field.kind.accepts(value) {
        return Err(ValueError::schema(format!(
            "field '{}' of struct '{}' expects {}, got {}",
            field.name,
            struct_name,
            field.kind,
            value.kind()
        )));
    }
    Ok(())
}

impl fmt::Display for StructValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {{", self.ty.name)?;
        for (i, (field, value)) in self.ty.fields.iter().zip(&self.values).enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, " {}: ", field.name)?;
            write_nested(f, value)?;
        }
        f.write_str(" }")
    }
}
