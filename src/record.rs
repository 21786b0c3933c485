//! Static type-description and field-handle layer.
//!
//! A validatable type implements [`Record`] by enumerating its fields:
//! each [`Field`] pairs the static description ([`FieldMeta`]: declared
//! name, display label, raw rule annotation) with a mutable handle to the
//! current value ([`Value`]). Handlers read through the handle and, for
//! the mutating rules (`default`, `trimSpace`), write straight back into
//! the caller's record.
//!
//! The handle enum covers the supported shapes: owned scalars, optional
//! scalars (`None` is the zero value, the typed rendition of a nil
//! pointer), sequences, a string map, and three nested-record shapes
//! behind object-safe traits so the engine can recurse without knowing
//! the concrete type.
//!
//! The [`field!`] macro builds one `Field` per struct field:
//!
//! ```
//! use sieve::{field, Field, Record};
//!
//! #[derive(Default)]
//! struct Profile {
//!     name: String,
//!     age: i64,
//! }
//!
//! impl Record for Profile {
//!     fn fields(&mut self) -> Vec<Field<'_>> {
//!         vec![
//!             field!(str self.name, "required,trimSpace", "display name"),
//!             field!(int self.age, "gte=18"),
//!         ]
//!     }
//! }
//! ```

use std::collections::HashMap;
use std::fmt;

use crate::diagnostics::SieveError;
use crate::report::Report;

// ============================================================================
// RECORD CAPABILITIES
// ============================================================================

/// The unit of validation: an aggregate of named, typed fields.
pub trait Record {
    /// The declared fields, in declaration order. Called once per
    /// traversal of this record instance.
    fn fields(&mut self) -> Vec<Field<'_>>;

    /// Custom-validation hook. Runs exactly once per traversal, after
    /// every declared field has been processed, whether or not earlier
    /// rules recorded errors. Add cross-field errors via
    /// [`Report::push`]; there is no structural-failure channel here.
    fn post_validate(&mut self, report: &mut Report) {
        let _ = report;
    }

    /// Whether this record counts as a zero value when it appears as a
    /// field of another record (for `required`). Defaults to `false`;
    /// override with `self == &Self::default()` where that is meaningful.
    fn is_zero(&self) -> bool {
        false
    }
}

/// A pointer to a record validates as the record itself.
impl<R: Record + ?Sized> Record for Box<R> {
    fn fields(&mut self) -> Vec<Field<'_>> {
        (**self).fields()
    }

    fn post_validate(&mut self, report: &mut Report) {
        (**self).post_validate(report)
    }

    fn is_zero(&self) -> bool {
        (**self).is_zero()
    }
}

/// A nullable slot holding a nested record (`Option<R>`, `Option<Box<R>>`).
///
/// `dive` allocates a fresh default instance into an unset slot before
/// recursing, so nested `required` rules still fire against the zero
/// fields.
pub trait RecordSlot {
    fn is_unset(&self) -> bool;
    fn get_or_insert(&mut self) -> &mut dyn Record;
}

impl<R: Record + Default> RecordSlot for Option<R> {
    fn is_unset(&self) -> bool {
        self.is_none()
    }

    fn get_or_insert(&mut self) -> &mut dyn Record {
        let record: &mut R = Option::get_or_insert_with(self, R::default);
        record
    }
}

/// A sequence of nested records (`Vec<R>`, and `Vec<Box<R>>` through the
/// blanket `Box` impl).
pub trait RecordSeq {
    fn len(&self) -> usize;

    /// Visit every element in order, stopping at the first structural
    /// failure from the nested traversal.
    fn visit(
        &mut self,
        f: &mut dyn FnMut(&mut dyn Record) -> Result<(), SieveError>,
    ) -> Result<(), SieveError>;
}

impl<R: Record> RecordSeq for Vec<R> {
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn visit(
        &mut self,
        f: &mut dyn FnMut(&mut dyn Record) -> Result<(), SieveError>,
    ) -> Result<(), SieveError> {
        for record in self.iter_mut() {
            f(record)?;
        }
        Ok(())
    }
}

// ============================================================================
// FIELD DESCRIPTION AND VALUE HANDLE
// ============================================================================

/// Static per-field description. Derived from the record's declaration;
/// not persisted beyond one traversal.
#[derive(Debug, Clone, Copy)]
pub struct FieldMeta {
    /// Declared field name (the error grouping key).
    pub name: &'static str,
    /// Display label used in error messages; defaults to `name`.
    pub label: &'static str,
    /// Raw rule annotation, e.g. `"required,gt=2"`.
    pub rules: &'static str,
}

/// One declared field of a record: static description plus a live handle
/// into the record instance under validation.
pub struct Field<'a> {
    pub meta: FieldMeta,
    pub value: Value<'a>,
}

impl Field<'_> {
    pub fn kind(&self) -> Kind {
        self.value.kind()
    }
}

/// Coarse value shape, for diagnostics ("rule `gt` is not allowed for
/// record values") and kind-dispatched handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Text,
    Int,
    Float,
    Seq,
    Map,
    Record,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Text => "text",
            Kind::Int => "integer",
            Kind::Float => "float",
            Kind::Seq => "sequence",
            Kind::Map => "map",
            Kind::Record => "record",
        };
        f.write_str(name)
    }
}

/// Mutable handle to one field's current value, borrowed from the
/// caller's record for the duration of the traversal.
pub enum Value<'a> {
    Str(&'a mut String),
    Int(&'a mut i64),
    Float(&'a mut f64),
    OptStr(&'a mut Option<String>),
    OptInt(&'a mut Option<i64>),
    OptFloat(&'a mut Option<f64>),
    StrSeq(&'a mut Vec<String>),
    IntSeq(&'a mut Vec<i64>),
    StrMap(&'a mut HashMap<String, String>),
    Record(&'a mut dyn Record),
    OptRecord(&'a mut dyn RecordSlot),
    RecordSeq(&'a mut dyn RecordSeq),
}

impl Value<'_> {
    pub fn kind(&self) -> Kind {
        match self {
            Value::Str(_) | Value::OptStr(_) => Kind::Text,
            Value::Int(_) | Value::OptInt(_) => Kind::Int,
            Value::Float(_) | Value::OptFloat(_) => Kind::Float,
            Value::StrSeq(_) | Value::IntSeq(_) | Value::RecordSeq(_) => Kind::Seq,
            Value::StrMap(_) => Kind::Map,
            Value::Record(_) | Value::OptRecord(_) => Kind::Record,
        }
    }

    /// The type's zero/empty check driving the opt-in optionality policy:
    /// an unset `Option` is zero regardless of the wrapped type, matching
    /// nil-pointer semantics; a populated `Some(0)` is not zero.
    pub fn is_zero(&self) -> bool {
        match self {
            Value::Str(s) => s.is_empty(),
            Value::Int(i) => **i == 0,
            Value::Float(f) => **f == 0.0,
            Value::OptStr(o) => o.is_none(),
            Value::OptInt(o) => o.is_none(),
            Value::OptFloat(o) => o.is_none(),
            Value::StrSeq(v) => v.is_empty(),
            Value::IntSeq(v) => v.is_empty(),
            Value::StrMap(m) => m.is_empty(),
            Value::Record(r) => r.is_zero(),
            Value::OptRecord(slot) => slot.is_unset(),
            Value::RecordSeq(seq) => seq.len() == 0,
        }
    }

    /// Integer reading, dereferencing through an optional slot.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(**i),
            Value::OptInt(o) => **o,
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(**f),
            Value::OptFloat(o) => **o,
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s.as_str()),
            Value::OptStr(o) => o.as_deref(),
            _ => None,
        }
    }

    /// Write access to text, for the mutating rules.
    pub fn as_str_mut(&mut self) -> Option<&mut String> {
        match self {
            Value::Str(s) => Some(*s),
            Value::OptStr(o) => o.as_mut(),
            _ => None,
        }
    }

    /// Element count for sequences and maps; `None` for scalars and
    /// single records.
    pub fn seq_len(&self) -> Option<usize> {
        match self {
            Value::StrSeq(v) => Some(v.len()),
            Value::IntSeq(v) => Some(v.len()),
            Value::StrMap(m) => Some(m.len()),
            Value::RecordSeq(seq) => Some(seq.len()),
            _ => None,
        }
    }
}

// ============================================================================
// FIELD DECLARATION MACROS
// ============================================================================

/// Builds one [`Field`] from a struct field: kind keyword, place
/// expression, rule annotation, and an optional display label defaulting
/// to the field name.
///
/// Kind keywords: `str`, `int`, `float`, `opt_str`, `opt_int`,
/// `opt_float`, `str_seq`, `int_seq`, `str_map`, `record`, `opt_record`,
/// `record_seq`.
#[macro_export]
macro_rules! field {
    ($kind:ident $self:ident . $name:ident, $rules:expr) => {
        $crate::field!($kind $self.$name, $rules, stringify!($name))
    };
    ($kind:ident $self:ident . $name:ident, $rules:expr, $label:expr) => {
        $crate::Field {
            meta: $crate::FieldMeta {
                name: stringify!($name),
                label: $label,
                rules: $rules,
            },
            value: $crate::__field_value!($kind, $self.$name),
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __field_value {
    (str, $place:expr) => {
        $crate::Value::Str(&mut $place)
    };
    (int, $place:expr) => {
        $crate::Value::Int(&mut $place)
    };
    (float, $place:expr) => {
        $crate::Value::Float(&mut $place)
    };
    (opt_str, $place:expr) => {
        $crate::Value::OptStr(&mut $place)
    };
    (opt_int, $place:expr) => {
        $crate::Value::OptInt(&mut $place)
    };
    (opt_float, $place:expr) => {
        $crate::Value::OptFloat(&mut $place)
    };
    (str_seq, $place:expr) => {
        $crate::Value::StrSeq(&mut $place)
    };
    (int_seq, $place:expr) => {
        $crate::Value::IntSeq(&mut $place)
    };
    (str_map, $place:expr) => {
        $crate::Value::StrMap(&mut $place)
    };
    (record, $place:expr) => {
        $crate::Value::Record(&mut $place)
    };
    (opt_record, $place:expr) => {
        $crate::Value::OptRecord(&mut $place)
    };
    (record_seq, $place:expr) => {
        $crate::Value::RecordSeq(&mut $place)
    };
}
