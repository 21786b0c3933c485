//! Sieve: a declarative, annotation-driven validation engine for
//! structured records.
//!
//! Each field of a [`Record`] carries a short rule annotation
//! (`"required,gt=2,trimSpace"`). The engine parses the annotation into
//! an ordered rule list, resolves each rule against a fixed registry,
//! runs the handlers in declaration order, and accumulates field errors
//! in a [`Report`] — or mutates fields, for `default` and `trimSpace`.
//! `dive` recurses into nested records and record sequences, sharing the
//! accumulator; a record may add cross-field checks through its
//! `post_validate` hook.
//!
//! Failures travel through two disjoint channels: structural problems
//! (malformed regex syntax, unknown rule names, dispatch mismatches)
//! abort the call as a [`SieveError`], while per-field check failures
//! accumulate softly and never abort. Callers branch on the `Result`
//! first, then on [`Report::ok`].
//!
//! ```
//! use sieve::{field, validate, Field, Record};
//!
//! #[derive(Default)]
//! struct Signup {
//!     name: String,
//!     age: i64,
//! }
//!
//! impl Record for Signup {
//!     fn fields(&mut self) -> Vec<Field<'_>> {
//!         vec![
//!             field!(str self.name, "required,trimSpace", "name"),
//!             field!(int self.age, "required,gte=18", "age"),
//!         ]
//!     }
//! }
//!
//! let mut form = Signup { name: "  ada  ".into(), age: 30 };
//! let report = validate(&mut form).unwrap();
//! assert!(report.ok());
//! assert_eq!(form.name, "ada"); // trimSpace wrote through
//! ```

pub mod diagnostics;
pub mod engine;
mod messages;
pub mod patterns;
pub mod record;
pub mod registry;
pub mod report;
mod rules;
pub mod syntax;

pub use diagnostics::SieveError;
pub use engine::{validate, Engine, Zone, DATETIME_LAYOUT, DATE_LAYOUT};
pub use record::{Field, FieldMeta, Kind, Record, RecordSeq, RecordSlot, Value};
pub use report::{Error, Report};
pub use syntax::RuleSpec;
