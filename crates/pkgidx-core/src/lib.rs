//! Control-file normalization and parsing.
//!
//! [`Normalizer`] collapses folded long-form and list-form field values in
//! raw text, and [`RecordParser`] turns the result into an ordered
//! [`Collection`] of [`Record`]s.

pub mod block;
pub mod boundary;
pub mod constants;
pub mod error;
pub mod normalize;
pub mod parser;
pub mod record;

pub use boundary::BoundaryRule;
pub use error::{CoreError, CoreResult};
pub use normalize::{normalize_field, FieldClass, Normalizer};
pub use parser::{parse_records, RecordParser};
pub use record::{Collection, Record};
