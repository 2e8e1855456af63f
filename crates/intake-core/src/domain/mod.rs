//! Domain model (ids, envelope, storage event, processing record, ...).
//!
//! ここにあるものは I/O を一切行いません。
//! ストレージやドキュメントストアへのアクセスは ports を経由します。

pub mod envelope;
pub mod errors;
pub mod event;
pub mod ids;
pub mod outcome;
pub mod record;
pub mod table;

pub use self::envelope::normalize;
pub use self::errors::{EnvelopeError, IntakeError};
pub use self::event::StorageEvent;
pub use self::ids::{Id, IdMarker, InvocationId};
pub use self::outcome::IntakeOutcome;
pub use self::record::{ProcessingRecord, RecordFields};
pub use self::table::TableSummary;
