// Sequence code generation
// Atomic per-type counters rendered as zero-padded, optionally prefixed/suffixed codes.

pub mod generator;
pub mod memory;
#[cfg(feature = "database")]
pub mod sqlite;
pub mod store;
pub mod types;

pub use generator::{format_code, SequenceGenerator};
pub use memory::InMemoryCounterStore;
#[cfg(feature = "database")]
pub use sqlite::SqliteCounterStore;
pub use store::CounterStore;
#[cfg(any(test, feature = "testing"))]
pub use store::MockCounterStore;
pub use types::{CodePosition, SequenceCounter, SequenceError, SequenceType, StoreError};
