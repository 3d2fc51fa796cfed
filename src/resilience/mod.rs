//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Caller-wrapped operation:
//!     → retries.rs (explicit loop, backoff.rs schedule between attempts)
//!     → timeouts.rs (deadline on every transport call)
//!
//! Call-rate shaping (UI events, search boxes):
//!     → debounce.rs / throttle.rs
//!
//! Bulk work:
//!     → batch.rs (bounded chunks, yield between chunks)
//!
//! Read-through data:
//!     → cache.rs (TTL entries over a KeyValueStore, clock.rs for time)
//! ```
//!
//! # Design Decisions
//! - Nothing retries by default; callers opt in by wrapping an operation
//! - Backoff is deterministic: d, 2d, 4d, ... with no jitter and no cap
//! - Expired cache entries are evicted lazily on read, never swept

pub mod backoff;
pub mod batch;
pub mod cache;
pub mod clock;
pub mod debounce;
pub mod retries;
pub mod throttle;
pub mod timeouts;

pub use batch::{batch_process, try_batch_process, DEFAULT_BATCH_SIZE};
pub use cache::TtlCache;
pub use debounce::Debouncer;
pub use retries::{retry, retry_with};
pub use throttle::Throttle;
pub use timeouts::{delay, with_timeout};
