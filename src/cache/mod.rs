//! Memoization of expensive lookups.
//!
//! # Data Flow
//! ```text
//! caller → TtlCache::get(key, producer)
//!     live entry      → value returned, producer never called
//!     in-flight entry → caller awaits the same shared future
//!     missing/expired → producer called once, result shared with every waiter
//!                       Ok  → stored until now + ttl
//!                       Err → slot removed (no negative caching)
//! ```

pub mod ttl;

pub use ttl::TtlCache;
