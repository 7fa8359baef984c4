//! Background jobs started by the binary
//!
//! Each job runs on a fixed interval until the shutdown channel fires.
//! A failed tick is logged and retried on the next one.

pub mod revocation_purge;

pub use revocation_purge::RevocationPurgeJob;
