//! Token security primitives for the Vidshare backend
//!
//! **Components**:
//! - `TokenCodec`: HS256 token issuance and verification (24h default lifetime)
//! - `RevocationLedger`: persisted set of tokens invalidated before expiry
//! - `RedisRevocationLedger` / `InMemoryRevocationLedger`: ledger backends
//! - Secret strength validation (length, entropy, obvious patterns)
//!
//! The codec is pure: it never consults the ledger. Callers that need
//! logout semantics (the HTTP gate) check the ledger after verification.

pub mod redis_ledger;
pub mod revocation;
pub mod secret_validation;
pub mod token_codec;

#[cfg(test)]
mod test_utils;

pub use redis_ledger::RedisRevocationLedger;
pub use revocation::{InMemoryRevocationLedger, LedgerError, RevocationLedger, RevocationRecord};
pub use secret_validation::{validate_secret_strength, SecretStrength};
pub use token_codec::{
    Claims, CodecInitError, TokenCodec, TokenError, DEFAULT_TOKEN_TTL_HOURS,
};
