//! Seed-derived keys, addresses and one-time signatures.
//!
//! A seed and index are mixed and hashed into a subseed, the subseed is
//! squeezed into `security` key fragments, and each fragment is hashed down
//! to a public digest. The address is the hash of those digests.

pub mod address;
pub mod key;
pub mod seed;
pub mod signature;

pub use address::{generate_address, generate_addresses, key_digests, Address, CHECKSUM_TRYTES};
pub use key::{derive_key, subseed, DerivedKey, FRAGMENT_LENGTH, FRAGMENT_TRYTES};
pub use seed::{SecurityLevel, Seed};
pub use signature::{sign, signature_digest, validate_signature, BundleHash, NormalizedBundle, Signature};
