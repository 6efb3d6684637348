// Library exports for entangled_core

pub mod config;
pub mod error;
pub mod interface;
pub mod pow;
pub mod signing;
pub mod sponge;
pub mod ternary;
pub mod transaction;

// Re-export main types for convenience
pub use config::{Config, PowConfig, SigningConfig};
pub use error::{Error, Result};
pub use pow::{CancelToken, PowEngine, Solution};
pub use signing::{Address, BundleHash, SecurityLevel, Seed, Signature};
pub use sponge::{Sponge, SpongeKind};
pub use transaction::TransactionTrytes;
