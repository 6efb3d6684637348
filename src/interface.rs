//! String-in, string-out entry points for host bindings.
//!
//! Every argument is validated before any hashing starts. Keys are derived
//! with Kerl, the sponge used by current wallets.

use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::{Error, Result};
use crate::pow::{CancelToken, PowEngine, Solution};
use crate::signing::{self, BundleHash, SecurityLevel, Seed};
use crate::sponge::SpongeKind;
use crate::transaction::TransactionTrytes;

const KIND: SpongeKind = SpongeKind::Kerl;

/// Address for `seed` at `index`, 81 trytes without checksum.
pub fn generate_address(seed: &str, index: u64, security: u8) -> Result<String> {
    let security = SecurityLevel::try_from(security)?;
    let seed = Seed::from_trytes(seed)?;
    let key = signing::derive_key(&seed, index, security, KIND);
    Ok(signing::generate_address(&key, KIND)?.as_trytes().to_string())
}

/// Addresses for indices `start..start + count`, in order.
pub fn generate_addresses(seed: &str, start: u64, security: u8, count: usize) -> Result<Vec<String>> {
    let security = SecurityLevel::try_from(security)?;
    let seed = Seed::from_trytes(seed)?;
    let addresses = signing::generate_addresses(&seed, start, security, count, KIND)?;
    Ok(addresses.into_iter().map(|a| a.as_trytes().to_string()).collect())
}

/// Signature trytes for `bundle_hash`, `security * 2187` long.
pub fn generate_signature(seed: &str, index: u64, security: u8, bundle_hash: &str) -> Result<String> {
    let security = SecurityLevel::try_from(security)?;
    let seed = Seed::from_trytes(seed)?;
    let bundle = BundleHash::from_trytes(bundle_hash)?;
    let key = signing::derive_key(&seed, index, security, KIND);
    Ok(signing::sign(&key, &bundle, security, KIND)?.to_trytes())
}

/// Runs PoW on all cores and returns the 27-tryte nonce.
pub fn do_pow(trytes: &str, mwm: usize) -> Result<String> {
    let (_, solution) = do_pow_with(&PowEngine::default(), trytes, mwm, &CancelToken::new())?;
    Ok(solution.nonce)
}

/// Like [`do_pow`], but returns the transaction trytes with the nonce applied.
pub fn finalize_pow(trytes: &str, mwm: usize) -> Result<String> {
    let (tx, _) = do_pow_with(&PowEngine::default(), trytes, mwm, &CancelToken::new())?;
    Ok(tx)
}

pub fn do_pow_with(
    engine: &PowEngine,
    trytes: &str,
    mwm: usize,
    cancel: &CancelToken,
) -> Result<(String, Solution)> {
    let mut tx = TransactionTrytes::from_trytes(trytes)?;
    let solution = engine.search(&mut tx, mwm, cancel)?;
    Ok((tx.to_trytes(), solution))
}

/// A proof-of-work search running on tokio's blocking pool.
pub struct PowHandle {
    handle: JoinHandle<Result<(String, Solution)>>,
    cancel: CancelToken,
}

impl PowHandle {
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for the search. Panics in the search are propagated.
    pub async fn join(self) -> Result<(String, Solution)> {
        match self.handle.await {
            Ok(result) => result,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(_) => Err(Error::Cancelled),
        }
    }
}

/// Starts a search without blocking the async runtime.
///
/// Input is validated up front, so a bad transaction or MWM fails here
/// rather than from [`PowHandle::join`].
pub fn spawn_pow(engine: PowEngine, trytes: &str, mwm: usize) -> Result<PowHandle> {
    let mut tx = TransactionTrytes::from_trytes(trytes)?;
    if mwm > crate::ternary::HASH_LENGTH {
        return Err(Error::InvalidMinWeightMagnitude(mwm));
    }

    let cancel = CancelToken::new();
    let token = cancel.clone();
    debug!("Spawning PoW search, MWM: {}", mwm);
    let handle = tokio::task::spawn_blocking(move || -> Result<(String, Solution)> {
        let solution = engine.search(&mut tx, mwm, &token)?;
        Ok((tx.to_trytes(), solution))
    });

    Ok(PowHandle { handle, cancel })
}
