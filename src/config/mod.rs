use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::signing::SecurityLevel;
use crate::sponge::SpongeKind;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub signing: SigningConfig,
    #[serde(default)]
    pub pow: PowConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SigningConfig {
    // Note: the seed is never stored here. Pass it with --seed or ENTANGLED_SEED.
    pub security: SecurityLevel,
    /// Append the 9-tryte checksum to printed addresses.
    pub checksum: bool,
    pub sponge: SpongeKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PowConfig {
    pub threads: usize,
    /// Batches of 64 nonces between cancellation checks.
    pub cancel_check_interval: u64,
    pub counter_start: u64,
    /// Exclusive upper bound, unbounded when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counter_end: Option<u64>,
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self {
            security: SecurityLevel::Medium,
            checksum: false,
            sponge: SpongeKind::Kerl,
        }
    }
}

impl Default for PowConfig {
    fn default() -> Self {
        Self {
            threads: num_cpus::get(),
            cancel_check_interval: 16,
            counter_start: 0,
            counter_end: None,
        }
    }
}

impl PowConfig {
    pub fn counter_end(&self) -> u64 {
        self.counter_end.unwrap_or(u64::MAX)
    }

    pub fn validate(&self) -> Result<()> {
        if self.threads == 0 {
            bail!("pow.threads must be at least 1");
        }
        if self.cancel_check_interval == 0 {
            bail!("pow.cancel_check_interval must be at least 1");
        }
        if self.counter_start >= self.counter_end() {
            bail!(
                "pow.counter_start ({}) must be below pow.counter_end ({})",
                self.counter_start,
                self.counter_end()
            );
        }
        Ok(())
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Security levels are checked while deserializing, so only the PoW
    /// table needs a pass here.
    pub fn validate(&self) -> Result<()> {
        self.pow.validate()
    }
}
