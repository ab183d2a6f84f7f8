//! # Trajectory Parameter Files
//!
//! Loads the trajectory-initial parameters the verifier is constructed
//! with. YAML and JSON are both accepted; the format is chosen by file
//! extension. Q values are raw scaled integers, digests are 64 lowercase
//! hex chars — the same conventions as the record wire form.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context};
use serde::Deserialize;

use coh_core::{Digest, Q18};
use coh_verifier::TrajectoryParams;

/// On-disk shape of a parameters file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParamsFile {
    /// Commitment to the state before the first record, 64 hex chars.
    pub initial_state_hash: String,
    /// Initial budget as a raw Q18 integer.
    pub initial_budget: i64,
    /// Risk coefficient as a raw Q18 integer.
    pub kappa: i64,
    /// Chain seed override. Defaults to the protocol genesis constant.
    #[serde(default)]
    pub genesis_chain_digest: Option<String>,
    /// Slab capacity override. Defaults to the protocol constant.
    #[serde(default)]
    pub slab_capacity: Option<usize>,
}

impl ParamsFile {
    /// Convert to verifier parameters, validating digests strictly.
    pub fn into_params(self) -> anyhow::Result<TrajectoryParams> {
        let initial_state_hash = Digest::from_hex(&self.initial_state_hash)
            .context("bad initial_state_hash")?;
        if self.initial_budget < 0 {
            bail!("initial_budget must be non-negative");
        }
        if self.kappa <= 0 {
            bail!("kappa must be positive");
        }
        let mut params = TrajectoryParams::new(
            initial_state_hash,
            Q18::from_raw(self.initial_budget),
            Q18::from_raw(self.kappa),
        );
        if let Some(hex) = &self.genesis_chain_digest {
            params.genesis_chain_digest =
                Digest::from_hex(hex).context("bad genesis_chain_digest")?;
        }
        if let Some(capacity) = self.slab_capacity {
            if capacity == 0 {
                bail!("slab_capacity must be positive");
            }
            params.slab_capacity = capacity;
        }
        Ok(params)
    }
}

/// Load trajectory parameters from a YAML or JSON file.
pub fn load_params(path: &Path) -> anyhow::Result<TrajectoryParams> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("cannot read params file {}", path.display()))?;
    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    let file: ParamsFile = if is_yaml {
        serde_yaml::from_str(&raw).context("bad YAML params file")?
    } else {
        serde_json::from_str(&raw).context("bad JSON params file")?
    };
    file.into_params()
}
