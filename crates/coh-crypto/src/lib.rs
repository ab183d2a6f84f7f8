//! # coh-crypto — Hash Primitives for the Coherence Audit Kernel
//!
//! This crate provides the two cryptographic building blocks of the kernel:
//!
//! - **Domain-separated SHA-256 helpers** for record content ids, chain
//!   digests, state commitments, slab bindings, and the genesis constant.
//!   The bare hash is never exposed; every preimage carries its fixed
//!   domain tag.
//! - **Merkle commitment** over ordered record batches, with inclusion
//!   proofs in the pinned `"L"`/`"R"` direction encoding.
//!
//! Everything here is a pure function of its inputs. SHA-256 is the only
//! shared resource and it is reentrant and deterministic.

pub mod hash;
pub mod merkle;

// Re-export primary entry points.
pub use hash::{
    chain_digest, empty_state_hash, genesis_chain_digest, receipt_id, slab_commitment, state_hash,
    DOMAIN_CHAIN, DOMAIN_GENESIS, DOMAIN_RECEIPT_ID, DOMAIN_SLAB, DOMAIN_STATE,
};
pub use merkle::{
    merkle_internal, merkle_leaf, merkle_root, prove, verify_inclusion, Direction, InclusionProof,
    MerkleError, ProofStep,
};
