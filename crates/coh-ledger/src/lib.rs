//! # coh-ledger — Transition Records and the Budget Law
//!
//! The record model of the coherence audit kernel:
//!
//! - **Records** — the typed transition receipt: an eight-field hashed core,
//!   a non-consensus metadata partition, and (on seals) the slab side table.
//! - **Admissibility** — the per-record budget law: non-positive risk
//!   conserves the budget exactly; positive risk debits `mul(kappa, Δ, Up)`
//!   exactly; budgets never go negative.
//! - **Slabs** — fixed-capacity runs of records folded under a Merkle root,
//!   sealed by a distinguished `SLAB_SEAL` record.
//! - **Wire codec** — strict parsing of producer-submitted JSON with a
//!   precise construction-error taxonomy.
//!
//! Everything here is pure; the crate owns the byte representations of
//! records and their derived hashes, nothing else.

pub mod budget;
pub mod record;
pub mod slab;
pub mod wire;

// Re-export primary types.
pub use budget::{check_admissible, required_debit, AdmissibilityError};
pub use record::{ActionTag, Record, RecordCore, RecordMeta};
pub use slab::{check_seal, SlabError, SlabMember, SlabSummary, SLAB_CAPACITY};
pub use wire::{core_from_value, record_from_value, WireError, CORE_KEYS};
