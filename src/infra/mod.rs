// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Handles cross-cutting concerns that don't belong in any
// specific business layer:
//
//   checkpoint.rs — Saving and loading model weights with
//                   Burn's CompactRecorder, plus the config
//                   and schema JSON sidecars needed to rebuild
//                   the exact model for `evaluate`.
//
//   metrics.rs    — Per-epoch training metrics appended to a
//                   CSV file for later analysis and plotting.
//
// Reference: Rust Book §7 (Modules)
//            Burn Book §5 (Checkpointing)

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Training metrics CSV logger
pub mod metrics;
