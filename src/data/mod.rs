// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// This layer handles everything from the raw CSV file
// all the way to tensor batches.
//
// The pipeline flows in this order:
//
//   .csv file
//       │
//       ▼
//   CsvLoader         → reads the file into a RawTable
//       │
//       ▼
//   Preparer          → classifies columns, standardizes numerics,
//       │               integer-codes categoricals, builds samples
//       ▼
//   splitter          → seeded shuffle + train/test/validation split
//       │
//       ▼
//   TabDataset        → implements Burn's Dataset trait
//       │
//       ▼
//   TabBatcher        → stacks samples into tensor batches
//       │
//       ▼
//   DataLoader        → feeds batches to the training loop
//
// Each module is responsible for exactly one step.
// This makes each step independently testable and replaceable.
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Loads the input CSV file into a RawTable
pub mod loader;

/// Column classification, scaling, encoding, sample building
pub mod preparer;

/// Seeded shuffle and split into train/test or train/validation
pub mod splitter;

/// Implements Burn's Dataset trait for prepared samples
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;
