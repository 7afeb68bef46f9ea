// THEORY:
// This file is the main entry point for the `beevision` library crate.
// It follows the standard Rust convention of using `lib.rs` to define the
// public API that will be exposed to external consumers (capture loops and
// presentation layers).
//
// The primary goal is to export the `BeeCountingPipeline` and its associated
// data structures (`PipelineConfig`, `BlobSize`, `Frame`) as the clean,
// high-level interface for the entire counting engine. The individual stage
// implementations live in `core_modules` and are public for consumers that
// want to compose or test stages directly.

pub mod core_modules;
pub mod error;
pub mod pipeline;
