// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Complexity limits
#![deny(clippy::cognitive_complexity)]
#![deny(clippy::excessive_nesting)]
// Function signature hygiene
#![deny(clippy::too_many_arguments)]
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Cargo lints (warn, not deny since cargo lints can be noisy)
#![warn(clippy::cargo)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]
// Tests lean on unwrap for brevity.
#![cfg_attr(
    test,
    allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)
)]

//! Video-codec compression artifacts as a real-time wgpu post-process.
//!
//! Each frame the renderer hands over its color output and motion vectors;
//! the pipeline degrades the image the way a bandwidth-starved video codec
//! would: blocky spatial quantization plus motion-compensated temporal
//! prediction from the previous compressed frame, with periodic I-frames.
//!
//! # Key entry points
//!
//! - [`compression::CompressionPass`] - per-frame pass sequencer and
//!   lifecycle hooks (`setup` / `process_frame` / `teardown`)
//! - [`compression::cadence`] - the I-frame / predicted-frame classifier
//! - [`compression::FrameHistory`] - the persistent previous-frame and
//!   motion-field images
//! - [`options::Options`] - TOML-backed user configuration
//!
//! # Architecture
//!
//! The core in [`compression`] is generic over a [`compression::FrameBackend`]
//! (the command stream) and a [`compression::CompressionKernel`] (the opaque
//! per-pixel kernel). [`gpu`] and [`postprocess`] provide the wgpu
//! implementations: a command-encoder backend, fullscreen motion and bypass
//! passes, and a compute-shader kernel whose workgroup size is read back from
//! its naga IR. All three per-frame passes are recorded into one encoder, so
//! ordering falls out of queue semantics.

pub mod compression;
pub mod error;
pub mod gpu;
pub mod options;
pub mod postprocess;
pub mod util;

pub use error::CodecError;
