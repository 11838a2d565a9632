//! roundtrip-core
//!
//! Core library for differential round-trip verification of a binary
//! disassembler/reassembler pipeline: compile an example program, disassemble
//! it into an intermediate representation, reassemble it, and check the
//! result for behavioral equivalence with the original.
//!
//! The disassembler, reassembler, and compilers are opaque external tools;
//! this crate only orchestrates them and interprets their exit codes and
//! artifacts. All substantive logic lives here so it is fully testable and
//! reusable from multiple frontends (CLI, CI glue, etc.).

pub mod compare;
pub mod driver;
pub mod hints;
pub mod ir;
pub mod process;
pub mod roundtrip;
pub mod suite;
pub mod toolchain;

/// Returns the library version as encoded at compile time.
///
/// Useful for tests and for frontends to report consistent version info.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
