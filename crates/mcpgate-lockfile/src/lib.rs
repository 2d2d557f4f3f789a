// mcpgate-lockfile/src/lib.rs
// ============================================================================
// Module: MCP Gate Lockfile Library
// Description: Builds, loads, and diffs v3 lockfiles against live scans.
// Dependencies: mcpgate-core
// ============================================================================

//! ## Overview
//! This crate turns a [`mcpgate_core::ScanReport`] into a v3
//! [`mcpgate_core::Lockfile`] ([`builder::build`]), validates and compiles
//! RFC 6570 level-1 resource templates ([`template`]), persists lockfiles
//! atomically ([`io`]), and classifies drift between a stored lockfile and a
//! fresh scan ([`drift::compare_v3`]).

pub mod builder;
pub mod drift;
pub mod error;
pub mod io;
pub mod template;

pub use builder::build;
pub use drift::compare_v3;
pub use error::LockfileError;
pub use io::read;
pub use io::write_atomic;
pub use template::compile as compile_template;
pub use template::validate_level1;
