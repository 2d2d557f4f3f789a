// mcpgate-evidence/src/lib.rs
// ============================================================================
// Module: mcpgate-evidence
// Description: Cross-cutting evidence pipeline: operation ids, structured
//              events, tracing spans, receipts, and argument redaction.
// Purpose: spec.md §4.9.
// ============================================================================

//! ## Overview
//! Every `mcpgate` command shares one operation id ([`opid::new`]), emits a
//! `<command>.start`/`<command>.complete` pair through an [`events::EventSink`],
//! runs under a [`tracing_init::init`]-installed subscriber, and persists a
//! [`mcpgate_core::Receipt`] through a [`receipt::ReceiptWriter`]. Arguments
//! are always passed through [`redact::redact_argv`] before any of the above
//! sees them.

pub mod error;
pub mod events;
pub mod opid;
pub mod receipt;
pub mod redact;
pub mod timestamp;
pub mod tracing_init;

pub use error::EvidenceError;
pub use events::Event;
pub use events::EventFormat;
pub use events::EventSink;
pub use events::FileEventLogger;
pub use events::StderrEventLogger;
pub use receipt::ReceiptMode;
pub use receipt::ReceiptWriter;
pub use redact::redact_argv;
pub use tracing_init::TracingConfig;
pub use tracing_init::TracingGuard;
