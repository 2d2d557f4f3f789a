// mcpgate-sign/src/lib.rs
// ============================================================================
// Module: MCP Gate Signing Library
// Description: Ed25519 and keyless signature envelopes over lockfiles.
// Dependencies: mcpgate-core, ed25519-dalek
// ============================================================================

//! ## Overview
//! Two signature modes share one on-disk envelope format ([`envelope`]):
//! ed25519 over a PEM-armored key ([`key`], [`ed25519`]) and a sigstore
//! keyless bundle produced by an external subprocess ([`keyless`]). The
//! [`sign`] and [`verify`] modules tie canonicalization, the envelope, and
//! the chosen signer/verifier together.

pub mod ed25519;
pub mod envelope;
pub mod error;
pub mod key;
pub mod keyless;
pub mod sign;
pub mod verify;

pub use envelope::decode_payload;
pub use envelope::encode_payload;
pub use error::SignError;
pub use key::load_private_key;
pub use key::load_public_key;
pub use key::write_private_key;
pub use key::write_public_key;
pub use keyless::DEFAULT_TOOL as DEFAULT_KEYLESS_TOOL;
pub use keyless::Identity as KeylessIdentity;
pub use keyless::SIGN_TIMEOUT as KEYLESS_SIGN_TIMEOUT;
pub use keyless::VERIFY_TIMEOUT as KEYLESS_VERIFY_TIMEOUT;
pub use sign::sign_ed25519;
pub use sign::sign_keyless;
pub use verify::verify_ed25519;
pub use verify::verify_keyless;
