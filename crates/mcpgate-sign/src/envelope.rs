// mcpgate-sign/src/envelope.rs
// ============================================================================
// Module: Signature Envelope I/O
// Description: Reads/writes the on-disk text format `<header-json>\n<payload>`.
// Purpose: Separate the text framing from the ed25519/keyless signers.
// Dependencies: mcpgate-core, hex, base64
// ============================================================================

//! ## Overview
//! A signature file is either legacy (a single line of raw hex, no header)
//! or current (a JSON header line, a newline, then hex or base64 payload
//! depending on `sig_type`). Writers here always emit the current format;
//! the legacy shape is only ever read, per spec.md §4.7/§6.

use std::fs;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use mcpgate_core::BundleEncoding;
use mcpgate_core::EnvelopeHeader;
use mcpgate_core::EnvelopeHeaderError;
use mcpgate_core::SigType;
use mcpgate_core::SignatureEnvelope;

use crate::error::SignError;

/// Reads and parses a signature envelope from `path`.
///
/// # Errors
///
/// Returns [`SignError::MalformedEnvelope`] when a header line is present
/// but is not valid JSON, or [`SignError::EmptyCanonVersion`] when the
/// header fails its own consistency check.
pub fn read(path: &Path) -> Result<SignatureEnvelope, SignError> {
    let text = fs::read_to_string(path)?;
    let trimmed = text.trim_end_matches('\n');
    match trimmed.split_once('\n') {
        Some((header_line, payload)) => {
            let header: EnvelopeHeader = serde_json::from_str(header_line)?;
            validate_header(&header)?;
            Ok(SignatureEnvelope {
                header: Some(header),
                payload: payload.trim().to_string(),
            })
        }
        None => Ok(SignatureEnvelope {
            header: None,
            payload: trimmed.trim().to_string(),
        }),
    }
}

/// Writes `envelope` to `path` in the current (non-legacy) format.
///
/// # Errors
///
/// Returns [`SignError::EmptyCanonVersion`] when `envelope.header` is
/// absent (writers never emit legacy envelopes) or fails validation.
pub fn write(path: &Path, envelope: &SignatureEnvelope) -> Result<(), SignError> {
    let header = envelope.header.as_ref().ok_or(SignError::EmptyCanonVersion)?;
    validate_header(header)?;
    let header_line = serde_json::to_string(header)?;
    let content = format!("{header_line}\n{}", envelope.payload);
    fs::write(path, content)?;
    Ok(())
}

/// Encodes raw signature/bundle bytes for the payload line, per `sig_type`.
#[must_use]
pub fn encode_payload(sig_type: SigType, bytes: &[u8]) -> String {
    match sig_type {
        SigType::Ed25519 => hex::encode(bytes),
        SigType::SigstoreBundle => BASE64.encode(bytes),
    }
}

/// Decodes a payload line back into raw bytes, per `sig_type`.
///
/// # Errors
///
/// Returns [`SignError::Hex`] or [`SignError::Base64`] on malformed input.
pub fn decode_payload(sig_type: SigType, payload: &str) -> Result<Vec<u8>, SignError> {
    match sig_type {
        SigType::Ed25519 => Ok(hex::decode(payload)?),
        SigType::SigstoreBundle => BASE64
            .decode(payload)
            .map_err(|err| SignError::Base64(err.to_string())),
    }
}

/// Builds the header for a fresh ed25519 envelope.
#[must_use]
pub fn ed25519_header(canon_version: mcpgate_core::CanonVersion) -> EnvelopeHeader {
    EnvelopeHeader {
        canon_version: canon_version.tag().to_string(),
        sig_type: SigType::Ed25519,
        bundle_encoding: None,
    }
}

/// Builds the header for a fresh sigstore-bundle envelope.
#[must_use]
pub fn sigstore_header(canon_version: mcpgate_core::CanonVersion) -> EnvelopeHeader {
    EnvelopeHeader {
        canon_version: canon_version.tag().to_string(),
        sig_type: SigType::SigstoreBundle,
        bundle_encoding: Some(BundleEncoding::Base64Json),
    }
}

/// Maps [`EnvelopeHeaderError`] onto this crate's error type.
fn validate_header(header: &EnvelopeHeader) -> Result<(), SignError> {
    header.validate().map_err(|err| match err {
        EnvelopeHeaderError::MissingCanonVersion => SignError::EmptyCanonVersion,
        EnvelopeHeaderError::InconsistentBundleEncoding => {
            SignError::MalformedEnvelope(err.to_string())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcpgate_core::CanonVersion;

    #[test]
    fn ed25519_envelope_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sig.txt");
        let header = ed25519_header(CanonVersion::V2);
        let payload = encode_payload(SigType::Ed25519, b"abc");
        write(&path, &SignatureEnvelope { header: Some(header), payload }).unwrap();

        let read_back = read(&path).unwrap();
        assert_eq!(read_back.effective_sig_type(), SigType::Ed25519);
        assert_eq!(read_back.effective_canon_version().unwrap(), CanonVersion::V2);
        assert_eq!(decode_payload(SigType::Ed25519, &read_back.payload).unwrap(), b"abc");
    }

    #[test]
    fn legacy_headerless_envelope_is_readable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("legacy.txt");
        fs::write(&path, "deadbeef").unwrap();
        let envelope = read(&path).unwrap();
        assert!(envelope.header.is_none());
        assert_eq!(envelope.effective_sig_type(), SigType::Ed25519);
        assert_eq!(
            decode_payload(envelope.effective_sig_type(), &envelope.payload).unwrap(),
            vec![0xde, 0xad, 0xbe, 0xef]
        );
    }

    #[test]
    fn empty_canon_version_is_rejected_on_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sig.txt");
        let header = EnvelopeHeader {
            canon_version: String::new(),
            sig_type: SigType::Ed25519,
            bundle_encoding: None,
        };
        let result = write(&path, &SignatureEnvelope { header: Some(header), payload: "aa".to_string() });
        assert!(result.is_err());
    }
}
