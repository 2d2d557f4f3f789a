// mcpgate-core/src/model/envelope.rs
// ============================================================================
// Module: Signature Envelope
// Description: Header + payload shape shared by ed25519 and keyless signatures.
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::cjs::CanonVersion;

/// Which signature scheme an envelope carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SigType {
    /// Ed25519 over canonical JSON bytes.
    Ed25519,
    /// Sigstore keyless bundle.
    SigstoreBundle,
}

/// Bundle payload encoding, present only for `sigstore_bundle` envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BundleEncoding {
    /// The bundle JSON is base64-encoded in the payload.
    Base64Json,
}

/// The optional header of a signature envelope.
///
/// # Invariants
/// - A nil header means legacy v1 ed25519 with a raw-hex payload.
/// - `bundle_encoding` is required when `sig_type == SigstoreBundle` and
///   forbidden otherwise; [`EnvelopeHeader::validate`] enforces this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeHeader {
    /// Canonicalization version the payload was signed/verified against.
    pub canon_version: String,
    /// Signature scheme.
    pub sig_type: SigType,
    /// Bundle payload encoding, `sigstore_bundle` only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundle_encoding: Option<BundleEncoding>,
}

/// Validation failure for an [`EnvelopeHeader`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnvelopeHeaderError {
    /// `canon_version` was empty or not a recognized tag.
    #[error("empty or invalid canon_version")]
    MissingCanonVersion,
    /// `sig_type` did not match `bundle_encoding`'s presence.
    #[error("bundle_encoding must be set iff sig_type is sigstore_bundle")]
    InconsistentBundleEncoding,
}

impl EnvelopeHeader {
    /// Validates the header's internal consistency per spec.md §4.7:
    /// both `canon_version` and the bundle payload are mandatory for
    /// `sigstore_bundle` envelopes; an empty `canon_version` is rejected
    /// unconditionally (spec.md §8 invariant 8).
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeHeaderError`] when the header is inconsistent.
    pub fn validate(&self) -> Result<(), EnvelopeHeaderError> {
        if self.canon_version.is_empty() || CanonVersion::parse(&self.canon_version).is_err() {
            return Err(EnvelopeHeaderError::MissingCanonVersion);
        }
        let needs_bundle_encoding = matches!(self.sig_type, SigType::SigstoreBundle);
        if needs_bundle_encoding != self.bundle_encoding.is_some() {
            return Err(EnvelopeHeaderError::InconsistentBundleEncoding);
        }
        Ok(())
    }

    /// Returns the parsed [`CanonVersion`] from this header's tag.
    ///
    /// # Errors
    ///
    /// Returns [`crate::cjs::CjsError`] when the tag is not `"v1"`/`"v2"`.
    pub fn canon_version(&self) -> Result<CanonVersion, crate::cjs::CjsError> {
        CanonVersion::parse(&self.canon_version)
    }
}

/// A parsed signature envelope: optional header plus raw payload bytes.
///
/// The payload's encoding (hex for ed25519, base64 for a sigstore bundle) is
/// determined by the header (or, for a legacy headerless envelope, is always
/// hex) and is not re-encoded here; `mcpgate-sign` owns decoding.
#[derive(Debug, Clone, PartialEq)]
pub struct SignatureEnvelope {
    /// Header, absent for a legacy v1 ed25519 envelope.
    pub header: Option<EnvelopeHeader>,
    /// Raw payload bytes as they appear on the second line of the file
    /// (hex digits or base64 characters, not yet decoded).
    pub payload: String,
}

impl SignatureEnvelope {
    /// Returns the effective canon version: the header's, or `v1` when the
    /// envelope is legacy (headerless).
    ///
    /// # Errors
    ///
    /// Returns [`crate::cjs::CjsError`] when the header carries an unknown tag.
    pub fn effective_canon_version(&self) -> Result<CanonVersion, crate::cjs::CjsError> {
        match &self.header {
            Some(header) => header.canon_version(),
            None => Ok(CanonVersion::V1),
        }
    }

    /// Returns the effective signature type: the header's, or `ed25519` when
    /// the envelope is legacy.
    #[must_use]
    pub fn effective_sig_type(&self) -> SigType {
        self.header.as_ref().map_or(SigType::Ed25519, |h| h.sig_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_canon_version_is_rejected() {
        let header = EnvelopeHeader {
            canon_version: String::new(),
            sig_type: SigType::SigstoreBundle,
            bundle_encoding: Some(BundleEncoding::Base64Json),
        };
        assert_eq!(
            header.validate(),
            Err(EnvelopeHeaderError::MissingCanonVersion)
        );
    }

    #[test]
    fn sigstore_bundle_requires_bundle_encoding() {
        let header = EnvelopeHeader {
            canon_version: "v2".to_string(),
            sig_type: SigType::SigstoreBundle,
            bundle_encoding: None,
        };
        assert_eq!(
            header.validate(),
            Err(EnvelopeHeaderError::InconsistentBundleEncoding)
        );
    }

    #[test]
    fn ed25519_rejects_bundle_encoding() {
        let header = EnvelopeHeader {
            canon_version: "v1".to_string(),
            sig_type: SigType::Ed25519,
            bundle_encoding: Some(BundleEncoding::Base64Json),
        };
        assert_eq!(
            header.validate(),
            Err(EnvelopeHeaderError::InconsistentBundleEncoding)
        );
    }

    #[test]
    fn legacy_envelope_defaults_to_v1_ed25519() {
        let envelope = SignatureEnvelope {
            header: None,
            payload: "deadbeef".to_string(),
        };
        assert_eq!(envelope.effective_canon_version().unwrap(), CanonVersion::V1);
        assert_eq!(envelope.effective_sig_type(), SigType::Ed25519);
    }
}
