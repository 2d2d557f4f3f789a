// mcpgate-core/src/lib.rs
// ============================================================================
// Module: MCP Gate Core Library
// Description: Public API surface for the MCP Gate core.
// Purpose: Expose canonical JSON, hashing, risk classification, the shared
//          error taxonomy, and the data model every other crate builds on.
// Dependencies: crate::{cjs, error, hashing, model, risk}
// ============================================================================

//! ## Overview
//! MCP Gate core has no subprocess, network, or filesystem dependency; it is
//! the pure data layer shared by the scanner, lockfile builder, drift
//! engine, signer, artifact resolver, policy engine, proxy, and evidence
//! writers. Everything here is deterministic and side-effect free.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod cjs;
pub mod error;
pub mod hashing;
pub mod model;
pub mod risk;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use cjs::CanonVersion;
pub use cjs::CjsError;
pub use cjs::canonicalize;
pub use cjs::canonicalize_value;

pub use error::ArtifactFailure;
pub use error::ErrorKind;
pub use error::PolicyFailure;
pub use error::ProvenanceFailure;
pub use error::ProxyFailure;
pub use error::ScanFailure;
pub use error::SignatureFailure;

pub use hashing::Sha256Digest;
pub use hashing::hash_canonical_json;

pub use risk::RiskLevel;
pub use risk::classify as classify_risk;

pub use model::artifact::ArtifactPin;
pub use model::artifact::LocalPin;
pub use model::artifact::NpmPin;
pub use model::artifact::OciPin;
pub use model::drift::DriftItem;
pub use model::drift::DriftSeverity;
pub use model::drift::DriftType;
pub use model::drift::FailOn;
pub use model::drift::severity_of;
pub use model::envelope::BundleEncoding;
pub use model::envelope::EnvelopeHeader;
pub use model::envelope::EnvelopeHeaderError;
pub use model::envelope::SigType;
pub use model::envelope::SignatureEnvelope;
pub use model::lockfile::Lockfile;
pub use model::lockfile::PromptEntry;
pub use model::lockfile::PromptSection;
pub use model::lockfile::ResourceSection;
pub use model::lockfile::ServerIdentity;
pub use model::lockfile::StaticResourceEntry;
pub use model::lockfile::TemplateEntry;
pub use model::lockfile::ToolEntry;
pub use model::policy::PolicyConfig;
pub use model::policy::PolicyMode;
pub use model::policy::PolicyReport;
pub use model::policy::PolicyRule;
pub use model::policy::RuleOutcome;
pub use model::policy::RuleResult;
pub use model::policy::RuleSeverity;
pub use model::provenance::ProvenanceInfo;
pub use model::provenance::ProvenanceMethod;
pub use model::receipt::MAX_ERROR_LEN;
pub use model::receipt::PolicyInput;
pub use model::receipt::Receipt;
pub use model::receipt::ReceiptArtifactSummary;
pub use model::receipt::ReceiptLockfileSummary;
pub use model::receipt::ReceiptResult;
pub use model::receipt::RedactionResult;
pub use model::receipt::ResultStatus;
pub use model::scan::PromptArgument;
pub use model::scan::PromptInfo;
pub use model::scan::ResourceTemplateInfo;
pub use model::scan::ScanReport;
pub use model::scan::StaticResourceInfo;
pub use model::scan::ToolInfo;
