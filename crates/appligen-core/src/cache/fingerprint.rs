//! Request fingerprinting.
//!
//! A fingerprint is the hex SHA-256 of every request field, each one
//! length-prefixed and tagged with its name, so values cannot bleed into each
//! other. Backend identity is not part of it; a backend that needs its own
//! copy of an already-claimed entry stores it under [`variant_fingerprint`].

use sha2::{Digest, Sha256};

use appligen_types::generation::GenerationRequest;

/// Bumped whenever the field encoding below changes.
const FINGERPRINT_VERSION: &str = "v1";

/// Compute the cache key for a request. Pure and stable across processes.
pub fn fingerprint(request: &GenerationRequest) -> String {
    let mut hasher = Sha256::new();
    update_field(&mut hasher, "version", FINGERPRINT_VERSION);
    update_field(&mut hasher, "section", request.section.key());
    update_field(&mut hasher, "job_description", &request.job_description);
    update_field(&mut hasher, "profile", &request.profile);
    update_field(&mut hasher, "company_name", &request.company_name);
    update_field(&mut hasher, "position_title", &request.position_title);
    // BTreeMap iteration is sorted, so the context encoding is canonical.
    for (key, value) in &request.additional_context {
        update_field(&mut hasher, "context_key", key);
        update_field(&mut hasher, "context_value", &value.to_string());
    }
    format!("{:x}", hasher.finalize())
}

/// Key for `backend`'s own variant of `request`, kept next to the shared
/// entry when that entry was produced by another backend.
pub fn variant_fingerprint(request: &GenerationRequest, backend: &str) -> String {
    let mut hasher = Sha256::new();
    update_field(&mut hasher, "variant_of", &fingerprint(request));
    update_field(&mut hasher, "backend", backend);
    format!("{:x}", hasher.finalize())
}

fn update_field(hasher: &mut Sha256, name: &str, value: &str) {
    hasher.update(name.as_bytes());
    hasher.update((value.len() as u64).to_le_bytes());
    hasher.update(value.as_bytes());
}
