//! Log classification module
//!
//! Matches raw console text against the signature catalog. Pure logic: no
//! I/O, no build-status awareness. Callers only invoke this for builds whose
//! outcome is not success; classifying a successful build is wasted work,
//! not an error.

use crate::catalog::Catalog;
use std::collections::BTreeSet;

/// Return the names of every signature with at least one matching rule.
///
/// Signatures are tested in catalog order; regex rules match across line
/// boundaries and literal rules are case-sensitive substring containment.
/// A signature is recorded at most once no matter how many of its rules
/// match. An empty result is valid and expected for unclassified failures.
pub fn classify(log_text: &str, catalog: &Catalog) -> BTreeSet<String> {
    let mut matched = BTreeSet::new();
    for signature in catalog.signatures() {
        if signature.matches(log_text) {
            matched.insert(signature.name().to_string());
        }
    }
    matched
}
