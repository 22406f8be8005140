//! Which impacted domains still need a Feature.

use std::collections::BTreeSet;

/// Domains present on the assessment that have no Feature yet.
///
/// Computes `distinct(impacted) − existing` with exact, case-sensitive label
/// matching and returns it sorted ascending. The result never holds
/// duplicates, whatever the multiplicity of `impacted`.
pub fn missing_domains<I, E>(impacted: I, existing: E) -> Vec<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
    E: IntoIterator,
    E::Item: AsRef<str>,
{
    let impacted: BTreeSet<String> = impacted
        .into_iter()
        .map(|d| d.as_ref().to_string())
        .collect();
    if impacted.is_empty() {
        return Vec::new();
    }

    let existing: BTreeSet<String> = existing
        .into_iter()
        .map(|d| d.as_ref().to_string())
        .collect();

    // BTreeSet iterates in ascending order, so the difference is already sorted.
    impacted.difference(&existing).cloned().collect()
}
