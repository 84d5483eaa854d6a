//! The name-templating scheme used by per-node expansion.
//!
//! A name template may carry at most one useful occurrence of the token
//! `%d`.  Substitution replaces the first occurrence with a decimal index;
//! a template without the token is returned unchanged.  That silent no-op
//! is deliberate: expansion never fails on operator-authored names, it
//! just emits the same name for every node (see the tests).

/// The index token recognized in name and claim-name templates.
pub const INDEX_TOKEN: &str = "%d";

/// Substitutes `index` for the first `%d` in `template`.
///
/// Templates without the token come back unchanged.
pub fn substitute(template: &str, index: usize) -> String {
    template.replacen(INDEX_TOKEN, &index.to_string(), 1)
}
