use sha2::{Digest, Sha256};

/// Maps a rendered page to the identifier used as `PageState::hash`.
///
/// Crossover can only splice two chromosomes at a state both of them visited,
/// so the granularity chosen here directly controls how often recombination
/// happens.
pub trait StateFingerprint {
    fn fingerprint(&self, url: &str, markup: &str) -> String;
}

/// Whole-markup fingerprint: any change to URL or rendered content is a new state.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkupFingerprint;

impl StateFingerprint for MarkupFingerprint {
    fn fingerprint(&self, url: &str, markup: &str) -> String {
        // Length prefix keeps the url/markup boundary unambiguous
        let mut hasher = Sha256::new();
        hasher.update((url.len() as u64).to_le_bytes());
        hasher.update(url.as_bytes());
        hasher.update(markup.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

/// URL-only fingerprint. Pages that differ only in content collapse together.
#[derive(Debug, Clone, Copy, Default)]
pub struct UrlFingerprint;

impl StateFingerprint for UrlFingerprint {
    fn fingerprint(&self, url: &str, _markup: &str) -> String {
        format!("{:x}", Sha256::digest(url.as_bytes()))
    }
}
