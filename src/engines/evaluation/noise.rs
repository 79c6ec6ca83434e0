/// URL fragments of third-party trackers and analytics whose failures are not
/// defects of the application under test.
pub const DEFAULT_NOISE_PATTERNS: [&str; 10] = [
    "google-analytics",
    "doubleclick",
    "facebook",
    "gtm",
    "fbevents",
    "pixel",
    "ads",
    "telemetry",
    "cors",
    "optimizely",
];

/// Case-insensitive substring block-list applied to error URLs
#[derive(Debug, Clone)]
pub struct NoiseFilter {
    patterns: Vec<String>,
}

impl NoiseFilter {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            patterns: patterns
                .into_iter()
                .map(|p| p.as_ref().to_lowercase())
                .collect(),
        }
    }

    pub fn is_noise(&self, url: &str) -> bool {
        let url = url.to_lowercase();
        self.patterns.iter().any(|p| url.contains(p.as_str()))
    }
}

impl Default for NoiseFilter {
    fn default() -> Self {
        Self::new(DEFAULT_NOISE_PATTERNS)
    }
}
