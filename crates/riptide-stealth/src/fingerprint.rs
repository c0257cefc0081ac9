//! Fingerprint Source: generates a randomized per-page identity (user
//! agent, viewport, timezone, locale) applied by the Fetcher Adapter.
//!
//! Never reuses a fingerprint deterministically within the same session —
//! each call to [`FingerprintSource::next`] draws independently from the
//! configured pools.

use crate::user_agent::UserAgentManager;
use rand::Rng;
use riptide_types::Fingerprint;

const VIEWPORTS: &[(u32, u32)] = &[
    (1920, 1080),
    (1366, 768),
    (1536, 864),
    (1440, 900),
    (1280, 720),
    (1600, 900),
];

const TIMEZONES: &[&str] = &[
    "America/New_York",
    "America/Los_Angeles",
    "America/Chicago",
    "Europe/London",
    "Europe/Berlin",
    "Asia/Tokyo",
    "Australia/Sydney",
];

const LOCALES: &[&str] = &["en-US", "en-GB", "de-DE", "fr-FR", "es-ES", "ja-JP"];

/// Draws independent, randomized fingerprints per page.
pub struct FingerprintSource {
    user_agents: UserAgentManager,
}

impl FingerprintSource {
    pub fn new(user_agents: UserAgentManager) -> Self {
        Self { user_agents }
    }

    /// Produce a fresh fingerprint. Each field is drawn independently so
    /// the combination is not deterministically tied across pages.
    pub fn next(&mut self) -> Fingerprint {
        let mut rng = rand::thread_rng();
        let viewport = VIEWPORTS[rng.gen_range(0..VIEWPORTS.len())];
        let timezone = TIMEZONES[rng.gen_range(0..TIMEZONES.len())].to_string();
        let locale = LOCALES[rng.gen_range(0..LOCALES.len())].to_string();

        Fingerprint {
            user_agent: self.user_agents.next_user_agent().to_string(),
            viewport,
            timezone,
            locale,
        }
    }
}

impl Default for FingerprintSource {
    fn default() -> Self {
        Self::new(UserAgentManager::new(
            crate::user_agent::UserAgentConfig::default(),
        ))
    }
}
