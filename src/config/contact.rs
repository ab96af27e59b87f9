//! `[contact]` section configuration.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};

/// `[contact]` section in folio.toml - contact form endpoint settings.
///
/// # Example
/// ```toml
/// [contact]
/// relay_url = "https://formspree.io/f/xxxxxxx"
/// max_body_bytes = 65536
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct ContactConfig {
    /// Public form relay the front end falls back to when `/api/contact` fails.
    #[serde(default = "defaults::contact::relay_url")]
    #[educe(Default = defaults::contact::relay_url())]
    pub relay_url: String,

    /// Largest accepted request body.
    #[serde(default = "defaults::contact::max_body_bytes")]
    #[educe(Default = defaults::contact::max_body_bytes())]
    pub max_body_bytes: usize,
}

#[cfg(test)]
mod tests {
    use super::super::SiteConfig;

    #[test]
    fn test_contact_config_defaults() {
        let config: SiteConfig = toml::from_str("").unwrap();

        assert!(config.contact.relay_url.starts_with("https://formspree.io/"));
        assert_eq!(config.contact.max_body_bytes, 65536);
    }
}
