//! Migrator configuration.

use mpcd_transfer::Tag;

/// Tags separating the two messages of each per-face exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MessageTags {
    /// Tag of the record-count message.
    pub size: Tag,
    /// Tag of the raw record payload.
    pub payload: Tag,
}

impl Default for MessageTags {
    fn default() -> Self {
        Self { size: 0, payload: 1 }
    }
}

/// Configuration for a [`Migrator`](crate::Migrator).
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MigratorConfig {
    /// Message tags used on the transport.
    pub tags: MessageTags,

    /// Check that every wrapped record lands inside the wrap box.
    ///
    /// A record that does not means some particle moved further than one
    /// subdomain in a single step. Violations are logged, not rejected.
    pub verify_wrap: bool,
}

impl MigratorConfig {
    /// Set the message tags.
    #[must_use]
    pub fn with_tags(mut self, size: Tag, payload: Tag) -> Self {
        self.tags = MessageTags { size, payload };
        self
    }

    /// Enable or disable post-wrap verification.
    #[must_use]
    pub fn with_verify_wrap(mut self, verify: bool) -> Self {
        self.verify_wrap = verify;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tags_are_distinct() {
        let config = MigratorConfig::default();
        assert_eq!(config.tags, MessageTags { size: 0, payload: 1 });
        assert!(!config.verify_wrap);
    }

    #[test]
    fn test_builders() {
        let config = MigratorConfig::default().with_tags(10, 11).with_verify_wrap(true);
        assert_eq!(config.tags.size, 10);
        assert_eq!(config.tags.payload, 11);
        assert!(config.verify_wrap);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_config_from_json() {
        let config: MigratorConfig =
            serde_json::from_str(r#"{"tags":{"size":4,"payload":5},"verify_wrap":true}"#).unwrap();
        assert_eq!(config.tags, MessageTags { size: 4, payload: 5 });
        assert!(config.verify_wrap);
    }
}
