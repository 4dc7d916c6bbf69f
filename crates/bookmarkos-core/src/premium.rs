//! Premium entitlement checks
//!
//! Every gated operation asks `Entitlements::require` before doing any
//! work, so a missing entitlement always surfaces as the same typed error.

use crate::error::{BookmarkError, BookmarkResult};
use crate::settings::Settings;

/// Features that need a premium entitlement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    AiSummary,
    JsonExport,
    MarkdownExport,
}

impl std::fmt::Display for Feature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Feature::AiSummary => "AI summary",
            Feature::JsonExport => "Export to JSON",
            Feature::MarkdownExport => "Export to Markdown",
        };
        f.write_str(name)
    }
}

/// What the current user is entitled to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Entitlements {
    premium: bool,
}

impl Entitlements {
    pub fn new(premium: bool) -> Self {
        Self { premium }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.is_premium)
    }

    pub fn is_premium(&self) -> bool {
        self.premium
    }

    /// Fail with `PremiumRequired` unless `feature` is available
    pub fn require(&self, feature: Feature) -> BookmarkResult<()> {
        if self.premium {
            Ok(())
        } else {
            Err(BookmarkError::PremiumRequired { feature })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_free_user_is_rejected() {
        let entitlements = Entitlements::from_settings(&Settings::default());
        for feature in [Feature::AiSummary, Feature::JsonExport, Feature::MarkdownExport] {
            let err = entitlements.require(feature).unwrap_err();
            assert!(err.is_premium_required());
        }
    }

    #[test]
    fn test_premium_user_is_allowed() {
        let settings = Settings {
            is_premium: true,
            ..Settings::default()
        };
        let entitlements = Entitlements::from_settings(&settings);
        assert!(entitlements.is_premium());
        assert!(entitlements.require(Feature::JsonExport).is_ok());
    }

    #[test]
    fn test_error_names_the_feature() {
        let err = Entitlements::default()
            .require(Feature::MarkdownExport)
            .unwrap_err();
        assert_eq!(err.to_string(), "Export to Markdown is a premium feature");
    }
}
