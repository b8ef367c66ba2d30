//! Feed filter types.
//!
//! A [`FilterSpec`] selects one ranked feed: which ranking (viewed, emailed,
//! shared), over which period, for which section, and for shared feeds
//! optionally which social network.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{CACHE_KEY_NO_SHARE, CACHE_KEY_SEPARATOR, DEFAULT_SECTION};
use crate::error::{FeedError, Result};

/// Ranking the feed is ordered by.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointKind {
    /// Most viewed articles.
    #[default]
    Viewed,
    /// Most emailed articles.
    Emailed,
    /// Most shared articles.
    Shared,
}

impl EndpointKind {
    /// Every endpoint kind, in menu order.
    pub const ALL: [EndpointKind; 3] = [Self::Viewed, Self::Emailed, Self::Shared];

    /// Path segment and cache-key token for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Viewed => "viewed",
            Self::Emailed => "emailed",
            Self::Shared => "shared",
        }
    }
}

impl fmt::Display for EndpointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EndpointKind {
    type Err = FeedError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| FeedError::InvalidFilter(format!("unknown endpoint '{}'", s)))
    }
}

/// Time window the ranking covers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// Last day.
    Day,
    /// Last seven days.
    #[default]
    Week,
    /// Last thirty days.
    Month,
}

impl Period {
    /// Every period, shortest first.
    pub const ALL: [Period; 3] = [Self::Day, Self::Week, Self::Month];

    /// Number of days covered.
    pub fn days(&self) -> u32 {
        match self {
            Self::Day => 1,
            Self::Week => 7,
            Self::Month => 30,
        }
    }

    /// Decimal form used in paths and cache keys.
    pub fn value(&self) -> String {
        self.days().to_string()
    }

    /// Human-readable label.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Day => "1 Day",
            Self::Week => "7 Days",
            Self::Month => "30 Days",
        }
    }

    /// Looks up the period covering exactly `days`.
    pub fn from_days(days: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.days() == days)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.days())
    }
}

impl FromStr for Period {
    type Err = FeedError;

    /// Accepts either the day count (`"7"`) or the name (`"week"`).
    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase();
        let by_name = match normalized.as_str() {
            "day" => Some(Self::Day),
            "week" => Some(Self::Week),
            "month" => Some(Self::Month),
            _ => None,
        };
        by_name
            .or_else(|| normalized.parse().ok().and_then(Self::from_days))
            .ok_or_else(|| FeedError::InvalidFilter(format!("unknown period '{}'", s)))
    }
}

/// Social network a shared feed is restricted to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShareKind {
    /// Shared on Facebook.
    Facebook,
    /// Shared on Twitter.
    Twitter,
}

impl ShareKind {
    /// Every share kind.
    pub const ALL: [ShareKind; 2] = [Self::Facebook, Self::Twitter];

    /// Path segment and cache-key token for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Facebook => "facebook",
            Self::Twitter => "twitter",
        }
    }
}

impl fmt::Display for ShareKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShareKind {
    type Err = FeedError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| FeedError::InvalidFilter(format!("unknown share type '{}'", s)))
    }
}

/// Selection of one ranked feed.
///
/// Equality is structural over all four fields, and [`FilterSpec::cache_key`]
/// is injective: two filters share a cache key iff they are equal.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Ranking.
    pub endpoint: EndpointKind,
    /// Time window.
    pub period: Period,
    /// Section name.
    pub section: String,
    /// Social network, only meaningful for shared feeds.
    pub share: Option<ShareKind>,
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self {
            endpoint: EndpointKind::default(),
            period: Period::default(),
            section: DEFAULT_SECTION.to_string(),
            share: None,
        }
    }
}

impl FilterSpec {
    /// Creates a filter for all sections and no share restriction.
    pub fn new(endpoint: EndpointKind, period: Period) -> Self {
        Self {
            endpoint,
            period,
            ..Default::default()
        }
    }

    /// Sets the section.
    pub fn with_section(mut self, section: impl Into<String>) -> Self {
        self.section = section.into();
        self
    }

    /// Sets the share kind.
    pub fn with_share(mut self, share: ShareKind) -> Self {
        self.share = Some(share);
        self
    }

    /// Derives the cache key: `endpoint-period-section-share`.
    ///
    /// Endpoint and period tokens never contain the separator and the share
    /// token is always the last segment, so the section may contain it.
    pub fn cache_key(&self) -> String {
        let share = self.share.map(|s| s.as_str()).unwrap_or(CACHE_KEY_NO_SHARE);
        format!(
            "{endpoint}{sep}{period}{sep}{section}{sep}{share}",
            endpoint = self.endpoint.as_str(),
            period = self.period.days(),
            section = self.section,
            share = share,
            sep = CACHE_KEY_SEPARATOR,
        )
    }

    /// Parses a key produced by [`FilterSpec::cache_key`].
    pub fn from_cache_key(key: &str) -> Result<Self> {
        let invalid = || FeedError::InvalidFilter(format!("malformed cache key '{}'", key));

        let mut head = key.splitn(3, CACHE_KEY_SEPARATOR);
        let endpoint = head.next().ok_or_else(invalid)?;
        let period = head.next().ok_or_else(invalid)?;
        let rest = head.next().ok_or_else(invalid)?;
        let (section, share) = rest.rsplit_once(CACHE_KEY_SEPARATOR).ok_or_else(invalid)?;

        let period = period
            .parse()
            .ok()
            .and_then(Period::from_days)
            .ok_or_else(invalid)?;
        let share = match share {
            CACHE_KEY_NO_SHARE => None,
            other => Some(other.parse()?),
        };

        Ok(Self {
            endpoint: endpoint.parse()?,
            period,
            section: section.to_string(),
            share,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use test_case::test_case;

    #[test]
    fn test_default_filter() {
        let filter = FilterSpec::default();
        assert_eq!(filter.endpoint, EndpointKind::Viewed);
        assert_eq!(filter.period, Period::Week);
        assert_eq!(filter.section, "all-sections");
        assert_eq!(filter.share, None);
    }

    #[test]
    fn test_builder() {
        let filter = FilterSpec::new(EndpointKind::Shared, Period::Day)
            .with_section("sports")
            .with_share(ShareKind::Facebook);
        assert_eq!(filter.endpoint, EndpointKind::Shared);
        assert_eq!(filter.period, Period::Day);
        assert_eq!(filter.section, "sports");
        assert_eq!(filter.share, Some(ShareKind::Facebook));
    }

    #[test]
    fn test_period_display_properties() {
        assert_eq!(Period::Day.display_name(), "1 Day");
        assert_eq!(Period::Week.display_name(), "7 Days");
        assert_eq!(Period::Month.display_name(), "30 Days");

        assert_eq!(Period::Day.value(), "1");
        assert_eq!(Period::Week.value(), "7");
        assert_eq!(Period::Month.value(), "30");
    }

    #[test_case("viewed", EndpointKind::Viewed)]
    #[test_case(" Emailed ", EndpointKind::Emailed)]
    #[test_case("SHARED", EndpointKind::Shared)]
    fn test_parse_endpoint(input: &str, expected: EndpointKind) {
        assert_eq!(input.parse::<EndpointKind>().unwrap(), expected);
    }

    #[test_case("1", Period::Day)]
    #[test_case("week", Period::Week)]
    #[test_case("30", Period::Month)]
    fn test_parse_period(input: &str, expected: Period) {
        assert_eq!(input.parse::<Period>().unwrap(), expected);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!("trending".parse::<EndpointKind>().is_err());
        assert!("14".parse::<Period>().is_err());
        assert!("myspace".parse::<ShareKind>().is_err());
    }

    #[test]
    fn test_equality() {
        let a = FilterSpec::new(EndpointKind::Emailed, Period::Month)
            .with_section("tech")
            .with_share(ShareKind::Twitter);
        let b = FilterSpec::new(EndpointKind::Emailed, Period::Month)
            .with_section("tech")
            .with_share(ShareKind::Twitter);
        assert_eq!(a, b);
        assert_ne!(
            FilterSpec::new(EndpointKind::Viewed, Period::Week),
            FilterSpec::new(EndpointKind::Shared, Period::Week)
        );
    }

    #[test]
    fn test_cache_key_format() {
        let filter = FilterSpec::new(EndpointKind::Viewed, Period::Day);
        assert_eq!(filter.cache_key(), "viewed-1-all-sections-none");

        let shared = FilterSpec::new(EndpointKind::Shared, Period::Week).with_share(ShareKind::Facebook);
        assert_eq!(shared.cache_key(), "shared-7-all-sections-facebook");
    }

    #[test]
    fn test_cache_key_with_dashed_section_parses_back() {
        let filter = FilterSpec::new(EndpointKind::Emailed, Period::Month).with_section("health-and-fitness");
        let parsed = FilterSpec::from_cache_key(&filter.cache_key()).unwrap();
        assert_eq!(parsed, filter);
    }

    #[test]
    fn test_malformed_cache_key() {
        assert!(FilterSpec::from_cache_key("viewed").is_err());
        assert!(FilterSpec::from_cache_key("viewed-2-all-none").is_err());
        assert!(FilterSpec::from_cache_key("viewed-1-all").is_err());
    }

    fn filter_strategy() -> impl Strategy<Value = FilterSpec> {
        (
            prop::sample::select(EndpointKind::ALL.to_vec()),
            prop::sample::select(Period::ALL.to_vec()),
            "[a-z-]{0,12}",
            prop::option::of(prop::sample::select(ShareKind::ALL.to_vec())),
        )
            .prop_map(|(endpoint, period, section, share)| FilterSpec {
                endpoint,
                period,
                section,
                share,
            })
    }

    proptest! {
        #[test]
        fn prop_cache_key_round_trips(filter in filter_strategy()) {
            let parsed = FilterSpec::from_cache_key(&filter.cache_key()).unwrap();
            prop_assert_eq!(parsed, filter);
        }

        #[test]
        fn prop_cache_key_equal_iff_filters_equal(a in filter_strategy(), b in filter_strategy()) {
            prop_assert_eq!(a.cache_key() == b.cache_key(), a == b);
        }
    }
}
