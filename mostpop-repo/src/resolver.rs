//! Mapping from feed filters to transport requests.

use mostpop_core::constants::{MOST_POPULAR_BASE_PATH, RESPONSE_EXTENSION};
use mostpop_core::types::{EndpointKind, FilterSpec, RequestDescriptor};

/// Builds request paths of the form
/// `<base>/<endpoint>/<period>[/<share>].<ext>`.
///
/// The share segment only appears for shared feeds that name a share kind.
/// The section never reaches the path and no query is added; credentials are
/// the transport's business.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EndpointResolver {
    base_path: String,
    extension: String,
}

impl Default for EndpointResolver {
    fn default() -> Self {
        Self::new(MOST_POPULAR_BASE_PATH, RESPONSE_EXTENSION)
    }
}

impl EndpointResolver {
    /// Creates a resolver with a custom base path and extension.
    pub fn new(base_path: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into().trim_end_matches('/').to_string(),
            extension: extension.into(),
        }
    }

    /// Resolves a filter to its request descriptor.
    pub fn resolve(&self, filter: &FilterSpec) -> RequestDescriptor {
        let mut path = format!(
            "{}/{}/{}",
            self.base_path,
            filter.endpoint.as_str(),
            filter.period.days()
        );

        if filter.endpoint == EndpointKind::Shared {
            if let Some(share) = filter.share {
                path.push('/');
                path.push_str(share.as_str());
            }
        }

        path.push('.');
        path.push_str(&self.extension);

        RequestDescriptor::new(path)
    }
}

/// Resolves a filter against the Most Popular v2 API.
pub fn resolve(filter: &FilterSpec) -> RequestDescriptor {
    EndpointResolver::default().resolve(filter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mostpop_core::types::{Period, ShareKind};
    use test_case::test_case;

    #[test_case(EndpointKind::Viewed, Period::Day, None, "/svc/mostpopular/v2/viewed/1.json")]
    #[test_case(EndpointKind::Viewed, Period::Week, None, "/svc/mostpopular/v2/viewed/7.json")]
    #[test_case(EndpointKind::Emailed, Period::Month, None, "/svc/mostpopular/v2/emailed/30.json")]
    #[test_case(EndpointKind::Shared, Period::Day, Some(ShareKind::Facebook), "/svc/mostpopular/v2/shared/1/facebook.json")]
    #[test_case(EndpointKind::Shared, Period::Week, Some(ShareKind::Facebook), "/svc/mostpopular/v2/shared/7/facebook.json")]
    #[test_case(EndpointKind::Shared, Period::Month, Some(ShareKind::Twitter), "/svc/mostpopular/v2/shared/30/twitter.json")]
    #[test_case(EndpointKind::Shared, Period::Month, None, "/svc/mostpopular/v2/shared/30.json")]
    #[test_case(EndpointKind::Viewed, Period::Day, Some(ShareKind::Twitter), "/svc/mostpopular/v2/viewed/1.json")]
    fn test_resolve_path(endpoint: EndpointKind, period: Period, share: Option<ShareKind>, expected: &str) {
        let filter = FilterSpec {
            share,
            ..FilterSpec::new(endpoint, period)
        };
        assert_eq!(resolve(&filter).path, expected);
    }

    #[test]
    fn test_section_does_not_change_path() {
        let all = FilterSpec::new(EndpointKind::Viewed, Period::Day);
        let sports = all.clone().with_section("sports");
        assert_eq!(resolve(&all), resolve(&sports));
    }

    #[test]
    fn test_no_query_parameters() {
        for endpoint in EndpointKind::ALL {
            let filter = FilterSpec::new(endpoint, Period::Week).with_share(ShareKind::Twitter);
            assert!(resolve(&filter).query.is_empty());
        }
    }

    #[test]
    fn test_custom_base_path() {
        let resolver = EndpointResolver::new("/mirror/v9/", "xml");
        let filter = FilterSpec::new(EndpointKind::Emailed, Period::Day);
        assert_eq!(resolver.resolve(&filter).path, "/mirror/v9/emailed/1.xml");
    }
}
