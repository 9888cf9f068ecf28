use serde::{Deserialize, Serialize};
use url::Url;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TargetError {
    #[error("target domain or url required")]
    Missing,
    #[error("Invalid URL provided")]
    InvalidUrl,
}

/// The subject of one scan: a canonical domain and the base URL that is
/// fetched for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub domain: String,
    pub url: String,
}

impl Target {
    /// Builds a target from the optional `target` (bare domain) and `url`
    /// inputs of a scan request. An explicit URL wins; its host becomes the
    /// domain.
    pub fn from_parts(target: Option<&str>, url: Option<&str>) -> Result<Self, TargetError> {
        let target = target.map(str::trim).filter(|s| !s.is_empty());
        let url = url.map(str::trim).filter(|s| !s.is_empty());

        match (target, url) {
            (_, Some(raw)) => {
                let parsed = Url::parse(raw).map_err(|_| TargetError::InvalidUrl)?;
                let host = parsed
                    .host_str()
                    .filter(|h| !h.is_empty())
                    .ok_or(TargetError::InvalidUrl)?;
                Ok(Self {
                    domain: host.to_lowercase(),
                    url: raw.to_string(),
                })
            }
            (Some(domain), None) => Self::from_domain(domain),
            (None, None) => Err(TargetError::Missing),
        }
    }

    pub fn from_domain(domain: &str) -> Result<Self, TargetError> {
        let domain = domain.trim().trim_end_matches('/').to_lowercase();
        if domain.is_empty() {
            return Err(TargetError::Missing);
        }
        // A bare target is a host name only: schemes, paths, ports and
        // userinfo belong in the `url` input.
        if domain.contains(['/', '\\', ':', '@', '?', '#']) {
            return Err(TargetError::InvalidUrl);
        }
        let parsed =
            Url::parse(&format!("https://{}/", domain)).map_err(|_| TargetError::InvalidUrl)?;
        let host = parsed
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or(TargetError::InvalidUrl)?;
        Ok(Self {
            domain: host.to_string(),
            url: format!("https://{}/", host),
        })
    }

    /// `/robots.txt` on the origin of the base URL.
    pub fn robots_url(&self) -> String {
        match Url::parse(&self.url) {
            Ok(base) => {
                let origin = base.origin().ascii_serialization();
                format!("{}/robots.txt", origin)
            }
            Err(_) => format!("https://{}/robots.txt", self.domain),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_domain_gets_https_scheme() {
        let t = Target::from_parts(Some("Example.com"), None).unwrap();
        assert_eq!(t.domain, "example.com");
        assert_eq!(t.url, "https://example.com/");
    }

    #[test]
    fn url_takes_precedence_and_supplies_domain() {
        let t = Target::from_parts(Some("ignored.org"), Some("http://www.example.com/path")).unwrap();
        assert_eq!(t.domain, "www.example.com");
        assert_eq!(t.url, "http://www.example.com/path");
    }

    #[test]
    fn missing_inputs_are_rejected() {
        assert_eq!(Target::from_parts(None, None), Err(TargetError::Missing));
        assert_eq!(Target::from_parts(Some("  "), Some("")), Err(TargetError::Missing));
    }

    #[test]
    fn malformed_url_is_rejected() {
        assert_eq!(
            Target::from_parts(None, Some("not a url")),
            Err(TargetError::InvalidUrl)
        );
    }

    #[test]
    fn bare_target_must_be_a_host_name() {
        for input in [
            "https://example.com",
            "example.com/admin",
            "example.com:8443",
            "user@example.com",
            "example.com?x=1",
            "exa mple.com",
        ] {
            assert_eq!(
                Target::from_parts(Some(input), None),
                Err(TargetError::InvalidUrl),
                "{}",
                input
            );
        }
    }

    #[test]
    fn bare_target_trailing_slash_and_idn() {
        let t = Target::from_domain("example.com/").unwrap();
        assert_eq!(t.domain, "example.com");

        let t = Target::from_domain("bücher.de").unwrap();
        assert_eq!(t.domain, "xn--bcher-kva.de");
        assert_eq!(t.url, "https://xn--bcher-kva.de/");
    }

    #[test]
    fn robots_url_uses_origin_of_base_url() {
        let t = Target::from_parts(None, Some("http://127.0.0.1:8080/deep/page?x=1")).unwrap();
        assert_eq!(t.robots_url(), "http://127.0.0.1:8080/robots.txt");

        let t = Target::from_domain("example.com").unwrap();
        assert_eq!(t.robots_url(), "https://example.com/robots.txt");
    }
}
