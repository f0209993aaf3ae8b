//! Input validation for update requests
//!
//! These checks run before any registrar is contacted.

use crate::error::{Error, Result};
use std::net::{IpAddr, Ipv4Addr};

/// Token in the subdomain list that stands for the domain apex
pub const APEX_TOKEN: &str = "@";

/// Maximum length of a domain name without its dots
const MAX_DOMAIN_LEN: usize = 255;

/// Maximum length of a single label (RFC 1035)
const MAX_LABEL_LEN: usize = 63;

/// Parse a dotted-quad IPv4 address
///
/// IPv6 literals (including IPv4-mapped ones such as `::ffff:10.0.0.1`) are
/// rejected.
pub fn validate_ipv4(ip: &str) -> Result<Ipv4Addr> {
    ip.parse::<Ipv4Addr>().map_err(|_| Error::InvalidIp)
}

/// Check that a string is a syntactically valid DNS name
///
/// Labels may contain ASCII letters, digits, `-` and `_`, must not start
/// with `-` and are at most 63 characters long. A single trailing dot is
/// accepted. IP literals are not DNS names.
pub fn validate_domain(domain: &str) -> Result<()> {
    if domain.is_empty() || domain.replace('.', "").len() > MAX_DOMAIN_LEN {
        return Err(Error::InvalidDomain);
    }

    if domain.parse::<IpAddr>().is_ok() {
        return Err(Error::InvalidDomain);
    }

    let name = domain.strip_suffix('.').unwrap_or(domain);

    if !name.split('.').all(is_valid_label) {
        return Err(Error::InvalidDomain);
    }

    Ok(())
}

/// Check a subdomain entry: the [`APEX_TOKEN`] or dot-separated labels
///
/// Labels follow the same rules as in [`validate_domain`]. Entries end up in
/// registrar URL paths, so `/`, `?`, `..` and the like are rejected here.
pub fn validate_subdomain(subdomain: &str) -> Result<()> {
    if subdomain == APEX_TOKEN || subdomain.split('.').all(is_valid_label) {
        Ok(())
    } else {
        Err(Error::InvalidSubdomain)
    }
}

/// ASCII letters, digits, `-` and `_`; 1 to 63 characters; no leading `-`
fn is_valid_label(label: &str) -> bool {
    !label.is_empty()
        && label.len() <= MAX_LABEL_LEN
        && !label.starts_with('-')
        && label
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Split a comma-separated subdomain list, preserving order
///
/// `split_subdomains("")` yields `[""]`.
pub fn split_subdomains(csv: &str) -> Vec<&str> {
    csv.split(',').collect()
}

/// Split and check a subdomain list
///
/// Every entry must be non-empty; a wholly empty parameter and lists such
/// as `",,,"` are both rejected with `MissingSubdomains`. Each entry must
/// then pass [`validate_subdomain`]. The [`APEX_TOKEN`] entry is translated
/// to the empty subdomain that registrars treat as the apex.
pub fn parse_subdomains(csv: &str) -> Result<Vec<String>> {
    let subdomains = split_subdomains(csv);

    if subdomains.iter().any(|s| s.is_empty()) {
        return Err(Error::MissingSubdomains);
    }

    for subdomain in &subdomains {
        validate_subdomain(subdomain)?;
    }

    Ok(subdomains
        .into_iter()
        .map(|s| if s == APEX_TOKEN { String::new() } else { s.to_string() })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_ipv4() {
        for ip in ["10.0.0.1", "0.0.0.0", "255.255.255.255", "203.0.113.7"] {
            assert!(validate_ipv4(ip).is_ok(), "{} should be accepted", ip);
        }
        assert_eq!(validate_ipv4("10.0.0.1").unwrap(), Ipv4Addr::new(10, 0, 0, 1));
    }

    #[test]
    fn test_invalid_ipv4() {
        for ip in [
            "",
            "::1",
            "::ffff:10.0.0.1",
            "2001:db8::1",
            "10.0,0.1",
            "256.0.0.1",
            "10.0.0",
            "10.0.0.1.2",
            " 10.0.0.1",
            "example.com",
        ] {
            let err = validate_ipv4(ip).unwrap_err();
            assert!(matches!(err, Error::InvalidIp), "{} should be rejected", ip);
        }
    }

    #[test]
    fn test_valid_domains() {
        for domain in [
            "foo.com",
            "example.co.uk",
            "localhost",
            "xn--bcher-kva.example",
            "_dmarc.example.com",
            "a-b.example.com",
            "foo.com.",
            "123.example",
        ] {
            assert!(validate_domain(domain).is_ok(), "{} should be accepted", domain);
        }
    }

    #[test]
    fn test_invalid_domains() {
        let long_label = format!("{}.com", "a".repeat(64));
        for domain in [
            "",
            "foo bar.com",
            "foo..com",
            ".foo.com",
            "-foo.com",
            "foo.com..",
            "foo/bar.com",
            "10.0.0.1",
            "::1",
            long_label.as_str(),
        ] {
            let err = validate_domain(domain).unwrap_err();
            assert!(matches!(err, Error::InvalidDomain), "{:?} should be rejected", domain);
        }
    }

    #[test]
    fn test_overlong_domain() {
        let domain = vec!["a".repeat(60); 5].join(".");
        assert!(validate_domain(&domain).is_err());
    }

    #[test]
    fn test_valid_subdomains() {
        for subdomain in ["bar", "home.lab", "_acme-challenge", "www1", "@", "Bar"] {
            assert!(
                validate_subdomain(subdomain).is_ok(),
                "{} should be accepted",
                subdomain
            );
        }
    }

    #[test]
    fn test_subdomains_that_would_alter_urls() {
        for subdomain in [
            "bar?x=",
            "../../other.org/records/www",
            "foo/bar",
            "..",
            "foo..bar",
            "foo bar",
            ".bar",
            "bar.",
            "-bar",
            "bar#frag",
            "@@",
            "b%2Fr",
        ] {
            assert!(
                matches!(validate_subdomain(subdomain), Err(Error::InvalidSubdomain)),
                "{:?} should be rejected",
                subdomain
            );
        }
    }

    #[test]
    fn test_split_subdomains() {
        assert_eq!(split_subdomains("a,b,c"), vec!["a", "b", "c"]);
        assert_eq!(split_subdomains("bar"), vec!["bar"]);
        assert_eq!(split_subdomains(""), vec![""]);
    }

    #[test]
    fn test_parse_subdomains() {
        assert_eq!(parse_subdomains("foo,bar,baz").unwrap(), vec!["foo", "bar", "baz"]);
        assert_eq!(parse_subdomains("@,www").unwrap(), vec!["", "www"]);

        assert!(matches!(
            parse_subdomains("www,bar?x="),
            Err(Error::InvalidSubdomain)
        ));

        for csv in ["", ",,,", "foo,", ",foo", "foo,,bar"] {
            assert!(
                matches!(parse_subdomains(csv), Err(Error::MissingSubdomains)),
                "{:?} should be rejected",
                csv
            );
        }
    }
}
