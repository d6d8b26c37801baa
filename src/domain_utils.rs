/// Minimal URL authority utilities
pub struct DomainUtils;

impl DomainUtils {
    /// Extract the authority of a URL, lowercased but otherwise untouched.
    ///
    /// Takes the third `/`-separated segment (`scheme:` `""` `authority`) and
    /// falls back to the whole input. Userinfo, ports and percent-escapes stay
    /// in place so lookalike authorities are scored as written.
    pub fn extract_domain(url: &str) -> String {
        match url.split('/').nth(2) {
            Some(segment) if !segment.is_empty() => segment.to_lowercase(),
            _ => url.to_lowercase(),
        }
    }

    /// First entry of `list` occurring anywhere inside `domain`
    pub fn find_contained<'a>(domain: &str, list: &'a [String]) -> Option<&'a str> {
        let domain_lower = domain.to_lowercase();
        list.iter()
            .map(String::as_str)
            .find(|entry| !entry.is_empty() && domain_lower.contains(&entry.to_lowercase()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_domain() {
        assert_eq!(
            DomainUtils::extract_domain("https://Guaranteed-Returns.in/invest"),
            "guaranteed-returns.in"
        );
        assert_eq!(
            DomainUtils::extract_domain("http://scam-broker.com:8080/x"),
            "scam-broker.com:8080"
        );
    }

    #[test]
    fn test_extract_domain_keeps_raw_authority() {
        assert_eq!(DomainUtils::extract_domain("https://evil@nse.in/x"), "evil@nse.in");
        assert_eq!(
            DomainUtils::extract_domain("https://scam-broker.com@example.org/"),
            "scam-broker.com@example.org"
        );
        assert_eq!(
            DomainUtils::extract_domain("https://sc%61m-broker.com/"),
            "sc%61m-broker.com"
        );
        assert_eq!(DomainUtils::extract_domain("https://ℕse.in/"), "ℕse.in");
    }

    #[test]
    fn test_extract_domain_degrades_gracefully() {
        assert_eq!(DomainUtils::extract_domain("not a url"), "not a url");
        assert_eq!(DomainUtils::extract_domain(""), "");
        assert_eq!(DomainUtils::extract_domain("a/b"), "a/b");
        assert_eq!(DomainUtils::extract_domain("//hot-stock.biz/x"), "hot-stock.biz");
    }

    #[test]
    fn test_find_contained() {
        let list = vec!["scam-broker.com".to_string(), "fake-sebi.in".to_string()];

        assert_eq!(
            DomainUtils::find_contained("login.fake-sebi.in", &list),
            Some("fake-sebi.in")
        );
        assert_eq!(DomainUtils::find_contained("sebi.gov.in", &list), None);
    }
}
