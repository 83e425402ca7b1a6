//! Inverted whitelist rule
//!
//! Outside the default whitelist mode the whitelist lists the only domains
//! where filtering applies, so everything else gets a document-level
//! exception: `@@||*$document,domain=~a.com|~b.com`.

/// Exception rule disabling filtering on every domain except `domains`
pub fn inverted_whitelist_rule<S: AsRef<str>>(domains: &[S]) -> String {
    let mut rule = String::from("@@||*$document");
    if domains.is_empty() {
        return rule;
    }

    rule.push_str(",domain=");
    for (i, domain) in domains.iter().enumerate() {
        if i > 0 {
            rule.push('|');
        }
        rule.push('~');
        rule.push_str(domain.as_ref());
    }
    rule
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_without_domains() {
        assert_eq!(inverted_whitelist_rule::<&str>(&[]), "@@||*$document");
    }

    #[test]
    fn test_with_domains() {
        assert_eq!(
            inverted_whitelist_rule(&["example.org", "news.example.com"]),
            "@@||*$document,domain=~example.org|~news.example.com"
        );
    }
}
