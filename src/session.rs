//! Session cookie state for the tax portal.
//!
//! The portal is an old stateful CGI frontend: every search parameter lives
//! in cookies, and the server reads them back on each request. We model the
//! jar as an explicit value owned by one run instead of hiding it inside the
//! HTTP client, so query builders and the pagination driver can mutate it
//! and tests can observe it.

use std::collections::BTreeMap;

/// The cookie defaults the portal expects on every request. Mostly empty
/// search fields plus the navigation-program names baked into the backend.
const DEFAULT_COOKIES: &[(&str, &str)] = &[
    ("DIST", ""),
    ("EOF", "1"),
    ("INDEXPGMF", "INDEXF.html"),
    ("INDEXPGMX", "INDEXX.html"),
    ("INDEXPGM", "INDEX.html"),
    ("LYEAR", "0"),
    ("MAP", ""),
    ("PARC", ""),
    ("PMTINDEXF", "INDEXFp.html"),
    ("PMTINDEXX", "INDEXXp.html"),
    ("PMTINDEX", "INDEXp.html"),
    ("PMTSEARCHF", "SEARCHFp.html"),
    ("PMTSEARCHX", "SEARCHXp.html"),
    ("PMTSEARCH", "SEARCHp.html"),
    ("PMTTICKETF", "TICKETFp.html"),
    ("PMTTICKETX", "TICKETXp.html"),
    ("PMTTICKET", "TICKETp.html"),
    ("PUB", "B"),
    ("RECS", "33"),
    ("RN", "34"),
    ("RPB", "B"),
    ("SEARCHPGMF", "SEARCHF.html"),
    ("SEARCHPGMX", "SEARCHX.html"),
    ("SEARCHPGM", "SEARCH.html"),
    ("SEARCH", "1"),
    ("SPAGE", "1"),
    ("SPAR", ""),
    ("TICKETPGMF", "TICKETF.html"),
    ("TICKETPGMX", "TICKETX.html"),
    ("TICKETPGM", "TICKET.html"),
    ("TPACCT", ""),
    ("TPNAME", ""),
    ("TPSX", ""),
    ("TPTICK", ""),
    ("TPTYR", ""),
];

/// Per-run cookie jar, scoped to one target domain at path `/`.
///
/// Keys are never validated: the portal has undocumented fields, and callers
/// may set any name they discover. Defaults are only ever overwritten, never
/// removed.
#[derive(Debug, Clone)]
pub struct SessionState {
    domain: String,
    cookies: BTreeMap<String, String>,
}

impl SessionState {
    /// Seed a new session with the portal's required default cookies.
    pub fn initialize(domain: &str) -> Self {
        let cookies = DEFAULT_COOKIES
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        tracing::info!(domain, "session initialized with required cookies");

        Self {
            domain: domain.to_string(),
            cookies,
        }
    }

    /// Set or overwrite a cookie. Any key is accepted.
    pub fn set(&mut self, key: &str, value: &str) {
        tracing::debug!(key, value, "setting session cookie");
        self.cookies.insert(key.to_string(), value.to_string());
    }

    /// Look up a cookie value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.cookies.get(key).map(String::as_str)
    }

    /// The domain this session is scoped to.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Number of cookies currently held.
    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    /// True when the jar is empty (never the case after `initialize`).
    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// Render the jar as a `Cookie` request-header value.
    pub fn cookie_header(&self) -> String {
        let mut out = String::new();
        for (k, v) in &self.cookies {
            if !out.is_empty() {
                out.push_str("; ");
            }
            out.push_str(k);
            out.push('=');
            out.push_str(v);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initialize_seeds_defaults() {
        let s = SessionState::initialize("example.com");
        assert_eq!(s.domain(), "example.com");
        assert_eq!(s.len(), DEFAULT_COOKIES.len());
        assert_eq!(s.get("SEARCHPGM"), Some("SEARCH.html"));
        assert_eq!(s.get("RECS"), Some("33"));
        assert_eq!(s.get("TPNAME"), Some(""));
    }

    #[test]
    fn set_overwrites_without_removing_defaults() {
        let mut s = SessionState::initialize("example.com");
        let before = s.len();
        s.set("TPNAME", "DOE JOHN");
        assert_eq!(s.len(), before);
        assert_eq!(s.get("TPNAME"), Some("DOE JOHN"));

        // Unknown keys are accepted for forward compatibility.
        s.set("UNDOCUMENTED", "x");
        assert_eq!(s.len(), before + 1);
        assert_eq!(s.get("UNDOCUMENTED"), Some("x"));
    }

    #[test]
    fn cookie_header_joins_pairs() {
        let mut s = SessionState::initialize("example.com");
        s.set("TPACCT", "12345");
        let header = s.cookie_header();
        assert!(header.contains("TPACCT=12345"));
        assert!(header.contains("SEARCH=1"));
        assert!(header.contains("; "));
        assert!(!header.ends_with(';'));
    }
}
