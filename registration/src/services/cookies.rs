use std::collections::{BTreeMap, HashMap};

/// Read access to the cookies of the current page.
pub trait CookieStore {
    fn get(&self, name: &str) -> Option<String>;
}

impl CookieStore for HashMap<String, String> {
    fn get(&self, name: &str) -> Option<String> {
        HashMap::get(self, name).cloned()
    }
}

impl CookieStore for BTreeMap<String, String> {
    fn get(&self, name: &str) -> Option<String> {
        BTreeMap::get(self, name).cloned()
    }
}

/// Cookies parsed from a `Cookie` request header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieJar(BTreeMap<String, String>);

impl CookieJar {
    /// Parse a header value such as `theme=dark; token=aaa.bbb.ccc`. Pairs without a `=` are
    /// skipped, the first occurrence of a name wins.
    pub fn parse(header: &str) -> Self {
        let mut cookies = BTreeMap::new();
        for pair in header.split(';') {
            let Some((name, value)) = pair.split_once('=') else {
                continue;
            };
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(value);
            cookies
                .entry(name.to_string())
                .or_insert_with(|| value.to_string());
        }
        Self(cookies)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl CookieStore for CookieJar {
    fn get(&self, name: &str) -> Option<String> {
        self.0.get(name).cloned()
    }
}
