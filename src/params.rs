//! Plain key-value request parameters. Bad values are dropped, never
//! reported back as errors.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::models::GameResult;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    values: HashMap<String, String>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts `key=value` items; items without `=` are skipped.
    pub fn from_pairs<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut values = HashMap::new();
        for item in items {
            let Some((key, value)) = item.as_ref().split_once('=') else {
                continue;
            };
            let key = key.trim();
            if key.is_empty() {
                continue;
            }
            values.insert(key.to_string(), value.trim().to_string());
        }
        Self { values }
    }

    /// Parses a `a=1&b=2` query string, decoding `+` and `%XX` escapes.
    pub fn from_query(query: &str) -> Self {
        Self::from_pairs(
            query
                .trim_start_matches('?')
                .split('&')
                .map(decode_component),
        )
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.values
            .insert(key.trim().to_string(), value.trim().to_string());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn date(&self, key: &str) -> Option<NaiveDate> {
        let raw = self.get(key)?;
        match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(_) => {
                log::warn!("ignoring unparseable date {key}={raw}");
                None
            }
        }
    }

    pub fn result(&self, key: &str) -> Option<GameResult> {
        let raw = self.get(key)?;
        let parsed = GameResult::from_code(raw);
        if parsed.is_none() {
            log::warn!("ignoring unknown result filter {key}={raw}");
        }
        parsed
    }

    pub fn flag(&self, key: &str) -> bool {
        self.get(key)
            .is_some_and(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
    }
}

// Form encoding. Malformed escapes are kept as written.
fn decode_component(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => out.push(b' '),
            b'%' => match bytes.get(i + 1..i + 3).and_then(|p| hex_pair(p[0], p[1])) {
                Some(byte) => {
                    out.push(byte);
                    i += 2;
                }
                None => out.push(b'%'),
            },
            other => out.push(other),
        }
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_pair(hi: u8, lo: u8) -> Option<u8> {
    let hi = (hi as char).to_digit(16)?;
    let lo = (lo as char).to_digit(16)?;
    Some((hi * 16 + lo) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_query_string() {
        let p = Params::from_query("?result=W&from=2025-09-01&to=nope&q=");
        assert_eq!(p.result("result"), Some(GameResult::Win));
        assert_eq!(p.date("from"), NaiveDate::from_ymd_opt(2025, 9, 1));
        assert_eq!(p.date("to"), None);
        assert_eq!(p.get("q"), None);
    }

    #[test]
    fn invalid_values_are_ignored() {
        let p = Params::from_pairs(["result=X", "garbage", "=x", "all=yes"]);
        assert_eq!(p.result("result"), None);
        assert!(p.flag("all"));
        assert!(!p.flag("played"));
    }

    #[test]
    fn query_values_are_form_decoded() {
        let p = Params::from_query("q=De%20Luca&sort=goals&x=a+b&bad=%zz&tail=%4");
        assert_eq!(p.get("q"), Some("De Luca"));
        assert_eq!(p.get("x"), Some("a b"));
        assert_eq!(p.get("bad"), Some("%zz"));
        assert_eq!(p.get("tail"), Some("%4"));
        assert_eq!(Params::from_query("q=Nicol%C3%B2").get("q"), Some("Nicolò"));
    }

    #[test]
    fn blank_values_set_directly_are_ignored() {
        let p = Params::new().with("q", "  ").with("sort", " goals ");
        assert_eq!(p.get("q"), None);
        assert_eq!(p.get("sort"), Some("goals"));
    }
}
