//! The event boundary between the XML tokenizer and the parser core.
//!
//! This is a SAX-style push model: the tokenizer adapter calls
//! [`ElementHandler`] methods strictly sequentially, one element event at
//! a time. The core performs no XML-syntax validation of its own -
//! well-formedness is guaranteed upstream.

/// Ordered attribute list for one element start event.
///
/// Lookup is linear and returns the first match, mirroring the
/// first-wins semantics of a raw SAX attribute array.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    pairs: Vec<(String, String)>,
}

impl Attributes {
    pub fn new() -> Self {
        Attributes { pairs: Vec::new() }
    }

    pub fn push(&mut self, name: String, value: String) {
        self.pairs.push((name, value));
    }

    /// First value for `name`, or None when absent.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl<const N: usize> From<[(&str, &str); N]> for Attributes {
    fn from(pairs: [(&str, &str); N]) -> Self {
        Attributes {
            pairs: pairs
                .iter()
                .map(|(n, v)| (n.to_string(), v.to_string()))
                .collect(),
        }
    }
}

/// Receiver for element events pushed by the tokenizer adapter.
///
/// `on_element_end` receives the fully concatenated character content of
/// the closing element, independent of how many raw text fragments the
/// tokenizer delivered (see [`crate::text::TextAccumulator`]).
pub trait ElementHandler {
    fn on_element_start(&mut self, name: &str, attrs: &Attributes);

    fn on_element_end(&mut self, name: &str, text: &str);
}

/// Parse a non-negative base-10 integer attribute or text value.
///
/// Returns None on empty input, a stray sign, non-digit characters, or
/// overflow. Surrounding whitespace is tolerated. Callers decide whether
/// None means "default to 0" (optional fields) or "skip the element"
/// (required fields); malformed numerics are never fatal.
pub fn parse_unsigned<T>(text: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.starts_with(['+', '-']) {
        return None;
    }
    trimmed.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_lookup_first_match() {
        let attrs = Attributes::from([("type", "sha1"), ("type", "md5")]);
        assert_eq!(attrs.get("type"), Some("sha1"));
        assert_eq!(attrs.get("length"), None);
    }

    #[test]
    fn test_parse_unsigned_accepts_plain_decimal() {
        assert_eq!(parse_unsigned::<u64>("262144"), Some(262144));
        assert_eq!(parse_unsigned::<u64>(" 42 "), Some(42));
        assert_eq!(parse_unsigned::<u64>("4294967296"), Some(4294967296));
        assert_eq!(parse_unsigned::<u32>("0"), Some(0));
    }

    #[test]
    fn test_parse_unsigned_rejects_garbage() {
        assert_eq!(parse_unsigned::<u64>(""), None);
        assert_eq!(parse_unsigned::<u64>("abc"), None);
        assert_eq!(parse_unsigned::<u64>("12abc"), None);
        assert_eq!(parse_unsigned::<u64>("-1"), None);
        assert_eq!(parse_unsigned::<u64>("+1"), None);
        assert_eq!(parse_unsigned::<u64>("1.5"), None);
        // u32 overflow
        assert_eq!(parse_unsigned::<u32>("4294967296"), None);
        // u64 overflow
        assert_eq!(parse_unsigned::<u64>("99999999999999999999999999"), None);
    }
}
