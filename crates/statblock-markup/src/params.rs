//! Pipe-delimited tag parameter parsing.

/// Ordered key/value parameters parsed from a tag body.
///
/// Segments are separated by `|`; each segment splits on its first `:`. A
/// segment without `:` is a bare flag stored with an empty value. Duplicate
/// keys keep their first position and take the last value. There is no
/// escaping: `|` and `:` cannot appear inside a value.
///
/// # Examples
/// ```
/// use statblock_markup::parse_parameters;
///
/// let params = parse_parameters("fortitude|dc:20|against:spell");
/// assert!(params.contains("fortitude"));
/// assert_eq!(params.get("fortitude"), Some(""));
/// assert_eq!(params.get("dc"), Some("20"));
/// assert_eq!(params.len(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterSet<'a> {
    entries: Vec<(&'a str, &'a str)>,
}

impl<'a> ParameterSet<'a> {
    /// Parse a tag body into parameters.
    #[must_use]
    pub fn parse(body: &'a str) -> Self {
        let mut params = Self::default();
        for segment in body.split('|') {
            let (key, value) = segment.split_once(':').unwrap_or((segment, ""));
            params.insert(key, value);
        }
        params
    }

    fn insert(&mut self, key: &'a str, value: &'a str) {
        if let Some(entry) = self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            entry.1 = value;
            return;
        }
        self.entries.push((key, value));
    }

    /// Value stored for `key`; flags yield `Some("")`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&'a str> {
        self.entries
            .iter()
            .find_map(|&(existing, value)| (existing == key).then_some(value))
    }

    /// Whether `key` is present, as a flag or with a value.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|&(existing, _)| existing == key)
    }

    /// Parameters in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a str)> + '_ {
        self.entries.iter().copied()
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no parameters were parsed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parse a tag body into a [`ParameterSet`].
#[must_use]
pub fn parse_parameters(body: &str) -> ParameterSet<'_> {
    ParameterSet::parse(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_value_on_first_colon_only() {
        let params = parse_parameters("dc:resolve:10");
        assert_eq!(params.get("dc"), Some("resolve:10"));
    }

    #[test]
    fn last_duplicate_wins_in_first_position() {
        let params = parse_parameters("dc:3|flat|dc:5");
        assert_eq!(params.get("dc"), Some("5"));
        assert_eq!(params.iter().collect::<Vec<_>>(), vec![("dc", "5"), ("flat", "")]);
    }

    #[test]
    fn missing_key_is_none() {
        let params = parse_parameters("burst|distance:20");
        assert_eq!(params.get("cone"), None);
        assert!(!params.contains("cone"));
    }

    #[test]
    fn empty_body_yields_single_empty_flag() {
        let params = parse_parameters("");
        assert_eq!(params.len(), 1);
        assert!(params.contains(""));
        assert!(!params.is_empty());
    }
}
