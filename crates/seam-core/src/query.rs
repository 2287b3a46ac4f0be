//! Query-string builder for the handful of Seam endpoints read over `GET`.

use std::fmt::Display;

/// Ordered list of query pairs, skipping absent values.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(&'static str, String)>,
}

impl QueryParams {
    /// Create a new, empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Append a required key/value pair.
    #[must_use]
    pub fn with<T>(mut self, key: &'static str, value: T) -> Self
    where
        T: Display,
    {
        self.pairs.push((key, value.to_string()));
        self
    }

    /// Append a key/value pair when the value is present.
    #[must_use]
    pub fn with_opt<T>(mut self, key: &'static str, value: Option<T>) -> Self
    where
        T: Display,
    {
        if let Some(value) = value {
            self.pairs.push((key, value.to_string()));
        }
        self
    }

    /// Append one pair per value, so `ids=a&ids=b`. An empty list adds nothing.
    #[must_use]
    pub fn with_list<I, T>(mut self, key: &'static str, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Display,
    {
        self.pairs.extend(values.into_iter().map(|value| (key, value.to_string())));
        self
    }

    /// Borrow the collected pairs.
    #[must_use]
    pub fn as_pairs(&self) -> &[(&'static str, String)] {
        &self.pairs
    }

    /// Returns true if no parameters have been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::QueryParams;

    #[test]
    fn with_opt_skips_none() {
        let params = QueryParams::new().with_opt("name", Option::<String>::None);
        assert!(params.is_empty());
    }

    #[test]
    fn with_list_repeats_key_and_skips_empty() {
        let params = QueryParams::new()
            .with("device_type", "ecobee_thermostat")
            .with_list("device_ids", ["dev_1", "dev_2"])
            .with_list("device_types", Vec::<String>::new());
        assert_eq!(
            params.as_pairs(),
            &[
                ("device_type", "ecobee_thermostat".to_string()),
                ("device_ids", "dev_1".to_string()),
                ("device_ids", "dev_2".to_string()),
            ]
        );
    }
}
