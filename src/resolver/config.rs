//! Resolver configuration.

/// Header inspected when nothing else is configured.
pub const DEFAULT_HEADER_NAME: &str = "X-Forwarded-For";

/// Separator used to split multi-valued forwarding headers by default.
pub const DEFAULT_SEPARATORS: &[char] = &[','];

/// Settings for [`ClientIpResolver`](crate::resolver::ClientIpResolver).
///
/// A plain value: mutate it before building the resolver. A running server
/// never mutates a live config, it swaps in a freshly built resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    header_names: Vec<String>,
    separators: Vec<char>,
    use_first_ip: bool,
}

impl ResolverConfig {
    /// Create a config with the defaults (`X-Forwarded-For`, `,`, first IP).
    pub fn new() -> Self {
        Self {
            header_names: vec![DEFAULT_HEADER_NAME.to_string()],
            separators: DEFAULT_SEPARATORS.to_vec(),
            use_first_ip: true,
        }
    }

    /// Headers checked for a client address, in order.
    pub fn header_names(&self) -> &[String] {
        &self.header_names
    }

    /// Mutable access to the header list, e.g. to push an extra header.
    pub fn header_names_mut(&mut self) -> &mut Vec<String> {
        &mut self.header_names
    }

    /// Replace the header list.
    pub fn set_header_names<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.header_names = names.into_iter().map(Into::into).collect();
    }

    /// Builder-style variant of [`set_header_names`](Self::set_header_names).
    pub fn with_header_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_header_names(names);
        self
    }

    /// Separator characters as a string, one char per separator.
    pub fn header_value_separators(&self) -> String {
        self.separators.iter().collect()
    }

    pub(crate) fn separators(&self) -> &[char] {
        &self.separators
    }

    /// Set the separator characters. Every char of `value` is a separator.
    ///
    /// An empty value is ignored and the previous set is kept. Returns
    /// whether the new value was applied.
    pub fn set_header_value_separators(&mut self, value: &str) -> bool {
        if value.is_empty() {
            return false;
        }
        self.separators = value.chars().collect();
        true
    }

    /// Builder-style variant of [`set_header_value_separators`](Self::set_header_value_separators).
    pub fn with_header_value_separators(mut self, value: &str) -> Self {
        self.set_header_value_separators(value);
        self
    }

    /// Whether the first (true) or last (false) address of a header is used.
    pub fn use_first_ip(&self) -> bool {
        self.use_first_ip
    }

    pub fn set_use_first_ip(&mut self, use_first_ip: bool) {
        self.use_first_ip = use_first_ip;
    }

    pub fn with_use_first_ip(mut self, use_first_ip: bool) -> Self {
        self.use_first_ip = use_first_ip;
        self
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ResolverConfig::default();
        assert_eq!(config.header_names(), ["X-Forwarded-For".to_string()]);
        assert_eq!(config.header_value_separators(), ",");
        assert!(config.use_first_ip());
    }

    #[test]
    fn test_empty_separators_are_ignored() {
        let mut config = ResolverConfig::default();
        assert!(config.set_header_value_separators(",;"));
        assert_eq!(config.header_value_separators(), ",;");

        assert!(!config.set_header_value_separators(""));
        assert_eq!(config.header_value_separators(), ",;");
        assert_eq!(config.separators(), [',', ';']);
    }

    #[test]
    fn test_header_names_can_be_extended() {
        let mut config = ResolverConfig::default();
        config.header_names_mut().push("X-Real-IP".into());
        assert_eq!(config.header_names().len(), 2);
        assert_eq!(config.header_names()[1], "X-Real-IP");

        let config = config.with_header_names(["CF-Connecting-IP"]);
        assert_eq!(config.header_names(), ["CF-Connecting-IP".to_string()]);
    }
}
