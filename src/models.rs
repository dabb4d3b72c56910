/// Synthetic attribute holding the `##` comment that preceded a `Host` line.
pub const COMMENT_KEY: &str = "Comment";

/// Directives of one host block, in the order they first appeared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostAttributes {
    // (key, value, write sequence)
    entries: Vec<(String, String, usize)>,
    writes: usize,
}

impl HostAttributes {
    /// Last write wins; the key keeps the position of its first occurrence.
    pub fn set(&mut self, key: &str, value: &str) {
        self.writes += 1;
        match self.entries.iter_mut().find(|(k, _, _)| k == key) {
            Some((_, v, seq)) => {
                *v = value.to_string();
                *seq = self.writes;
            }
            None => self
                .entries
                .push((key.to_string(), value.to_string(), self.writes)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _, _)| k == key)
            .map(|(_, v, _)| v.as_str())
    }

    /// Lookup the way ssh itself reads keywords. Keys are stored as written,
    /// so `HostName` and `hostname` can both be present; the most recently
    /// written one wins here.
    pub fn get_ignore_case(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .filter(|(k, _, _)| k.eq_ignore_ascii_case(key))
            .max_by_key(|(_, _, seq)| *seq)
            .map(|(_, v, _)| v.as_str())
    }

    pub fn comment(&self) -> Option<&str> {
        self.get(COMMENT_KEY)
    }

    /// Real directives, without the synthetic comment.
    pub fn directives(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .filter(|(k, _, _)| k != COMMENT_KEY)
            .map(|(k, v, _)| (k.as_str(), v.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostEntry {
    pub alias: String,
    pub attributes: HostAttributes,
}

impl HostEntry {
    pub fn new(alias: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            attributes: HostAttributes::default(),
        }
    }

    pub fn has_identity_file(&self) -> bool {
        self.attributes.get_ignore_case("IdentityFile").is_some()
    }
}

/// Hosts in file order. Duplicate aliases are separate entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedConfig {
    pub hosts: Vec<HostEntry>,
}

impl ParsedConfig {
    pub fn aliases(&self) -> Vec<&str> {
        self.hosts.iter().map(|h| h.alias.as_str()).collect()
    }

    /// First entry declared with `alias`.
    pub fn find(&self, alias: &str) -> Option<&HostEntry> {
        self.hosts.iter().find(|h| h.alias == alias)
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }
}
