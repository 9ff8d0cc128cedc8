use bytes::{BufMut, Bytes, BytesMut};
use core::fmt;
use itertools::Itertools;

/// Errors from parsing the canonical form of a tag set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TagsError {
    /// A `key=value` pair had no `=`.
    #[error("tag pair {0:?} is missing '='")]
    MissingSeparator(String),

    /// A pair had an empty key.
    #[error("tag pair {0:?} has an empty key")]
    EmptyKey(String),

    /// The same key appeared twice.
    #[error("duplicate tag key {0:?}")]
    DuplicateKey(String),
}

/// A single `key=value` tag.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Tag {
    /// Tag key.
    pub key: String,
    /// Tag value.
    pub value: String,
}

impl Tag {
    /// Create a new tag.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self { key: key.into(), value: value.into() }
    }

    /// The `key=value` form used in the canonical tag set. Commas, equals
    /// signs, spaces and backslashes in the key or value are escaped with a
    /// backslash.
    pub fn escaped(&self) -> String {
        let mut out = String::with_capacity(self.key.len() + self.value.len() + 1);
        escape_into(&mut out, &self.key);
        out.push('=');
        escape_into(&mut out, &self.value);
        out
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// Characters that are structural in the canonical form.
const fn needs_escape(c: char) -> bool {
    matches!(c, ',' | '=' | ' ' | '\\')
}

fn escape_into(out: &mut String, s: &str) {
    for c in s.chars() {
        if needs_escape(c) {
            out.push('\\');
        }
        out.push(c);
    }
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
                continue;
            }
        }
        out.push(c);
    }
    out
}

/// Byte offsets of `sep` in `s` that are not preceded by an escaping
/// backslash.
fn unescaped(s: &str, sep: char) -> impl Iterator<Item = usize> + '_ {
    let mut escaped = false;
    s.char_indices().filter_map(move |(idx, c)| {
        if escaped {
            escaped = false;
            return None;
        }
        escaped = c == '\\';
        (c == sep).then_some(idx)
    })
}

fn split_unescaped(s: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    for idx in unescaped(s, sep) {
        parts.push(&s[start..idx]);
        start = idx + sep.len_utf8();
    }
    parts.push(&s[start..]);
    parts
}

/// An ordered set of tags with unique keys.
///
/// Together with a series name, the tag set forms a series' identity. Tags are
/// kept sorted by key, so two sets with the same pairs compare, hash and
/// render identically regardless of insertion order.
#[derive(
    Debug,
    Default,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(from = "Vec<Tag>", into = "Vec<Tag>")]
pub struct Tags(Vec<Tag>);

impl Tags {
    /// Create a tag set from arbitrary pairs. When a key repeats, the last
    /// value wins.
    pub fn new(tags: impl IntoIterator<Item = Tag>) -> Self {
        let mut out = Self::default();
        for tag in tags {
            out.insert(tag);
        }
        out
    }

    /// Create a tag set from `(key, value)` pairs.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self::new(pairs.into_iter().map(|(k, v)| Tag::new(k, v)))
    }

    /// Parse the [canonical](Self::canonical) `k1=v1,k2=v2` form.
    ///
    /// Unlike [`Tags::new`], duplicate keys are rejected.
    pub fn parse(s: &str) -> Result<Self, TagsError> {
        let mut out = Self::default();
        if s.is_empty() {
            return Ok(out);
        }
        for pair in split_unescaped(s, ',') {
            let eq = unescaped(pair, '=')
                .next()
                .ok_or_else(|| TagsError::MissingSeparator(pair.to_owned()))?;
            let key = unescape(&pair[..eq]);
            if key.is_empty() {
                return Err(TagsError::EmptyKey(pair.to_owned()));
            }
            if out.get(&key).is_some() {
                return Err(TagsError::DuplicateKey(key));
            }
            out.insert(Tag::new(key, unescape(&pair[eq + 1..])));
        }
        Ok(out)
    }

    /// Insert a tag, replacing the value of an existing key.
    pub fn insert(&mut self, tag: Tag) {
        match self.0.binary_search_by(|t| t.key.as_str().cmp(&tag.key)) {
            Ok(idx) => self.0[idx].value = tag.value,
            Err(idx) => self.0.insert(idx, tag),
        }
    }

    /// Look up the value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .binary_search_by(|t| t.key.as_str().cmp(key))
            .ok()
            .map(|idx| self.0[idx].value.as_str())
    }

    /// Number of tags.
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the set holds no tags.
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the tags in key order.
    pub fn iter(&self) -> core::slice::Iter<'_, Tag> {
        self.0.iter()
    }

    /// The canonical comparable form, `k1=v1,k2=v2` in key order, with each
    /// pair [escaped](Tag::escaped). Distinct tag sets always have distinct
    /// canonical forms, and [`Tags::parse`] inverts it.
    pub fn canonical(&self) -> String {
        self.0.iter().map(Tag::escaped).join(",")
    }
}

impl From<Vec<Tag>> for Tags {
    fn from(tags: Vec<Tag>) -> Self {
        Self::new(tags)
    }
}

impl From<Tags> for Vec<Tag> {
    fn from(tags: Tags) -> Self {
        tags.0
    }
}

impl FromIterator<Tag> for Tags {
    fn from_iter<I: IntoIterator<Item = Tag>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl<'a> IntoIterator for &'a Tags {
    type Item = &'a Tag;
    type IntoIter = core::slice::Iter<'a, Tag>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for Tags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

/// Build the series key `name,k1=v1,k2=v2` identifying a series.
///
/// Commas, spaces and backslashes in the name are escaped with a backslash,
/// so the name cannot run into the tag set.
pub fn series_key(name: &[u8], tags: &Tags) -> Bytes {
    let canonical = tags.canonical();
    let mut buf = BytesMut::with_capacity(name.len() + 1 + canonical.len());
    for &b in name {
        if matches!(b, b',' | b' ' | b'\\') {
            buf.put_u8(b'\\');
        }
        buf.put_u8(b);
    }
    if !canonical.is_empty() {
        buf.put_u8(b',');
        buf.put_slice(canonical.as_bytes());
    }
    buf.freeze()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorted_and_unique() {
        let tags = Tags::from_pairs([("region", "west"), ("host", "a"), ("region", "east")]);
        assert_eq!(tags.len(), 2);
        assert_eq!(tags.get("region"), Some("east"));
        assert_eq!(tags.get("missing"), None);
        assert_eq!(tags.canonical(), "host=a,region=east");
    }

    #[test]
    fn insertion_order_does_not_matter() {
        let a = Tags::from_pairs([("a", "1"), ("b", "2")]);
        let b = Tags::from_pairs([("b", "2"), ("a", "1")]);
        assert_eq!(a, b);
    }

    #[test]
    fn parse_canonical() {
        let tags = Tags::parse("host=a,region=east").unwrap();
        assert_eq!(tags, Tags::from_pairs([("region", "east"), ("host", "a")]));
        assert!(Tags::parse("").unwrap().is_empty());
        assert_eq!(Tags::parse("host"), Err(TagsError::MissingSeparator("host".into())));
        assert_eq!(Tags::parse("=a"), Err(TagsError::EmptyKey("=a".into())));
        assert_eq!(Tags::parse("a=1,a=2"), Err(TagsError::DuplicateKey("a".into())));
    }

    #[test]
    fn structural_characters_are_escaped() {
        let packed = Tags::from_pairs([("host", "x,region=y")]);
        let split = Tags::from_pairs([("host", "x"), ("region", "y")]);
        assert_eq!(packed.canonical(), r"host=x\,region\=y");
        assert_eq!(split.canonical(), "host=x,region=y");
        assert_ne!(packed.canonical(), split.canonical());

        let odd = Tags::from_pairs([("a key", r"back\slash"), ("k=v", "")]);
        for tags in [packed, split, odd] {
            assert_eq!(Tags::parse(&tags.canonical()).unwrap(), tags);
        }
    }

    #[test]
    fn series_keys_do_not_collide() {
        let packed = Tags::from_pairs([("host", "x,region=y")]);
        let split = Tags::from_pairs([("host", "x"), ("region", "y")]);
        assert_ne!(series_key(b"cpu", &packed), series_key(b"cpu", &split));

        let tags = Tags::from_pairs([("host", "a")]);
        assert_ne!(series_key(b"cpu,host=a", &Tags::default()), series_key(b"cpu", &tags));
        assert_eq!(&series_key(b"cpu load", &Tags::default())[..], br"cpu\ load");
    }

    #[test]
    fn series_keys() {
        let tags = Tags::from_pairs([("host", "a")]);
        assert_eq!(&series_key(b"cpu", &tags)[..], b"cpu,host=a");
        assert_eq!(&series_key(b"cpu", &Tags::default())[..], b"cpu");
    }

    #[test]
    fn serde_sorts_on_deserialize() {
        let json = r#"[{"key":"z","value":"1"},{"key":"a","value":"2"}]"#;
        let tags: Tags = serde_json::from_str(json).unwrap();
        assert_eq!(tags.canonical(), "a=2,z=1");
    }
}
