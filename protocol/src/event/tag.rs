//! Typed event tags.
//!
//! On the wire a tag is just `["name", "value", ...]`. In here it's a
//! [`Tag`] variant, so a builder can't typo `"new_key"` and a validator can
//! match on shape instead of poking at string indices.
//!
//! Parsing is total: anything that isn't a canonical known tag (unknown
//! name, wrong arity, a safeguard with a value) lands in [`Tag::Other`]
//! with its elements intact. Validators count tags by *name*, so an
//! `["threshold", "1", "1"]` is still found and then rejected for its
//! shape rather than silently ignored.

use serde::{Deserialize, Serialize};
use std::slice;

use crate::config::{
    Safeguard, TAG_CO_SIGNATURES, TAG_EVENT, TAG_IDENTIFIER, TAG_NEW_KEY, TAG_PUBLIC_KEY,
    TAG_SETUP, TAG_SUCCESSOR_KEY, TAG_THRESHOLD,
};

// ---------------------------------------------------------------------------
// Tag
// ---------------------------------------------------------------------------

/// One event tag.
///
/// Equality is on the full element list, the same "full tuple" equality
/// relays use, regardless of which variant holds the data.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub enum Tag {
    /// `["d", id]`
    Identifier(String),
    /// `["p", pubkey]`
    PublicKey(String),
    /// `["e", event_id]`
    Event(String),
    /// `["new-key", pubkey]`
    NewKey(String),
    /// `["successor-key", pubkey]`
    SuccessorKey(String),
    /// `["threshold", "n"]`, kept as the raw string so malformed values
    /// survive parsing and can be reported.
    Threshold(String),
    /// `["setup", setup_event_json]`
    Setup(String),
    /// `["key-migration"]` and friends.
    Safeguard(Safeguard),
    /// `["sigs", sig1, sig2, ...]`
    CoSignatures(Vec<String>),
    /// Everything else, elements verbatim (name first).
    Other(Vec<String>),
}

impl Tag {
    /// The tag name (first element). Empty for an empty tag.
    pub fn name(&self) -> &str {
        match self {
            Self::Identifier(_) => TAG_IDENTIFIER,
            Self::PublicKey(_) => TAG_PUBLIC_KEY,
            Self::Event(_) => TAG_EVENT,
            Self::NewKey(_) => TAG_NEW_KEY,
            Self::SuccessorKey(_) => TAG_SUCCESSOR_KEY,
            Self::Threshold(_) => TAG_THRESHOLD,
            Self::Setup(_) => TAG_SETUP,
            Self::Safeguard(guard) => guard.as_str(),
            Self::CoSignatures(_) => TAG_CO_SIGNATURES,
            Self::Other(elems) => elems.first().map(String::as_str).unwrap_or(""),
        }
    }

    /// Everything after the name. Never allocates.
    pub fn values(&self) -> &[String] {
        match self {
            Self::Identifier(v)
            | Self::PublicKey(v)
            | Self::Event(v)
            | Self::NewKey(v)
            | Self::SuccessorKey(v)
            | Self::Threshold(v)
            | Self::Setup(v) => slice::from_ref(v),
            Self::Safeguard(_) => &[],
            Self::CoSignatures(sigs) => sigs,
            Self::Other(elems) => elems.get(1..).unwrap_or(&[]),
        }
    }

    /// First value, if any.
    pub fn value(&self) -> Option<&str> {
        self.values().first().map(String::as_str)
    }

    /// The wire form, name first.
    pub fn to_vec(&self) -> Vec<String> {
        if let Self::Other(elems) = self {
            return elems.clone();
        }
        let mut out = Vec::with_capacity(1 + self.values().len());
        out.push(self.name().to_string());
        out.extend(self.values().iter().cloned());
        out
    }
}

impl PartialEq for Tag {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            // `[]` and `[""]` share an empty name and no values.
            (Self::Other(a), Self::Other(b)) => a == b,
            (Self::Other(elems), tag) | (tag, Self::Other(elems)) => {
                elems.first().map(String::as_str) == Some(tag.name())
                    && elems.get(1..) == Some(tag.values())
            }
            _ => self.name() == other.name() && self.values() == other.values(),
        }
    }
}

impl From<Vec<String>> for Tag {
    fn from(mut elems: Vec<String>) -> Self {
        if elems.len() == 2 {
            let make: Option<fn(String) -> Tag> = match elems[0].as_str() {
                TAG_IDENTIFIER => Some(Tag::Identifier),
                TAG_PUBLIC_KEY => Some(Tag::PublicKey),
                TAG_EVENT => Some(Tag::Event),
                TAG_NEW_KEY => Some(Tag::NewKey),
                TAG_SUCCESSOR_KEY => Some(Tag::SuccessorKey),
                TAG_THRESHOLD => Some(Tag::Threshold),
                TAG_SETUP => Some(Tag::Setup),
                _ => None,
            };
            if let (Some(make), Some(value)) = (make, elems.pop()) {
                return make(value);
            }
        }
        if elems.len() == 1 {
            if let Ok(guard) = elems[0].parse::<Safeguard>() {
                return Tag::Safeguard(guard);
            }
        }
        if elems.first().map(String::as_str) == Some(TAG_CO_SIGNATURES) {
            return Tag::CoSignatures(elems.split_off(1));
        }
        Tag::Other(elems)
    }
}

impl From<Tag> for Vec<String> {
    fn from(tag: Tag) -> Self {
        match tag {
            Tag::Other(elems) => elems,
            tag => tag.to_vec(),
        }
    }
}

impl From<&[&str]> for Tag {
    fn from(elems: &[&str]) -> Self {
        Tag::from(elems.iter().map(|s| s.to_string()).collect::<Vec<_>>())
    }
}

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

/// An ordered tag list with the query primitives validators need.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tags(Vec<Tag>);

impl Tags {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append `tag` unless an identical tuple is already present. Returns
    /// whether the tag was added.
    pub fn push_unique(&mut self, tag: Tag) -> bool {
        if self.0.contains(&tag) {
            return false;
        }
        self.0.push(tag);
        true
    }

    /// Append unconditionally. For building deliberately odd events in
    /// tests and tools; builders use [`Tags::push_unique`].
    pub fn push(&mut self, tag: Tag) {
        self.0.push(tag);
    }

    /// Every tag with the given name, in order.
    pub fn find_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Tag> + 'a {
        self.0.iter().filter(move |t| t.name() == name)
    }

    /// Number of tags with the given name.
    pub fn count(&self, name: &str) -> usize {
        self.find_all(name).count()
    }

    /// First tag with the given name.
    pub fn find(&self, name: &str) -> Option<&Tag> {
        self.0.iter().find(|t| t.name() == name)
    }

    /// First value of the first tag with the given name.
    pub fn first_value(&self, name: &str) -> Option<&str> {
        self.find(name).and_then(Tag::value)
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Drop every tag with the given name. Returns how many went.
    pub fn remove_all(&mut self, name: &str) -> usize {
        let before = self.0.len();
        self.0.retain(|t| t.name() != name);
        before - self.0.len()
    }

    pub fn iter(&self) -> slice::Iter<'_, Tag> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a Tags {
    type Item = &'a Tag;
    type IntoIter = slice::Iter<'a, Tag>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<Tag> for Tags {
    fn from_iter<I: IntoIterator<Item = Tag>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<Vec<Tag>> for Tags {
    fn from(tags: Vec<Tag>) -> Self {
        Self(tags)
    }
}
