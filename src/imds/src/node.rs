// Copyright 2026 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Metadata nodes and the shape-based classifier.
//!
//! The metadata service returns plain text for every key. A directory
//! returns the names of its children, one per line. A value returns the value.
//! Nothing in the response says which one it is, so [classify] decides from
//! the key and the body, applying [RULES] in order.
//!
//! A value that spans several lines is classified as a directory. The service
//! exposes a few of those (e.g. `public-keys/0/openssh-key` on some images),
//! and they are expanded as if each line were a child key.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};

/// The outcome of classifying a response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Classification {
    /// A scalar value, returned verbatim.
    Leaf(String),
    /// A listing of child keys, one per line.
    Interior(String),
}

/// One entry in the ordered list of rules that mark a response as a
/// directory listing.
#[derive(Clone, Copy, Debug)]
pub struct Rule {
    pub name: &'static str,
    applies: fn(key_path: &str, body: &str) -> bool,
}

impl Rule {
    pub fn applies(&self, key_path: &str, body: &str) -> bool {
        (self.applies)(key_path, body)
    }
}

/// The directory rules, in precedence order. A response no rule matches is a
/// leaf.
pub static RULES: [Rule; 4] = [
    Rule {
        name: "root key",
        applies: is_root,
    },
    Rule {
        name: "key ends with '/'",
        applies: key_is_directory,
    },
    Rule {
        name: "body ends with '/'",
        applies: body_is_directory,
    },
    Rule {
        name: "body spans several lines",
        applies: body_is_multiline,
    },
];

fn is_root(key_path: &str, _body: &str) -> bool {
    key_path.is_empty()
}

fn key_is_directory(key_path: &str, _body: &str) -> bool {
    key_path.ends_with('/')
}

fn body_is_directory(_key_path: &str, body: &str) -> bool {
    body.ends_with('/')
}

fn body_is_multiline(_key_path: &str, body: &str) -> bool {
    body.contains(['\n', '\r'])
}

/// Returns the first rule that marks this response as a directory, if any.
pub fn matching_rule(key_path: &str, body: &str) -> Option<&'static Rule> {
    RULES.iter().find(|rule| rule.applies(key_path, body))
}

/// Classifies the response `body` returned for `key_path`.
pub fn classify(key_path: &str, body: String) -> Classification {
    match matching_rule(key_path, &body) {
        Some(rule) => {
            tracing::trace!(key_path, rule = rule.name, "interior");
            Classification::Interior(body)
        }
        None => Classification::Leaf(body),
    }
}

/// Splits a directory listing into child key names, in service order.
pub fn child_segments(listing: &str) -> Vec<String> {
    listing
        .lines()
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// The resolved content at a key path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MetadataNode {
    Leaf(String),
    Interior(Directory),
}

impl MetadataNode {
    /// An empty value or a directory without children.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Leaf(v) => v.is_empty(),
            Self::Interior(d) => d.is_empty(),
        }
    }
}

/// The children of an interior node, in the order the service listed them.
///
/// A child is `None` when fetching it failed; the entry is kept so the output
/// still shows the key.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Directory {
    entries: Vec<(String, Option<MetadataNode>)>,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a child. A replaced child keeps its position.
    pub fn insert<K: Into<String>>(&mut self, key: K, child: Option<MetadataNode>) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = child,
            None => self.entries.push((key, child)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Option<MetadataNode>> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&MetadataNode>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Option<MetadataNode>)> for Directory {
    fn from_iter<I: IntoIterator<Item = (K, Option<MetadataNode>)>>(iter: I) -> Self {
        let mut directory = Directory::new();
        for (k, v) in iter {
            directory.insert(k, v);
        }
        directory
    }
}

impl Serialize for MetadataNode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Leaf(v) => serializer.serialize_str(v),
            Self::Interior(d) => {
                let mut map = serializer.serialize_map(Some(d.len()))?;
                for (k, v) in d.iter() {
                    map.serialize_entry(k, &v)?;
                }
                map.end()
            }
        }
    }
}

impl From<MetadataNode> for Value {
    fn from(node: MetadataNode) -> Self {
        match node {
            MetadataNode::Leaf(v) => Value::String(v),
            MetadataNode::Interior(d) => Value::Object(
                d.entries
                    .into_iter()
                    .map(|(k, v)| (k, v.map(Value::from).unwrap_or(Value::Null)))
                    .collect::<Map<_, _>>(),
            ),
        }
    }
}
