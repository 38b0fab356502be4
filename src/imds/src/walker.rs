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

//! Fetches keys and expands directories into [MetadataNode] trees.
//!
//! Traversal is depth-first and strictly sequential: one request is in flight
//! at any time. The configured depth and fan-out limits only trip on
//! pathological listings; the real hierarchy is a handful of levels deep.

use crate::config::Config;
use crate::node::{Classification, Directory, MetadataNode, child_segments, classify};
use crate::token::Token;
use crate::transport::{Transport, get_metadata};
use crate::{Error, Result};

/// Fetches `key_path` and classifies the response.
pub async fn fetch<T>(
    config: &Config,
    transport: &T,
    token: Option<&Token>,
    key_path: &str,
) -> Result<Classification>
where
    T: Transport + ?Sized,
{
    let response = get_metadata(config, transport, token, key_path)
        .await?
        .success()?;
    Ok(classify(key_path, response.body))
}

/// Lists the child keys of `key_path`.
///
/// Returns an empty list if the key is a value or cannot be fetched.
pub async fn list_keys<T>(
    config: &Config,
    transport: &T,
    token: Option<&Token>,
    key_path: &str,
) -> Vec<String>
where
    T: Transport + ?Sized,
{
    match fetch(config, transport, token, key_path).await {
        Ok(Classification::Interior(listing)) => child_segments(&listing),
        Ok(Classification::Leaf(_)) => Vec::new(),
        Err(e) => {
            tracing::debug!(key_path, "cannot list keys: {e}");
            Vec::new()
        }
    }
}

/// Resolves `key_path` into a value or a fully expanded directory.
///
/// Returns `None` if the key cannot be fetched or its body is empty. Children
/// that fail are kept in their parent as `None`.
pub async fn resolve<T>(
    config: &Config,
    transport: &T,
    token: Option<&Token>,
    key_path: &str,
) -> Option<MetadataNode>
where
    T: Transport + ?Sized,
{
    match resolve_at(config, transport, token, key_path, 0).await {
        Ok(node) => Some(node),
        Err(e) => {
            tracing::debug!(key_path, "no metadata found: {e}");
            None
        }
    }
}

async fn resolve_at<T>(
    config: &Config,
    transport: &T,
    token: Option<&Token>,
    key_path: &str,
    depth: usize,
) -> Result<MetadataNode>
where
    T: Transport + ?Sized,
{
    if depth > config.max_depth() {
        tracing::warn!(key_path, "stopping traversal, too many nested directories");
        return Err(Error::depth_exceeded(config.max_depth()));
    }
    let listing = match fetch(config, transport, token, key_path).await? {
        Classification::Leaf(v) if v.is_empty() => return Err(Error::empty_body()),
        Classification::Leaf(v) => return Ok(MetadataNode::Leaf(v)),
        Classification::Interior(l) if l.is_empty() => return Err(Error::empty_body()),
        Classification::Interior(l) => l,
    };
    let segments = child_segments(&listing);
    if segments.len() > config.max_children() {
        tracing::warn!(key_path, count = segments.len(), "stopping traversal, too many children");
        return Err(Error::fan_out_exceeded(segments.len(), config.max_children()));
    }
    let mut directory = Directory::new();
    for segment in segments {
        let path = child_path(key_path, &segment);
        let child = match Box::pin(resolve_at(config, transport, token, &path, depth + 1)).await {
            Ok(node) => Some(node),
            Err(e) => {
                tracing::debug!(key_path = path.as_str(), "no metadata found: {e}");
                None
            }
        };
        directory.insert(segment, child);
    }
    Ok(MetadataNode::Interior(directory))
}

/// The key path of `segment` inside the directory at `key_path`.
pub fn child_path(key_path: &str, segment: &str) -> String {
    if key_path.is_empty() {
        segment.to_string()
    } else if key_path.ends_with('/') {
        format!("{key_path}{segment}")
    } else {
        format!("{key_path}/{segment}")
    }
}
