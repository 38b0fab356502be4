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

use serde_json::{Map, Value};

/// Nests `node` under each segment of `key_path`.
///
/// `rewrap("network/interfaces", v)` returns `{"network": {"interfaces": v}}`.
/// The empty key path returns `node` unchanged. Empty segments, such as the
/// one after a trailing `/`, are skipped.
pub fn rewrap<V: Into<Value>>(key_path: &str, node: V) -> Value {
    key_path
        .split('/')
        .filter(|s| !s.is_empty())
        .rev()
        .fold(node.into(), |inner, segment| {
            Value::Object(Map::from_iter([(segment.to_string(), inner)]))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Directory, MetadataNode};
    use serde_json::json;
    use test_case::test_case;

    #[test]
    fn nested() {
        let got = rewrap("x/y", json!({"z": "v"}));
        assert_eq!(got, json!({"x": {"y": {"z": "v"}}}));
    }

    #[test]
    fn root_is_unchanged() {
        let node = json!({"ami-id": "ami-0abc", "instance-id": "i-123"});
        assert_eq!(rewrap("", node.clone()), node);
    }

    #[test_case("instance-id", json!({"instance-id": "i-123"}))]
    #[test_case("placement/region", json!({"placement": {"region": "i-123"}}))]
    #[test_case("placement/", json!({"placement": "i-123"}))]
    #[test_case("/placement//region", json!({"placement": {"region": "i-123"}}))]
    fn segments(key_path: &str, want: Value) {
        assert_eq!(rewrap(key_path, "i-123"), want);
    }

    #[test]
    fn metadata_node() {
        let node = MetadataNode::Interior(Directory::from_iter([(
            "device-number",
            Some(MetadataNode::Leaf("0".into())),
        )]));
        let got = rewrap("network/interfaces", node);
        assert_eq!(
            got,
            json!({"network": {"interfaces": {"device-number": "0"}}})
        );
    }
}
