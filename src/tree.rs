//! Path-addressed configuration tree.
//!
//! Every registered file path becomes a chain of [`ConfigNode::Branch`]
//! nodes ending in a leaf. Leaves start out [`ConfigNode::Unset`] and are
//! filled with raw content or a parsed [`Artifact`] once fetched.

use crate::artifact::Artifact;
use crate::paths::segments;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::ops::Index;

pub(crate) static UNSET: ConfigNode = ConfigNode::Unset;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum ConfigNode {
    /// Directory: child segments in insertion order.
    Branch(IndexMap<String, ConfigNode>),
    /// Registered leaf with no content yet.
    #[default]
    Unset,
    Content(String),
    Artifact(Artifact),
}

impl ConfigNode {
    pub fn branch() -> Self {
        ConfigNode::Branch(IndexMap::new())
    }

    /// Nested branches for `segments`, ending in an `Unset` leaf.
    pub fn expand<S: AsRef<str>>(segments: &[S]) -> Self {
        segments.iter().rev().fold(ConfigNode::Unset, |node, segment| {
            let mut map = IndexMap::new();
            map.insert(segment.as_ref().to_string(), node);
            ConfigNode::Branch(map)
        })
    }

    /// Deep union with `other`.
    ///
    /// Existing keys are never overwritten: branches merge recursively, an
    /// `Unset` placeholder gives way to an incoming branch, and any other
    /// existing leaf is kept as is. New keys keep their incoming order after
    /// the existing ones.
    pub fn merge(&mut self, other: ConfigNode) {
        let ConfigNode::Branch(theirs) = other else {
            return;
        };
        match self {
            ConfigNode::Branch(mine) => {
                for (key, incoming) in theirs {
                    match mine.get_mut(&key) {
                        Some(existing) => existing.merge(incoming),
                        None => {
                            mine.insert(key, incoming);
                        }
                    }
                }
            }
            ConfigNode::Unset => *self = ConfigNode::Branch(theirs),
            _ => {}
        }
    }

    pub fn is_branch(&self) -> bool {
        matches!(self, ConfigNode::Branch(_))
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, ConfigNode::Unset)
    }

    pub fn is_leaf(&self) -> bool {
        !self.is_branch()
    }

    pub fn get(&self, key: &str) -> Option<&ConfigNode> {
        match self {
            ConfigNode::Branch(map) => map.get(key),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut ConfigNode> {
        match self {
            ConfigNode::Branch(map) => map.get_mut(key),
            _ => None,
        }
    }

    /// Child keys of a branch, in insertion order.
    pub fn keys(&self) -> Vec<&str> {
        match self {
            ConfigNode::Branch(map) => map.keys().map(String::as_str).collect(),
            _ => Vec::new(),
        }
    }

    pub fn get_path(&self, path: &str) -> Option<&ConfigNode> {
        segments(path)
            .into_iter()
            .try_fold(self, |node, segment| node.get(segment))
    }

    pub fn get_path_mut(&mut self, path: &str) -> Option<&mut ConfigNode> {
        let mut node = self;
        for segment in segments(path) {
            node = node.get_mut(segment)?;
        }
        Some(node)
    }

    /// Store `value` at `path`, creating intermediate branches.
    ///
    /// A leaf sitting where a branch is needed is replaced.
    pub fn set_path(&mut self, path: &str, value: ConfigNode) {
        let parts = segments(path);
        let Some((last, dirs)) = parts.split_last() else {
            *self = value;
            return;
        };

        let mut map = self.branch_map();
        for segment in dirs {
            map = map
                .entry(segment.to_string())
                .or_insert_with(ConfigNode::branch)
                .branch_map();
        }
        map.insert(last.to_string(), value);
    }

    /// Children of this node, turning it into a branch first if needed.
    fn branch_map(&mut self) -> &mut IndexMap<String, ConfigNode> {
        if !self.is_branch() {
            *self = ConfigNode::branch();
        }
        match self {
            ConfigNode::Branch(map) => map,
            _ => unreachable!("node was just made a branch"),
        }
    }

    /// Slash-joined paths of every leaf, depth first in insertion order.
    pub fn leaf_paths(&self, prefix: &str) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_leaves(prefix, &mut out);
        out
    }

    fn collect_leaves(&self, prefix: &str, out: &mut Vec<String>) {
        match self {
            ConfigNode::Branch(map) => {
                for (key, child) in map {
                    let path = if prefix.is_empty() {
                        key.clone()
                    } else {
                        format!("{}/{}", prefix, key)
                    };
                    child.collect_leaves(&path, out);
                }
            }
            _ => out.push(prefix.to_string()),
        }
    }

    pub fn leaf_count(&self) -> usize {
        match self {
            ConfigNode::Branch(map) => map.values().map(ConfigNode::leaf_count).sum(),
            _ => 1,
        }
    }

    pub fn as_artifact(&self) -> Option<&Artifact> {
        match self {
            ConfigNode::Artifact(artifact) => Some(artifact),
            _ => None,
        }
    }

    pub fn as_artifact_mut(&mut self) -> Option<&mut Artifact> {
        match self {
            ConfigNode::Artifact(artifact) => Some(artifact),
            _ => None,
        }
    }

    /// JSON rendering: branches become objects, unset leaves `{}`, content
    /// and artifacts their printed text.
    pub fn to_json(&self) -> Value {
        match self {
            ConfigNode::Branch(map) => Value::Object(
                map.iter()
                    .map(|(key, child)| (key.clone(), child.to_json()))
                    .collect::<Map<String, Value>>(),
            ),
            ConfigNode::Unset => Value::Object(Map::new()),
            ConfigNode::Content(content) => Value::String(content.clone()),
            ConfigNode::Artifact(artifact) => Value::String(artifact.print()),
        }
    }
}

impl Index<&str> for ConfigNode {
    type Output = ConfigNode;

    /// Missing keys yield an `Unset` sentinel so lookups chain.
    fn index(&self, key: &str) -> &ConfigNode {
        self.get(key).unwrap_or(&UNSET)
    }
}

impl From<String> for ConfigNode {
    fn from(content: String) -> Self {
        ConfigNode::Content(content)
    }
}

impl From<&str> for ConfigNode {
    fn from(content: &str) -> Self {
        ConfigNode::Content(content.to_string())
    }
}

impl From<Artifact> for ConfigNode {
    fn from(artifact: Artifact) -> Self {
        ConfigNode::Artifact(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tree(paths: &[&str]) -> ConfigNode {
        let mut root = ConfigNode::branch();
        for path in paths {
            root.merge(ConfigNode::expand(&segments(path)));
        }
        root
    }

    #[test]
    fn test_expand() {
        let node = ConfigNode::expand(&["a", "b", "c"]);
        assert_eq!(node.to_json(), json!({"a": {"b": {"c": {}}}}));
        assert!(node["a"]["b"]["c"].is_unset());
    }

    #[test]
    fn test_expand_empty_is_leaf() {
        let node = ConfigNode::expand::<&str>(&[]);
        assert!(node.is_unset());
    }

    #[test]
    fn test_merge_union() {
        let root = tree(&["bin/run.sh", "default/app.conf", "local/inputs.conf", "bin/doit.rb"]);
        assert_eq!(
            root.to_json(),
            json!({
                "bin": {"run.sh": {}, "doit.rb": {}},
                "default": {"app.conf": {}},
                "local": {"inputs.conf": {}}
            })
        );
        assert_eq!(root.keys(), vec!["bin", "default", "local"]);
        assert_eq!(root.leaf_count(), 4);
    }

    #[test]
    fn test_merge_keeps_existing_leaves() {
        let mut root = tree(&["default/app.conf"]);
        root.set_path("default/app.conf", ConfigNode::from("[a]\nk = 1\n"));
        root.merge(ConfigNode::expand(&["default", "app.conf"]));
        root.merge(ConfigNode::expand(&["default", "data.conf"]));

        assert_eq!(
            root.get_path("default/app.conf"),
            Some(&ConfigNode::Content("[a]\nk = 1\n".to_string()))
        );
        assert!(root["default"]["data.conf"].is_unset());
    }

    #[test]
    fn test_unset_gives_way_to_branch() {
        let mut root = tree(&["models"]);
        root.merge(ConfigNode::expand(&["models", "item.rb"]));
        assert!(root["models"].is_branch());
        assert!(root["models"]["item.rb"].is_unset());
    }

    #[test]
    fn test_index_chains_through_missing() {
        let root = tree(&["bin/run.sh"]);
        assert!(root["nope"]["deeper"]["still"].is_unset());
        assert!(root.get_path("nope/deeper").is_none());
    }

    #[test]
    fn test_set_path_creates_branches() {
        let mut root = ConfigNode::branch();
        root.set_path("a/b/c.conf", ConfigNode::from("x"));
        assert_eq!(root.to_json(), json!({"a": {"b": {"c.conf": "x"}}}));

        root.set_path("a/b/c.conf/inner", ConfigNode::from("y"));
        assert_eq!(root.to_json(), json!({"a": {"b": {"c.conf": {"inner": "y"}}}}));
    }

    #[test]
    fn test_get_path_mut() {
        let mut root = tree(&["local/inputs.conf"]);
        *root.get_path_mut("local/inputs.conf").unwrap() = ConfigNode::from("z");
        assert_eq!(root["local"]["inputs.conf"], ConfigNode::Content("z".to_string()));
    }

    #[test]
    fn test_leaf_paths_in_order() {
        let root = tree(&["models/a", "ui/b", "another/c", "models/d"]);
        assert_eq!(
            root.leaf_paths(""),
            vec!["models/a", "models/d", "ui/b", "another/c"]
        );
        assert_eq!(root.keys(), vec!["models", "ui", "another"]);
    }

    #[test]
    fn test_artifact_leaf() {
        let mut root = tree(&["default/app.conf"]);
        let artifact = Artifact::for_file("default/app.conf", "[ui]\nlabel = Search\n");
        root.set_path("default/app.conf", artifact.into());
        let leaf = root["default"]["app.conf"].as_artifact().unwrap();
        assert_eq!(leaf.find("ui").and_then(|s| s.get("label")).as_deref(), Some("Search"));
    }
}
