//! Category payloads.

use serde::{Deserialize, Serialize};

use crate::types::CategoryId;

/// A category node, possibly with children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub category_id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub parent_id: Option<CategoryId>,
    #[serde(default)]
    pub children: Vec<Category>,
}

impl Category {
    /// Depth-first search of this subtree.
    #[must_use]
    pub fn find(&self, id: CategoryId) -> Option<&Self> {
        if self.category_id == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }

    /// Flatten a forest into `(depth, category)` pairs in display order.
    #[must_use]
    pub fn flatten(roots: &[Self]) -> Vec<(usize, &Self)> {
        fn walk<'a>(nodes: &'a [Category], depth: usize, out: &mut Vec<(usize, &'a Category)>) {
            for node in nodes {
                out.push((depth, node));
                walk(&node.children, depth + 1, out);
            }
        }

        let mut out = Vec::new();
        walk(roots, 0, &mut out);
        out
    }
}

/// Create/update body for a category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<CategoryId>,
}
