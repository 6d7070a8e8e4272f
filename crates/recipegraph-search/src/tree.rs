use crate::variation::MultiRecipeResult;
use recipegraph_core::{Element, Recipe};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Presentation form of a recipe: every ingredient occurrence is its own node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecipeTree {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<RecipeTree>,
}

impl RecipeTree {
    pub fn leaf(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(RecipeTree::node_count).sum::<usize>()
    }

    pub fn leaf_count(&self) -> usize {
        if self.is_leaf() {
            1
        } else {
            self.children.iter().map(RecipeTree::leaf_count).sum()
        }
    }

    /// Number of levels; a lone leaf has height 1.
    pub fn height(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(RecipeTree::height)
            .max()
            .unwrap_or(0)
    }
}

struct Slot {
    element: Element,
    parent: Option<usize>,
    children: Vec<usize>,
}

/// Turns flat recipes into [`RecipeTree`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecipeTreeBuilder;

impl RecipeTreeBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Expand `recipe` breadth-first from `target`. Elements without an entry
    /// become leaves, as does any element that would repeat one of its own
    /// ancestors.
    pub fn build_tree(&self, target: &str, recipe: &Recipe) -> RecipeTree {
        let mut slots = vec![Slot {
            element: Element::from(target),
            parent: None,
            children: Vec::new(),
        }];
        let mut queue = VecDeque::from([0usize]);

        while let Some(id) = queue.pop_front() {
            let Some(pair) = recipe.get(&slots[id].element) else {
                continue;
            };
            if Self::repeats_ancestor(&slots, id) {
                continue;
            }
            for ingredient in [&pair.first, &pair.second] {
                let child = slots.len();
                slots.push(Slot {
                    element: ingredient.clone(),
                    parent: Some(id),
                    children: Vec::new(),
                });
                slots[id].children.push(child);
                queue.push_back(child);
            }
        }

        // Children always sit after their parent, so a reverse sweep sees
        // every subtree complete before it is attached.
        let mut built: Vec<Option<RecipeTree>> = Vec::with_capacity(slots.len());
        built.resize_with(slots.len(), || None);
        for id in (0..slots.len()).rev() {
            let children = slots[id]
                .children
                .iter()
                .filter_map(|child| built[*child].take())
                .collect();
            built[id] = Some(RecipeTree {
                name: slots[id].element.to_string(),
                children,
            });
        }
        built
            .into_iter()
            .next()
            .flatten()
            .unwrap_or_else(|| RecipeTree::leaf(target))
    }

    fn repeats_ancestor(slots: &[Slot], id: usize) -> bool {
        let element = &slots[id].element;
        let mut cursor = slots[id].parent;
        while let Some(parent) = cursor {
            if &slots[parent].element == element {
                return true;
            }
            cursor = slots[parent].parent;
        }
        false
    }

    /// One tree per recipe, plus the visit count recorded by the search.
    pub fn build_multiple_trees(
        &self,
        target: &str,
        result: &MultiRecipeResult,
    ) -> (Vec<RecipeTree>, usize) {
        let trees = result
            .recipes
            .iter()
            .map(|recipe| self.build_tree(target, recipe))
            .collect();
        (trees, result.nodes_visited)
    }
}
