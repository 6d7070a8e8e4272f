use crate::{CombinationIndex, Element, Pair};
use rustc_hash::FxHashSet;
use std::collections::BTreeMap;
use std::fmt;

/// One chosen producing pair per element: a single way of crafting a target.
///
/// Base elements never have entries. Entries are kept sorted by element name
/// so that iteration, comparison and signatures are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Recipe {
    steps: BTreeMap<Element, Pair>,
}

impl Recipe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, element: &str) -> Option<&Pair> {
        self.steps.get(element)
    }

    pub fn insert(&mut self, element: Element, pair: Pair) -> Option<Pair> {
        self.steps.insert(element, pair)
    }

    pub fn remove(&mut self, element: &str) -> Option<Pair> {
        self.steps.remove(element)
    }

    pub fn contains(&self, element: &str) -> bool {
        self.steps.contains_key(element)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Element, &Pair)> {
        self.steps.iter()
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.steps.keys()
    }

    /// Copy entries of `other` that this recipe lacks. Returns the elements added.
    pub fn merge_missing(&mut self, other: &Recipe) -> Vec<Element> {
        let mut added = Vec::new();
        for (element, pair) in other.iter() {
            if !self.steps.contains_key(element) {
                self.steps.insert(element.clone(), pair.clone());
                added.push(element.clone());
            }
        }
        added
    }

    /// Non-base elements reachable from `target` by following producing pairs,
    /// root first, ingredients in stored order. Elements without an entry are
    /// included (they are the gaps of an incomplete recipe) but not descended.
    pub fn reachable(&self, target: &Element, index: &CombinationIndex) -> Vec<Element> {
        let mut order = Vec::new();
        let mut seen: FxHashSet<Element> = FxHashSet::default();
        let mut stack = vec![target.clone()];

        while let Some(current) = stack.pop() {
            if index.is_base(&current) || !seen.insert(current.clone()) {
                continue;
            }
            if let Some(pair) = self.steps.get(&current) {
                stack.push(pair.second.clone());
                stack.push(pair.first.clone());
            }
            order.push(current);
        }

        order
    }

    /// Elements reachable from `target` that still lack a recipe.
    pub fn gaps(&self, target: &Element, index: &CombinationIndex) -> Vec<Element> {
        self.reachable(target, index)
            .into_iter()
            .filter(|e| !self.steps.contains_key(e))
            .collect()
    }

    /// Complete and tier-consistent with respect to `target`.
    pub fn is_complete(&self, target: &Element, index: &CombinationIndex) -> bool {
        self.reachable(target, index)
            .iter()
            .all(|e| match self.steps.get(e) {
                Some(pair) => index.is_tier_valid(e, pair),
                None => false,
            })
    }

    /// Only the entries reachable from `target`.
    pub fn pruned(&self, target: &Element, index: &CombinationIndex) -> Recipe {
        let mut steps = BTreeMap::new();
        for element in self.reachable(target, index) {
            if let Some(pair) = self.steps.get(&element) {
                steps.insert(element, pair.clone());
            }
        }
        Recipe { steps }
    }

    /// Canonical fingerprint of the part of this recipe that builds `target`.
    ///
    /// Each reachable non-base element renders as `name(a+b)` with the two
    /// ingredients in lexicographic order; renderings are concatenated in
    /// element-name order. Two recipes build `target` the same way exactly
    /// when their signatures match.
    ///
    /// The flat form is deliberate: a nested rendering identifies the same
    /// recipes but repeats shared sub-recipes once per occurrence.
    pub fn signature(&self, target: &Element, index: &CombinationIndex) -> Signature {
        let mut reachable = self.reachable(target, index);
        reachable.sort();

        let mut out = String::new();
        for element in reachable {
            out.push_str(&element);
            out.push('(');
            if let Some(pair) = self.steps.get(&element) {
                let (a, b) = pair.ordered();
                out.push_str(a);
                out.push('+');
                out.push_str(b);
            }
            out.push(')');
        }
        Signature(out)
    }
}

impl FromIterator<(Element, Pair)> for Recipe {
    fn from_iter<T: IntoIterator<Item = (Element, Pair)>>(iter: T) -> Self {
        Self {
            steps: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Signature(String);

impl Signature {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered, signature-deduplicated recipes for one target.
#[derive(Debug, Clone, Default)]
pub struct RecipeSet {
    recipes: Vec<Recipe>,
    signatures: FxHashSet<Signature>,
}

impl RecipeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit `recipe` unless a recipe with the same signature is already present.
    pub fn insert(&mut self, recipe: Recipe, signature: Signature) -> bool {
        if self.signatures.insert(signature) {
            self.recipes.push(recipe);
            true
        } else {
            false
        }
    }

    pub fn contains_signature(&self, signature: &Signature) -> bool {
        self.signatures.contains(signature)
    }

    pub fn get(&self, position: usize) -> Option<&Recipe> {
        self.recipes.get(position)
    }

    pub fn first(&self) -> Option<&Recipe> {
        self.recipes.first()
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Recipe> {
        self.recipes.iter()
    }

    pub fn truncate(&mut self, len: usize) {
        self.recipes.truncate(len);
    }

    pub fn into_vec(self) -> Vec<Recipe> {
        self.recipes
    }
}

impl<'a> IntoIterator for &'a RecipeSet {
    type Item = &'a Recipe;
    type IntoIter = std::slice::Iter<'a, Recipe>;

    fn into_iter(self) -> Self::IntoIter {
        self.recipes.iter()
    }
}
