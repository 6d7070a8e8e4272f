//! Single-recipe search: forward breadth-first, backward depth-first and
//! bidirectional meet-in-the-middle.
//!
//! Every finder returns `None` when the target cannot be built and
//! `Some(Recipe::new())` when the target is itself a base element. Returned
//! recipes only hold entries reachable from the target and every entry
//! respects the tier ordering.

use recipegraph_core::{Algorithm, CombinationIndex, Element, Pair, Recipe};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;
use tracing::trace;

/// Resolution state of one element during a backward search.
///
/// An element with no entry in the state map is unvisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeState {
    InProgress,
    Resolved,
    Unresolvable,
}

/// Backward depth-first resolver working on one recipe.
///
/// Entries already present in the recipe are tried before any other
/// producing pair, so the resolver doubles as a repair pass: it keeps every
/// entry whose ingredients still resolve and fills the gaps it runs into.
/// Failures are memoized; under the tier filter the producing relation is
/// acyclic, so an element that fails once fails from every path.
pub(crate) struct BackwardResolver<'a> {
    index: &'a CombinationIndex,
    recipe: Recipe,
    states: FxHashMap<Element, NodeState>,
}

impl<'a> BackwardResolver<'a> {
    pub(crate) fn new(index: &'a CombinationIndex, recipe: Recipe) -> Self {
        Self {
            index,
            recipe,
            states: FxHashMap::default(),
        }
    }

    /// Make sure `element` has a complete, tier-consistent sub-recipe.
    pub(crate) fn resolve(&mut self, element: &Element) -> bool {
        if self.index.is_base(element) {
            return true;
        }
        match self.states.get(element) {
            Some(NodeState::Resolved) => return true,
            Some(NodeState::InProgress) | Some(NodeState::Unresolvable) => return false,
            None => {}
        }
        self.states.insert(element.clone(), NodeState::InProgress);

        let index = self.index;
        let existing = self
            .recipe
            .get(element)
            .filter(|pair| index.is_tier_valid(element, pair))
            .cloned();
        let mut candidates: Vec<Pair> = existing.iter().cloned().collect();
        candidates.extend(
            index
                .valid_producers(element)
                .filter(|pair| existing.as_ref() != Some(*pair))
                .cloned(),
        );

        for pair in candidates {
            if self.resolve(&pair.first) && self.resolve(&pair.second) {
                self.recipe.insert(element.clone(), pair);
                self.states.insert(element.clone(), NodeState::Resolved);
                return true;
            }
        }

        trace!(element = %element, "no producing pair resolves");
        self.recipe.remove(element);
        self.states.insert(element.clone(), NodeState::Unresolvable);
        false
    }

    /// Every non-base element this resolver has looked at.
    pub(crate) fn visited(&self) -> impl Iterator<Item = &Element> {
        self.states.keys()
    }

    pub(crate) fn into_recipe(self) -> Recipe {
        self.recipe
    }
}

/// Forward expansion state shared by the breadth-first and bidirectional
/// finders. `seen` keeps discovery order so partner iteration is stable.
struct ForwardFrontier<'a> {
    index: &'a CombinationIndex,
    order: Vec<Element>,
    seen: FxHashSet<Element>,
    queue: VecDeque<Element>,
    recipe: Recipe,
}

impl<'a> ForwardFrontier<'a> {
    fn seeded(index: &'a CombinationIndex) -> Self {
        let mut frontier = Self {
            index,
            order: Vec::new(),
            seen: FxHashSet::default(),
            queue: VecDeque::new(),
            recipe: Recipe::new(),
        };
        for base in index.base_elements() {
            frontier.discover(base.clone());
        }
        frontier
    }

    fn discover(&mut self, element: Element) {
        if self.seen.insert(element.clone()) {
            self.order.push(element.clone());
            self.queue.push_back(element);
        }
    }

    fn knows(&self, element: &str) -> bool {
        self.seen.contains(element)
    }

    /// Combine `current` with every element seen so far and record each new,
    /// tier-valid product. The first producing pair found for a product wins.
    /// Returns the products discovered by this call, in discovery order.
    fn expand(&mut self, current: &Element) -> Vec<Element> {
        let known = self.order.len();
        let mut discovered = Vec::new();
        for i in 0..known {
            let pair = Pair::new(current.clone(), self.order[i].clone());
            let index = self.index;
            for product in index.lookup(&pair) {
                if self.seen.contains(product) || !index.is_tier_valid(product, &pair) {
                    continue;
                }
                self.recipe.insert(product.clone(), pair.clone());
                self.discover(product.clone());
                discovered.push(product.clone());
            }
        }
        discovered
    }
}

/// Backward breadth-first expansion from the target over tier-valid pairs.
/// Base elements are never recorded as seen.
struct BackwardFrontier<'a> {
    index: &'a CombinationIndex,
    seen: FxHashSet<Element>,
    queue: VecDeque<Element>,
    first_pair: FxHashMap<Element, Pair>,
}

impl<'a> BackwardFrontier<'a> {
    fn from_target(index: &'a CombinationIndex, target: &Element) -> Self {
        let mut seen = FxHashSet::default();
        seen.insert(target.clone());
        Self {
            index,
            seen,
            queue: VecDeque::from([target.clone()]),
            first_pair: FxHashMap::default(),
        }
    }

    fn knows(&self, element: &str) -> bool {
        self.seen.contains(element)
    }

    /// Returns the ingredients seen for the first time, in discovery order.
    fn expand(&mut self, current: &Element) -> Vec<Element> {
        let index = self.index;
        let mut discovered = Vec::new();
        for pair in index.valid_producers(current) {
            self.first_pair
                .entry(current.clone())
                .or_insert_with(|| pair.clone());
            for ingredient in pair.ingredients() {
                if !index.is_base(ingredient) && self.seen.insert(ingredient.clone()) {
                    self.queue.push_back(ingredient.clone());
                    discovered.push(ingredient.clone());
                }
            }
        }
        discovered
    }
}

/// Both frontiers at the moment they first share an element.
struct Meeting<'a> {
    element: Element,
    forward: ForwardFrontier<'a>,
    backward: BackwardFrontier<'a>,
}

/// The three interchangeable single-recipe algorithms over one index.
#[derive(Debug, Clone, Copy)]
pub struct ShortestPathFinder<'a> {
    index: &'a CombinationIndex,
}

impl<'a> ShortestPathFinder<'a> {
    pub fn new(index: &'a CombinationIndex) -> Self {
        Self { index }
    }

    /// Run the finder associated with `algorithm`.
    pub fn find(&self, target: &str, algorithm: Algorithm) -> Option<Recipe> {
        match algorithm {
            Algorithm::Bfs => self.forward_bfs(target),
            Algorithm::Dfs => self.backward_dfs(target),
            Algorithm::BiBfs => self.bidirectional(target),
        }
    }

    /// Breadth-first expansion from the base elements. Minimal in the number
    /// of combination rounds; the first pair discovered for a product is kept.
    pub fn forward_bfs(&self, target: &str) -> Option<Recipe> {
        let target = self.index.resolve(target)?;
        if self.index.is_base(&target) {
            return Some(Recipe::new());
        }

        let mut frontier = ForwardFrontier::seeded(self.index);
        while let Some(current) = frontier.queue.pop_front() {
            if current == target {
                return Some(frontier.recipe.pruned(&target, self.index));
            }
            frontier.expand(&current);
        }
        None
    }

    /// Depth-first resolution from the target through the reverse index,
    /// trying producing pairs in catalog order and backtracking on failure.
    pub fn backward_dfs(&self, target: &str) -> Option<Recipe> {
        let target = self.index.resolve(target)?;
        if self.index.is_base(&target) {
            return Some(Recipe::new());
        }

        let mut resolver = BackwardResolver::new(self.index, Recipe::new());
        if resolver.resolve(&target) {
            Some(resolver.into_recipe().pruned(&target, self.index))
        } else {
            None
        }
    }

    /// Forward and backward breadth-first frontiers advanced in lockstep until
    /// they meet, then joined at the meeting point.
    pub fn bidirectional(&self, target: &str) -> Option<Recipe> {
        let target = self.index.resolve(target)?;
        if self.index.is_base(&target) {
            return Some(Recipe::new());
        }

        let meeting = self.meet(&target)?;
        trace!(target = %target, meeting = %meeting.element, "frontiers met");

        if meeting.element == target {
            return Some(meeting.forward.recipe.pruned(&target, self.index));
        }
        self.stitch(&target, &meeting.forward, &meeting.backward)
    }

    /// Advance both frontiers until one of them discovers an element the
    /// other has already seen. The target starts in the backward set, so a
    /// forward discovery of the target is a meeting too. `None` once both
    /// queues run dry.
    fn meet(&self, target: &Element) -> Option<Meeting<'a>> {
        let mut forward = ForwardFrontier::seeded(self.index);
        let mut backward = BackwardFrontier::from_target(self.index, target);

        loop {
            if forward.queue.is_empty() && backward.queue.is_empty() {
                return None;
            }
            if let Some(current) = forward.queue.pop_front() {
                let discovered = forward.expand(&current);
                if let Some(element) = discovered.into_iter().find(|e| backward.knows(e)) {
                    return Some(Meeting {
                        element,
                        forward,
                        backward,
                    });
                }
            }
            if let Some(current) = backward.queue.pop_front() {
                let discovered = backward.expand(&current);
                if let Some(element) = discovered.into_iter().find(|e| forward.knows(e)) {
                    return Some(Meeting {
                        element,
                        forward,
                        backward,
                    });
                }
            }
        }
    }

    /// Join the forward recipes with the backward-recorded pairs above the
    /// meeting point, filling anything the backward walk skipped locally.
    fn stitch(
        &self,
        target: &Element,
        forward: &ForwardFrontier<'_>,
        backward: &BackwardFrontier<'_>,
    ) -> Option<Recipe> {
        let mut recipe = forward.recipe.clone();
        let mut stack = vec![target.clone()];
        let mut walked: FxHashSet<Element> = FxHashSet::default();
        while let Some(current) = stack.pop() {
            if self.index.is_base(&current)
                || forward.knows(&current)
                || !walked.insert(current.clone())
            {
                continue;
            }
            if let Some(pair) = backward.first_pair.get(&current) {
                recipe.insert(current.clone(), pair.clone());
                stack.push(pair.second.clone());
                stack.push(pair.first.clone());
            }
        }

        let mut resolver = BackwardResolver::new(self.index, recipe);
        if resolver.resolve(target) {
            return Some(resolver.into_recipe().pruned(target, self.index));
        }
        self.backward_dfs(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{fixture_index, mud_index};
    use recipegraph_core::element;

    const ALGORITHMS: [Algorithm; 3] = [Algorithm::Bfs, Algorithm::Dfs, Algorithm::BiBfs];

    #[test]
    fn steam_from_fire_and_water() {
        let index = mud_index();
        let finder = ShortestPathFinder::new(&index);
        for algorithm in ALGORITHMS {
            let recipe = finder.find("Steam", algorithm).unwrap();
            assert_eq!(recipe.len(), 1, "{algorithm}");
            assert_eq!(recipe.get("Steam"), Some(&Pair::new("Fire", "Water")));
        }
    }

    #[test]
    fn mud_needs_steam_first() {
        let index = mud_index();
        let finder = ShortestPathFinder::new(&index);
        for algorithm in ALGORITHMS {
            let recipe = finder.find("Mud", algorithm).unwrap();
            assert_eq!(recipe.len(), 2, "{algorithm}");
            assert_eq!(recipe.get("Mud"), Some(&Pair::new("Steam", "Earth")));
            assert_eq!(recipe.get("Steam"), Some(&Pair::new("Fire", "Water")));
        }
    }

    #[test]
    fn base_target_has_empty_recipe() {
        let index = mud_index();
        let finder = ShortestPathFinder::new(&index);
        for algorithm in ALGORITHMS {
            assert_eq!(finder.find("Fire", algorithm), Some(Recipe::new()));
        }
    }

    #[test]
    fn unreachable_and_unknown_targets() {
        let index = fixture_index();
        let finder = ShortestPathFinder::new(&index);
        for algorithm in ALGORITHMS {
            assert!(finder.find("Ghost", algorithm).is_none(), "{algorithm}");
            // only producing pair is tier-inconsistent
            assert!(finder.find("Rain", algorithm).is_none(), "{algorithm}");
            assert!(finder.find("Nothing", algorithm).is_none(), "{algorithm}");
        }
    }

    #[test]
    fn every_result_is_complete_and_tier_consistent() {
        let index = fixture_index();
        let finder = ShortestPathFinder::new(&index);
        for name in ["Steam", "Mud", "Stone", "Cloud", "Brick"] {
            let target = element(name);
            for algorithm in ALGORITHMS {
                let recipe = finder.find(name, algorithm).unwrap();
                assert!(recipe.is_complete(&target, &index), "{name} {algorithm}");
                for (product, pair) in recipe.iter() {
                    assert!(!index.is_base(product));
                    assert!(index.tier_of(product) > index.tier_of(&pair.first));
                    assert!(index.tier_of(product) > index.tier_of(&pair.second));
                }
                assert_eq!(recipe.pruned(&target, &index), recipe);
            }
        }
    }

    #[test]
    fn repeated_runs_agree() {
        let index = fixture_index();
        let finder = ShortestPathFinder::new(&index);
        for algorithm in ALGORITHMS {
            assert_eq!(finder.find("Brick", algorithm), finder.find("Brick", algorithm));
        }
    }

    #[test]
    fn forward_bfs_keeps_first_discovered_pair() {
        let index = fixture_index();
        let recipe = ShortestPathFinder::new(&index).forward_bfs("Mud").unwrap();
        // Water is dequeued after Air has already produced Dust.
        assert_eq!(recipe.get("Mud"), Some(&Pair::new("Dust", "Water")));
        assert_eq!(recipe.get("Dust"), Some(&Pair::new("Air", "Earth")));
    }

    #[test]
    fn backward_dfs_follows_catalog_order() {
        let index = fixture_index();
        let recipe = ShortestPathFinder::new(&index).backward_dfs("Mud").unwrap();
        assert_eq!(recipe.get("Mud"), Some(&Pair::new("Steam", "Earth")));
    }

    #[test]
    fn frontiers_meet_when_an_element_is_first_discovered() {
        let index = mud_index();
        let finder = ShortestPathFinder::new(&index);
        let meeting = finder.meet(&element("Mud")).unwrap();
        // Fire + Water discovers Steam, which the backward side reached from Mud.
        assert_eq!(meeting.element, element("Steam"));
        assert!(meeting.forward.queue.contains(&element("Steam")));
        assert!(meeting.forward.queue.contains(&element("Water")));
        assert_eq!(meeting.forward.recipe.get("Steam"), Some(&Pair::new("Fire", "Water")));
        assert_eq!(
            finder.bidirectional("Mud").unwrap().get("Mud"),
            Some(&Pair::new("Steam", "Earth"))
        );
    }

    #[test]
    fn forward_discovery_of_the_target_is_a_meeting() {
        let index = mud_index();
        let meeting = ShortestPathFinder::new(&index).meet(&element("Steam")).unwrap();
        assert_eq!(meeting.element, element("Steam"));
        assert!(meeting.forward.knows("Steam"));
    }

    #[test]
    fn unreachable_target_never_meets() {
        let index = fixture_index();
        assert!(ShortestPathFinder::new(&index).meet(&element("Ghost")).is_none());
    }

    #[test]
    fn resolver_keeps_valid_entries_and_fills_gaps() {
        let index = fixture_index();
        let mut recipe = Recipe::new();
        recipe.insert(element("Mud"), Pair::new("Dust", "Water"));
        let mut resolver = BackwardResolver::new(&index, recipe);
        assert!(resolver.resolve(&element("Mud")));
        let recipe = resolver.into_recipe();
        assert_eq!(recipe.get("Mud"), Some(&Pair::new("Dust", "Water")));
        assert_eq!(recipe.get("Dust"), Some(&Pair::new("Earth", "Air")));
    }

    #[test]
    fn resolver_replaces_entries_that_cannot_resolve() {
        let index = fixture_index();
        let mut recipe = Recipe::new();
        recipe.insert(element("Mud"), Pair::new("Cloud", "Earth"));
        let mut resolver = BackwardResolver::new(&index, recipe);
        assert!(resolver.resolve(&element("Mud")));
        let recipe = resolver.into_recipe();
        assert_eq!(recipe.get("Mud"), Some(&Pair::new("Steam", "Earth")));
    }
}
