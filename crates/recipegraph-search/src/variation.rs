//! Discovery of alternative recipes by substituting producing pairs at
//! branch points.

use crate::shortest::{BackwardResolver, ShortestPathFinder};
use recipegraph_concurrent::{Discipline, WorkQueue};
use recipegraph_core::{Algorithm, CombinationIndex, Element, Pair, Recipe, RecipeSet, Signature};
use rustc_hash::FxHashSet;
use std::sync::Arc;
use tracing::{debug, trace};

/// How ingredients introduced by a substitution get their own recipes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngredientResolution {
    /// Tier-filtered depth-first resolution through the reverse index.
    Backward,
    /// A bidirectional search scoped to the ingredient.
    Bidirectional,
}

impl From<Algorithm> for IngredientResolution {
    fn from(algorithm: Algorithm) -> Self {
        match algorithm {
            Algorithm::Bfs | Algorithm::Dfs => IngredientResolution::Backward,
            Algorithm::BiBfs => IngredientResolution::Bidirectional,
        }
    }
}

/// Work discipline used when exploring variations for `algorithm`.
pub fn discipline_for(algorithm: Algorithm) -> Discipline {
    match algorithm {
        Algorithm::Dfs => Discipline::Lifo,
        Algorithm::Bfs | Algorithm::BiBfs => Discipline::Fifo,
    }
}

/// One unit of exploration: try every alternative pair for `focus` in `recipe`.
#[derive(Debug, Clone)]
pub struct VariationTask {
    pub focus: Element,
    pub recipe: Arc<Recipe>,
}

/// A repaired variation together with its signature.
#[derive(Debug, Clone)]
pub struct Variation {
    pub recipe: Recipe,
    pub signature: Signature,
}

/// Recipes found for one target plus the number of distinct elements the
/// search touched along the way.
#[derive(Debug, Clone, Default)]
pub struct MultiRecipeResult {
    pub recipes: RecipeSet,
    pub nodes_visited: usize,
}

#[derive(Debug, Clone)]
pub struct VariationExplorer<'a> {
    index: &'a CombinationIndex,
    target: Element,
    resolution: IngredientResolution,
    discipline: Discipline,
}

impl<'a> VariationExplorer<'a> {
    pub fn new(index: &'a CombinationIndex, target: Element, algorithm: Algorithm) -> Self {
        Self {
            index,
            target,
            resolution: algorithm.into(),
            discipline: discipline_for(algorithm),
        }
    }

    pub fn index(&self) -> &'a CombinationIndex {
        self.index
    }

    pub fn target(&self) -> &Element {
        &self.target
    }

    pub fn discipline(&self) -> Discipline {
        self.discipline
    }

    /// Elements of `recipe` with more than one tier-valid producing pair,
    /// root first.
    pub fn branch_points(&self, recipe: &Recipe) -> Vec<Element> {
        recipe
            .reachable(&self.target, self.index)
            .into_iter()
            .filter(|element| self.index.valid_producer_count(element) > 1)
            .collect()
    }

    /// One task per branch point of `recipe`.
    pub fn tasks_for(&self, recipe: Arc<Recipe>) -> Vec<VariationTask> {
        self.branch_points(&recipe)
            .into_iter()
            .map(|focus| VariationTask {
                focus,
                recipe: recipe.clone(),
            })
            .collect()
    }

    /// Base elements plus every element of `recipe`.
    pub fn initial_visited(&self, recipe: &Recipe) -> FxHashSet<Element> {
        self.index
            .base_elements()
            .iter()
            .chain(recipe.elements())
            .cloned()
            .collect()
    }

    /// Every repaired variation of `task`, one per alternative pair that
    /// resolves. Elements touched while resolving are added to `visited`.
    pub fn expand(&self, task: &VariationTask, visited: &mut FxHashSet<Element>) -> Vec<Variation> {
        let current = task.recipe.get(&task.focus);
        let mut variations = Vec::new();
        let mut signatures = FxHashSet::default();

        for alternative in self.index.valid_producers(&task.focus) {
            if current == Some(alternative) {
                continue;
            }
            let Some(recipe) = self.substitute(&task.recipe, &task.focus, alternative, visited)
            else {
                trace!(focus = %task.focus, pair = %alternative, "variation discarded");
                continue;
            };
            let signature = recipe.signature(&self.target, self.index);
            if signatures.insert(signature.clone()) {
                variations.push(Variation { recipe, signature });
            }
        }
        variations
    }

    /// Replace the pair used for `focus`, resolve the ingredients it brings
    /// in, then repair the whole recipe from the target down.
    fn substitute(
        &self,
        base: &Recipe,
        focus: &Element,
        alternative: &Pair,
        visited: &mut FxHashSet<Element>,
    ) -> Option<Recipe> {
        let mut recipe = base.clone();
        recipe.insert(focus.clone(), alternative.clone());

        if self.resolution == IngredientResolution::Bidirectional {
            let finder = ShortestPathFinder::new(self.index);
            for ingredient in alternative.ingredients() {
                if self.index.is_base(ingredient) || recipe.contains(ingredient) {
                    continue;
                }
                let sub = finder.bidirectional(ingredient)?;
                visited.insert(ingredient.clone());
                visited.extend(sub.elements().cloned());
                recipe.merge_missing(&sub);
            }
        }

        let mut resolver = BackwardResolver::new(self.index, recipe);
        let repaired = alternative
            .ingredients()
            .into_iter()
            .all(|ingredient| resolver.resolve(ingredient))
            && resolver.resolve(&self.target);
        visited.extend(resolver.visited().cloned());
        if !repaired {
            return None;
        }

        let recipe = resolver.into_recipe().pruned(&self.target, self.index);
        (recipe.get(focus) == Some(alternative)).then_some(recipe)
    }

    /// Single-threaded exploration starting from `first`.
    ///
    /// Stops once `max_recipes` recipes are known (`max_recipes <= 0` means
    /// no limit) or no task is left. The outcome depends only on the index,
    /// the target and `first`.
    pub fn explore(&self, first: Recipe, max_recipes: i64) -> MultiRecipeResult {
        let limit = recipe_limit(max_recipes);
        let mut visited = self.initial_visited(&first);
        let mut recipes = RecipeSet::new();

        let first_signature = first.signature(&self.target, self.index);
        let first = Arc::new(first);
        recipes.insert((*first).clone(), first_signature);

        let queue = WorkQueue::new(self.discipline);
        if limit.map_or(true, |limit| recipes.len() < limit) {
            queue.push_all(self.tasks_for(first));
        }

        'tasks: while let Some(batch) = queue.pop_batch(1) {
            let mut follow_up = Vec::new();
            for task in batch {
                for variation in self.expand(&task, &mut visited) {
                    if recipes.contains_signature(&variation.signature) {
                        continue;
                    }
                    let recipe = Arc::new(variation.recipe);
                    recipes.insert((*recipe).clone(), variation.signature);
                    if limit.is_some_and(|limit| recipes.len() >= limit) {
                        break 'tasks;
                    }
                    follow_up.extend(self.tasks_for(recipe));
                }
            }
            queue.complete(follow_up);
        }

        debug!(
            target = %self.target,
            recipes = recipes.len(),
            nodes_visited = visited.len(),
            "sequential exploration finished"
        );
        MultiRecipeResult {
            recipes,
            nodes_visited: visited.len(),
        }
    }
}

/// `None` for an unbounded search.
pub(crate) fn recipe_limit(max_recipes: i64) -> Option<usize> {
    (max_recipes > 0).then(|| usize::try_from(max_recipes).unwrap_or(usize::MAX))
}
