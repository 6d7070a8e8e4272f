//! Recipe search engine
//!
//! - `shortest`: forward BFS, backward DFS and bidirectional single-recipe finders
//! - `variation`: alternative recipes by substitution at branch points
//! - `coordinator`: worker pool exploring variations under a recipe limit
//! - `tree`: recipe trees for presentation
//! - `context`: request/report types and the shared search context

pub mod context;
pub mod coordinator;
pub mod shortest;
pub mod tree;
pub mod variation;

#[cfg(test)]
mod test_support;

pub use context::{SearchContext, SearchReport, SearchRequest, SearchSettings};
pub use coordinator::ParallelCoordinator;
pub use shortest::ShortestPathFinder;
pub use tree::{RecipeTree, RecipeTreeBuilder};
pub use variation::{
    discipline_for, IngredientResolution, MultiRecipeResult, Variation, VariationExplorer,
    VariationTask,
};
