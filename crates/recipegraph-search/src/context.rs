//! Request-level entry point: one immutable [`SearchContext`] built at
//! startup and shared by every search.

use crate::coordinator::{ParallelCoordinator, DEFAULT_BATCH_SIZE, DEFAULT_IDLE_CHECK_INTERVAL};
use crate::shortest::ShortestPathFinder;
use crate::tree::{RecipeTree, RecipeTreeBuilder};
use crate::variation::{MultiRecipeResult, VariationExplorer};
use recipegraph_core::{
    Algorithm, CombinationIndex, Recipe, RecipeCatalog, RecipeGraphConfig, RecipeGraphError,
    Result, SearchConfig,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Pool tuning applied to every search of a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchSettings {
    /// Default worker count; 0 means one per CPU.
    pub workers: usize,
    pub batch_size: usize,
    pub idle_check_interval: Duration,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            workers: 0,
            batch_size: DEFAULT_BATCH_SIZE,
            idle_check_interval: DEFAULT_IDLE_CHECK_INTERVAL,
        }
    }
}

impl From<&SearchConfig> for SearchSettings {
    fn from(config: &SearchConfig) -> Self {
        Self {
            workers: config.workers,
            batch_size: config.batch_size,
            idle_check_interval: Duration::from_millis(config.idle_check_interval_ms),
        }
    }
}

fn default_max_recipes() -> i64 {
    1
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub target: String,
    /// Zero or negative: no limit.
    #[serde(default = "default_max_recipes")]
    pub max_recipes: i64,
    #[serde(default)]
    pub algorithm: Algorithm,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,
    /// Accepted for compatibility with existing clients; not interpreted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_mode: Option<String>,
}

impl SearchRequest {
    pub fn new(target: impl Into<String>, algorithm: Algorithm, max_recipes: i64) -> Self {
        Self {
            target: target.into(),
            max_recipes,
            algorithm,
            workers: None,
            search_mode: None,
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }
}

/// Response body: the recipe forest plus timing and visit metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchReport {
    pub recipes: Vec<RecipeTree>,
    pub timetaken: String,
    pub node_visited: usize,
}

impl SearchReport {
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[derive(Debug, Clone)]
pub struct SearchContext {
    index: Arc<CombinationIndex>,
    settings: SearchSettings,
}

impl SearchContext {
    pub fn new(index: Arc<CombinationIndex>, settings: SearchSettings) -> Self {
        Self { index, settings }
    }

    /// Load the catalog named by `config` and build a context around it.
    pub fn from_config(config: &RecipeGraphConfig) -> Result<Self> {
        Self::from_catalog_file(&config.data.recipes_path, config)
    }

    pub fn from_catalog_file(path: impl AsRef<Path>, config: &RecipeGraphConfig) -> Result<Self> {
        let index = RecipeCatalog::from_file(path)?.into_index(&config.data.base_elements)?;
        Ok(Self::new(Arc::new(index), SearchSettings::from(&config.search)))
    }

    pub fn index(&self) -> &CombinationIndex {
        &self.index
    }

    pub fn settings(&self) -> SearchSettings {
        self.settings
    }

    pub fn shortest(&self, target: &str, algorithm: Algorithm) -> Option<Recipe> {
        ShortestPathFinder::new(&self.index).find(target, algorithm)
    }

    /// Run the shortest-path finder, then explore variations up to the
    /// requested count. An unreachable target yields an empty result.
    pub fn find_recipes(&self, request: &SearchRequest) -> Result<MultiRecipeResult> {
        let target_name = request.target.trim();
        if target_name.is_empty() {
            return Err(RecipeGraphError::InvalidRequest(
                "target element must not be empty".to_string(),
            ));
        }
        if let Some(mode) = &request.search_mode {
            debug!(search_mode = %mode, "search mode is not interpreted");
        }

        let unreachable = MultiRecipeResult {
            nodes_visited: self.index.base_elements().len(),
            ..MultiRecipeResult::default()
        };
        let Some(target) = self.index.resolve(target_name) else {
            info!(target = target_name, "unknown target element");
            return Ok(unreachable);
        };
        let Some(first) = self.shortest(target_name, request.algorithm) else {
            info!(target = target_name, algorithm = %request.algorithm, "target is unreachable");
            return Ok(unreachable);
        };

        let workers = request.workers.unwrap_or(self.settings.workers);
        let explorer = VariationExplorer::new(&self.index, target, request.algorithm);
        if workers == 1 {
            return Ok(explorer.explore(first, request.max_recipes));
        }
        let coordinator = ParallelCoordinator::new(explorer, workers)
            .with_batch_size(self.settings.batch_size)
            .with_idle_check_interval(self.settings.idle_check_interval);
        Ok(coordinator.run(first, request.max_recipes))
    }

    /// Full request: search, build one tree per recipe, time the whole thing.
    pub fn search(&self, request: &SearchRequest) -> Result<SearchReport> {
        let started = Instant::now();
        info!(
            target = %request.target,
            algorithm = %request.algorithm,
            max_recipes = request.max_recipes,
            workers = ?request.workers,
            "search started"
        );

        let result = self.find_recipes(request)?;
        let (recipes, node_visited) =
            RecipeTreeBuilder::new().build_multiple_trees(request.target.trim(), &result);

        let elapsed = started.elapsed();
        info!(
            target = %request.target,
            recipes = recipes.len(),
            node_visited,
            elapsed_ms = elapsed.as_millis() as u64,
            "search finished"
        );
        Ok(SearchReport {
            recipes,
            timetaken: format!("{:?}", elapsed),
            node_visited,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{fixture_index, mud_index};

    fn context(index: CombinationIndex) -> SearchContext {
        SearchContext::new(Arc::new(index), SearchSettings::default())
    }

    #[test]
    fn report_shape_matches_response_contract() {
        let ctx = context(mud_index());
        let report = ctx
            .search(&SearchRequest::new("Mud", Algorithm::Bfs, 1))
            .unwrap();
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["node_visited"], 6);
        assert!(json["timetaken"].is_string());
        assert_eq!(json["recipes"][0]["name"], "Mud");
        assert_eq!(json["recipes"][0]["children"][0]["name"], "Steam");
        assert!(json["recipes"][0]["children"][1].get("children").is_none());
    }

    #[test]
    fn base_target_report() {
        let ctx = context(mud_index());
        let report = ctx
            .search(&SearchRequest::new("Fire", Algorithm::Dfs, 3))
            .unwrap();
        assert_eq!(report.recipes, vec![RecipeTree::leaf("Fire")]);
        assert_eq!(report.node_visited, 4);
    }

    #[test]
    fn unreachable_target_is_empty_not_an_error() {
        let ctx = context(fixture_index());
        for name in ["Ghost", "Unknown"] {
            let report = ctx
                .search(&SearchRequest::new(name, Algorithm::BiBfs, 5))
                .unwrap();
            assert!(report.recipes.is_empty());
            assert_eq!(report.node_visited, 4);
        }
    }

    #[test]
    fn empty_target_is_rejected() {
        let ctx = context(mud_index());
        let result = ctx.search(&SearchRequest::new("  ", Algorithm::Bfs, 1));
        assert!(matches!(result, Err(RecipeGraphError::InvalidRequest(_))));
    }

    #[test]
    fn request_defaults_when_deserialized() {
        let request: SearchRequest =
            serde_json::from_str(r#"{"target":"Mud","search_mode":"fast"}"#).unwrap();
        assert_eq!(request.max_recipes, 1);
        assert_eq!(request.algorithm, Algorithm::Bfs);
        assert_eq!(request.workers, None);

        let request: SearchRequest =
            serde_json::from_str(r#"{"target":"Mud","algorithm":"Bi-BFS","max_recipes":0}"#)
                .unwrap();
        assert_eq!(request.algorithm, Algorithm::BiBfs);
    }

    #[test]
    fn sequential_and_parallel_agree_on_counts() {
        let ctx = context(fixture_index());
        for workers in [1, 4] {
            let request = SearchRequest::new("Brick", Algorithm::Dfs, 0).with_workers(workers);
            let result = ctx.find_recipes(&request).unwrap();
            assert_eq!(result.recipes.len(), 6, "x{workers}");
        }
    }

    #[test]
    fn report_holds_at_most_the_requested_trees() {
        let ctx = context(fixture_index());
        for algorithm in [Algorithm::Bfs, Algorithm::Dfs, Algorithm::BiBfs] {
            for workers in [1, 2, 8] {
                let request =
                    SearchRequest::new("Brick", algorithm, 4).with_workers(workers);
                let report = ctx.search(&request).unwrap();
                assert_eq!(report.recipes.len(), 4, "{algorithm} x{workers}");
                assert!(report.recipes.iter().all(|tree| tree.name == "Brick"));
            }
        }
    }
}
