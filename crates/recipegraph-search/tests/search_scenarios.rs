use recipegraph_core::{
    element, Algorithm, CombinationIndex, Pair, RecipeGraphConfig, DEFAULT_BASE_ELEMENTS,
};
use recipegraph_search::{
    RecipeTree, RecipeTreeBuilder, SearchContext, SearchRequest, SearchSettings,
    ShortestPathFinder,
};
use std::collections::HashSet;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

const ALGORITHMS: [Algorithm; 3] = [Algorithm::Bfs, Algorithm::Dfs, Algorithm::BiBfs];

fn steam_only() -> CombinationIndex {
    CombinationIndex::builder()
        .base_elements(DEFAULT_BASE_ELEMENTS)
        .tier("Steam", 1)
        .combination("Fire", "Water", "Steam")
        .build()
        .unwrap()
}

fn steam_and_mud() -> CombinationIndex {
    CombinationIndex::builder()
        .base_elements(DEFAULT_BASE_ELEMENTS)
        .tier("Steam", 1)
        .tier("Mud", 2)
        .combination("Fire", "Water", "Steam")
        .combination("Steam", "Earth", "Mud")
        .build()
        .unwrap()
}

fn context(index: CombinationIndex) -> SearchContext {
    SearchContext::new(Arc::new(index), SearchSettings::default())
}

#[test]
fn test_steam_from_base_elements() {
    let index = steam_only();
    let recipe = ShortestPathFinder::new(&index).forward_bfs("Steam").unwrap();
    assert_eq!(recipe.len(), 1);
    assert_eq!(recipe.get("Steam"), Some(&Pair::new("Fire", "Water")));
}

#[test]
fn test_mud_recipe_and_visit_count() {
    let index = steam_and_mud();
    let recipe = ShortestPathFinder::new(&index).forward_bfs("Mud").unwrap();
    assert_eq!(recipe.len(), 2);
    assert_eq!(recipe.get("Mud"), Some(&Pair::new("Steam", "Earth")));
    assert_eq!(recipe.get("Steam"), Some(&Pair::new("Fire", "Water")));

    let ctx = context(steam_and_mud());
    for algorithm in ALGORITHMS {
        let report = ctx.search(&SearchRequest::new("Mud", algorithm, 1)).unwrap();
        assert_eq!(report.recipes.len(), 1);
        assert_eq!(report.node_visited, 6, "{algorithm}");
    }
}

#[test]
fn test_base_target_is_single_node() {
    let ctx = context(steam_and_mud());
    for algorithm in ALGORITHMS {
        let report = ctx.search(&SearchRequest::new("Fire", algorithm, 1)).unwrap();
        assert_eq!(report.recipes, vec![RecipeTree::leaf("Fire")]);
        assert_eq!(report.node_visited, 4);
    }
}

#[test]
fn test_two_producers_give_two_recipes() {
    let index = CombinationIndex::builder()
        .base_elements(["A", "B", "C", "D"])
        .tier("X", 1)
        .combination("A", "B", "X")
        .combination("C", "D", "X")
        .build()
        .unwrap();
    let target = element("X");
    let ctx = context(index.clone());

    for algorithm in ALGORITHMS {
        for workers in [1, 4] {
            let request = SearchRequest::new("X", algorithm, 2).with_workers(workers);
            let result = ctx.find_recipes(&request).unwrap();
            assert_eq!(result.recipes.len(), 2, "{algorithm} x{workers}");
            let signatures: HashSet<_> = result
                .recipes
                .iter()
                .map(|r| r.signature(&target, &index))
                .collect();
            assert_eq!(signatures.len(), 2);
        }
    }
}

#[test]
fn test_unreachable_target_returns_nothing() {
    let index = CombinationIndex::builder()
        .base_elements(DEFAULT_BASE_ELEMENTS)
        .tier("Golem", 3)
        .combination("Clay", "Life", "Golem")
        .build()
        .unwrap();
    let ctx = context(index);
    for algorithm in ALGORITHMS {
        let report = ctx.search(&SearchRequest::new("Golem", algorithm, 0)).unwrap();
        assert!(report.recipes.is_empty());
    }
}

#[test]
fn test_unbounded_search_never_stops_early() {
    // Three independent branch points, two choices each.
    let index = CombinationIndex::builder()
        .base_elements(DEFAULT_BASE_ELEMENTS)
        .tier("P", 1)
        .tier("Q", 1)
        .tier("R", 1)
        .tier("Top", 2)
        .tier("Mid", 3)
        .combination("Air", "Earth", "P")
        .combination("Fire", "Water", "P")
        .combination("Air", "Fire", "Q")
        .combination("Earth", "Water", "Q")
        .combination("Air", "Water", "R")
        .combination("Earth", "Fire", "R")
        .combination("P", "Q", "Top")
        .combination("Top", "R", "Mid")
        .build()
        .unwrap();
    let target = element("Mid");
    let ctx = context(index.clone());

    for algorithm in ALGORITHMS {
        for workers in [1, 2, 6] {
            let request = SearchRequest::new("Mid", algorithm, 0).with_workers(workers);
            let result = ctx.find_recipes(&request).unwrap();
            assert_eq!(result.recipes.len(), 8, "{algorithm} x{workers}");
            for recipe in &result.recipes {
                assert!(recipe.is_complete(&target, &index));
                for (product, pair) in recipe.iter() {
                    assert!(index.tier_of(product) > index.tier_of(&pair.first));
                    assert!(index.tier_of(product) > index.tier_of(&pair.second));
                }
            }
        }
    }
}

#[test]
fn test_first_recipe_is_deterministic() {
    let index = steam_and_mud();
    let finder = ShortestPathFinder::new(&index);
    for algorithm in ALGORITHMS {
        let runs: Vec<_> = (0..5).map(|_| finder.find("Mud", algorithm)).collect();
        assert!(runs.windows(2).all(|w| w[0] == w[1]));
    }
}

#[test]
fn test_trees_rebuild_identically() {
    let index = steam_and_mud();
    let recipe = ShortestPathFinder::new(&index).backward_dfs("Mud").unwrap();
    let builder = RecipeTreeBuilder::new();
    let tree = builder.build_tree("Mud", &recipe);
    assert_eq!(tree, builder.build_tree("Mud", &recipe));
    assert_eq!(tree.node_count(), 5);
}

#[test]
fn test_context_from_catalog_file() {
    let temp_dir = TempDir::new().unwrap();
    let catalog_path = temp_dir.path().join("recipes.json");
    fs::write(
        &catalog_path,
        r#"[
            {"Result": "Steam", "Tier": 1, "Combinations": [{"First": "Fire", "Second": "Water"}]},
            {"Result": "Mud", "Tier": 2, "Combinations": [{"First": "Steam", "Second": "Earth"}]}
        ]"#,
    )
    .unwrap();

    let mut config = RecipeGraphConfig::default();
    config.data.recipes_path = catalog_path;
    config.search.workers = 2;
    let ctx = SearchContext::from_config(&config).unwrap();
    assert_eq!(ctx.settings().workers, 2);

    let report = ctx.search(&SearchRequest::new("Mud", Algorithm::BiBfs, 1)).unwrap();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["recipes"][0]["name"], "Mud");
    assert_eq!(json["node_visited"], 6);
}
