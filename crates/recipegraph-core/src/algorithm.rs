use crate::RecipeGraphError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which search strategy a request asks for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    #[default]
    #[serde(rename = "BFS")]
    Bfs,
    #[serde(rename = "DFS")]
    Dfs,
    #[serde(rename = "Bi-BFS")]
    BiBfs,
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Algorithm::Bfs => "BFS",
            Algorithm::Dfs => "DFS",
            Algorithm::BiBfs => "Bi-BFS",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Algorithm {
    type Err = RecipeGraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bfs" => Ok(Algorithm::Bfs),
            "dfs" => Ok(Algorithm::Dfs),
            "bi-bfs" | "bibfs" | "bidirectional" => Ok(Algorithm::BiBfs),
            other => Err(RecipeGraphError::UnsupportedAlgorithm(other.to_string())),
        }
    }
}
