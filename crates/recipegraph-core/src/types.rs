use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Opaque element identifier. Cheap to clone; recipes copy these around a lot.
pub type Element = Arc<str>;

/// Combination depth of an element. Base elements sit at tier 0.
pub type Tier = u32;

/// Base set used when the configuration does not name one.
pub const DEFAULT_BASE_ELEMENTS: [&str; 4] = ["Air", "Earth", "Fire", "Water"];

pub fn element(name: &str) -> Element {
    Arc::from(name)
}

/// An unordered combination of two elements.
///
/// The stored orientation is kept so recipes can be rendered the way the
/// catalog lists them, but equality and hashing ignore it: `Pair(A, B)` and
/// `Pair(B, A)` are the same key.
#[derive(Debug, Clone)]
pub struct Pair {
    pub first: Element,
    pub second: Element,
}

impl Pair {
    pub fn new(first: impl Into<Element>, second: impl Into<Element>) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
        }
    }

    /// Ingredients in lexicographic order.
    pub fn ordered(&self) -> (&str, &str) {
        if self.first <= self.second {
            (&*self.first, &*self.second)
        } else {
            (&*self.second, &*self.first)
        }
    }

    pub fn contains(&self, element: &str) -> bool {
        &*self.first == element || &*self.second == element
    }

    pub fn ingredients(&self) -> [&Element; 2] {
        [&self.first, &self.second]
    }
}

impl PartialEq for Pair {
    fn eq(&self, other: &Self) -> bool {
        self.ordered() == other.ordered()
    }
}

impl Eq for Pair {}

impl Hash for Pair {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.ordered().hash(state);
    }
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}", self.first, self.second)
    }
}

impl From<(&str, &str)> for Pair {
    fn from((first, second): (&str, &str)) -> Self {
        Pair::new(first, second)
    }
}
