//! Immutable combination lookup structure shared by every search.
//!
//! The index is built once by the data provider and only ever read
//! afterwards, so searches on several threads hold plain `&CombinationIndex`
//! references without any locking.

use crate::{element, Element, Pair, RecipeGraphError, Result, Tier};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct CombinationIndex {
    forward: FxHashMap<Pair, Vec<Element>>,
    reverse: FxHashMap<Element, Vec<Pair>>,
    tiers: FxHashMap<Element, Tier>,
    base: Vec<Element>,
    base_set: FxHashSet<Element>,
}

impl CombinationIndex {
    pub fn builder() -> CombinationIndexBuilder {
        CombinationIndexBuilder::default()
    }

    /// Products of combining the two elements of `pair`, in insertion order.
    pub fn lookup(&self, pair: &Pair) -> &[Element] {
        self.forward.get(pair).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every pair that produces `element`, in catalog order.
    pub fn producers_of(&self, element: &str) -> &[Pair] {
        self.reverse.get(element).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Tier of `element`; unknown and base elements report 0.
    pub fn tier_of(&self, element: &str) -> Tier {
        self.tiers.get(element).copied().unwrap_or(0)
    }

    pub fn is_base(&self, element: &str) -> bool {
        self.base_set.contains(element)
    }

    /// Base elements in seeding order.
    pub fn base_elements(&self) -> &[Element] {
        &self.base
    }

    /// Whether both ingredients of `pair` sit strictly below `product`.
    pub fn is_tier_valid(&self, product: &str, pair: &Pair) -> bool {
        let tier = self.tier_of(product);
        self.tier_of(&pair.first) < tier && self.tier_of(&pair.second) < tier
    }

    /// Producing pairs of `element` that respect the tier ordering.
    ///
    /// Pairs whose ingredients are not strictly lower-tier are dropped here
    /// rather than reported; a catalog with inconsistent tiers can therefore
    /// make an element unreachable.
    pub fn valid_producers<'a>(&'a self, element: &'a str) -> impl Iterator<Item = &'a Pair> + 'a {
        self.producers_of(element)
            .iter()
            .filter(move |pair| self.is_tier_valid(element, pair))
    }

    /// Number of tier-valid producing pairs; more than one makes a branch point.
    pub fn valid_producer_count(&self, element: &str) -> usize {
        self.valid_producers(element).count()
    }

    /// The index's own handle for `name`, if the element is known at all.
    pub fn resolve(&self, name: &str) -> Option<Element> {
        self.tiers
            .get_key_value(name)
            .map(|(key, _)| key.clone())
            .or_else(|| self.reverse.get_key_value(name).map(|(key, _)| key.clone()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    pub fn element_count(&self) -> usize {
        self.tiers.len()
    }

    pub fn combination_count(&self) -> usize {
        self.reverse.values().map(Vec::len).sum()
    }
}

/// Collects tiers and combinations before freezing them into a [`CombinationIndex`].
#[derive(Debug, Default)]
pub struct CombinationIndexBuilder {
    base: Vec<Element>,
    tiers: Vec<(Element, Tier)>,
    combinations: Vec<(Pair, Element)>,
}

impl CombinationIndexBuilder {
    pub fn base_elements<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.base = names.into_iter().map(|n| element(n.as_ref())).collect();
        self
    }

    pub fn tier(mut self, name: &str, tier: Tier) -> Self {
        self.tiers.push((element(name), tier));
        self
    }

    pub fn combination(mut self, first: &str, second: &str, product: &str) -> Self {
        self.combinations
            .push((Pair::new(first, second), element(product)));
        self
    }

    pub fn add_tier(&mut self, name: Element, tier: Tier) {
        self.tiers.push((name, tier));
    }

    pub fn add_combination(&mut self, pair: Pair, product: Element) {
        self.combinations.push((pair, product));
    }

    /// Freeze the collected data.
    ///
    /// Fails only on structurally broken input: no base elements, an empty
    /// element name, or a base element given a non-zero tier.
    pub fn build(self) -> Result<CombinationIndex> {
        if self.base.is_empty() {
            return Err(RecipeGraphError::MalformedIndex(
                "at least one base element is required".to_string(),
            ));
        }

        let mut base = Vec::with_capacity(self.base.len());
        let mut base_set = FxHashSet::default();
        for name in self.base {
            if name.is_empty() {
                return Err(RecipeGraphError::MalformedIndex(
                    "base element with empty name".to_string(),
                ));
            }
            if base_set.insert(name.clone()) {
                base.push(name);
            }
        }

        let mut tiers: FxHashMap<Element, Tier> = FxHashMap::default();
        for name in &base {
            tiers.insert(name.clone(), 0);
        }
        for (name, tier) in self.tiers {
            if name.is_empty() {
                return Err(RecipeGraphError::MalformedIndex(
                    "tier entry with empty element name".to_string(),
                ));
            }
            if base_set.contains(&name) {
                if tier != 0 {
                    return Err(RecipeGraphError::MalformedIndex(format!(
                        "base element {} has tier {}, expected 0",
                        name, tier
                    )));
                }
                continue;
            }
            tiers.insert(name, tier);
        }

        let mut forward: FxHashMap<Pair, Vec<Element>> = FxHashMap::default();
        let mut reverse: FxHashMap<Element, Vec<Pair>> = FxHashMap::default();
        let mut inconsistent = 0usize;

        for (pair, product) in self.combinations {
            if pair.first.is_empty() || pair.second.is_empty() || product.is_empty() {
                return Err(RecipeGraphError::MalformedIndex(format!(
                    "combination {} -> {} names an empty element",
                    pair, product
                )));
            }

            let products = forward.entry(pair.clone()).or_default();
            if !products.contains(&product) {
                products.push(product.clone());
            }

            let producers = reverse.entry(product.clone()).or_default();
            if !producers.contains(&pair) {
                producers.push(pair);
            }
        }

        let index = CombinationIndex {
            forward,
            reverse,
            tiers,
            base,
            base_set,
        };

        for (product, pairs) in &index.reverse {
            inconsistent += pairs
                .iter()
                .filter(|pair| !index.is_tier_valid(product, pair))
                .count();
        }

        debug!(
            elements = index.element_count(),
            combinations = index.combination_count(),
            tier_inconsistent = inconsistent,
            "combination index built"
        );

        Ok(index)
    }
}
