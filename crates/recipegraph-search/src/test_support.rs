use recipegraph_core::{CombinationIndex, DEFAULT_BASE_ELEMENTS};

/// Fire + Water = Steam, Steam + Earth = Mud.
pub(crate) fn mud_index() -> CombinationIndex {
    CombinationIndex::builder()
        .base_elements(DEFAULT_BASE_ELEMENTS)
        .tier("Steam", 1)
        .tier("Mud", 2)
        .combination("Fire", "Water", "Steam")
        .combination("Steam", "Earth", "Mud")
        .build()
        .unwrap()
}

/// Small catalog with branch points, an unreachable element and a
/// tier-inconsistent one. Brick can be built six distinct ways.
pub(crate) fn fixture_index() -> CombinationIndex {
    CombinationIndex::builder()
        .base_elements(DEFAULT_BASE_ELEMENTS)
        .tier("Steam", 1)
        .tier("Dust", 1)
        .tier("Lava", 1)
        .tier("Energy", 1)
        .tier("Mud", 2)
        .tier("Stone", 2)
        .tier("Cloud", 2)
        .tier("Rain", 2)
        .tier("Ghost", 2)
        .tier("Brick", 3)
        .combination("Fire", "Water", "Steam")
        .combination("Earth", "Air", "Dust")
        .combination("Earth", "Fire", "Lava")
        .combination("Fire", "Air", "Energy")
        .combination("Steam", "Earth", "Mud")
        .combination("Dust", "Water", "Mud")
        .combination("Lava", "Air", "Stone")
        .combination("Lava", "Water", "Stone")
        .combination("Steam", "Air", "Cloud")
        .combination("Cloud", "Water", "Rain")
        .combination("Phantom", "Air", "Ghost")
        .combination("Mud", "Fire", "Brick")
        .combination("Stone", "Mud", "Brick")
        .build()
        .unwrap()
}

/// Seeded layered catalog: each element of tier `t` gets `producers` random
/// pairs drawn from tiers below `t`. Returns the index and a top-tier element.
pub(crate) fn layered_index(
    tiers: u32,
    width: usize,
    producers: usize,
    seed: u64,
) -> (CombinationIndex, String) {
    let mut rng = fastrand::Rng::with_seed(seed);
    let mut builder = CombinationIndex::builder().base_elements(DEFAULT_BASE_ELEMENTS);
    let mut lower: Vec<String> = DEFAULT_BASE_ELEMENTS.iter().map(|s| s.to_string()).collect();
    let mut top = String::new();

    for tier in 1..=tiers {
        let mut current = Vec::with_capacity(width);
        for i in 0..width {
            let name = format!("t{}_{}", tier, i);
            builder = builder.tier(&name, tier);
            for _ in 0..producers {
                let a = &lower[rng.usize(..lower.len())];
                let b = &lower[rng.usize(..lower.len())];
                builder = builder.combination(a, b, &name);
            }
            current.push(name);
        }
        top = current[0].clone();
        lower.extend(current);
    }

    (builder.build().unwrap(), top)
}
