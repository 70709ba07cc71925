use proptest::prelude::*;
use tilegen_geom::{Cell, EIGHT_DIRECTIONS, Layer};
use tilegen_world::{WorldCatalog, WorldGenConfig, generate_pass};

fn two_region_catalog(seed_a: i32, seed_b: i32, pa: i32, pb: i32) -> WorldCatalog {
    let toml = format!(
        r#"
        margin = 4

        [[regions]]
        name = "a"
        priority = {pa}
        rule_set = "r"
        threshold = 0.55
        noise = {{ kind = "open_simplex2", seed = {seed_a}, frequency = 0.15 }}

        [[regions]]
        name = "b"
        priority = {pb}
        rule_set = "r"
        threshold = 0.5
        noise = {{ kind = "perlin", seed = {seed_b}, frequency = 0.2 }}

        [rule_sets.r]
        default_visual = "r"

        [[rule_sets.r.rules]]
        visuals = ["r_edge"]
    "#
    );
    WorldCatalog::from_config(&WorldGenConfig::from_toml_str(&toml).unwrap()).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    // Classified cells of different regions never touch, not even diagonally. Edge tiles always
    // match the single rule, so `Default` with an owner marks a classified cell.
    #[test]
    fn regions_never_touch(seed_a in any::<i32>(), seed_b in any::<i32>(), pa in 0i32..3, pb in 0i32..3,
                           ox in -200i32..200, oy in -200i32..200) {
        let cat = two_region_catalog(seed_a, seed_b, pa, pb);
        let out = generate_pass(&cat, Cell::new(ox, oy), 20);
        let classified: std::collections::HashMap<Cell, u16> = out
            .layer(Layer::Base)
            .filter(|t| t.code == tilegen_world::TileCode::Default)
            .filter_map(|t| t.owner.map(|o| (t.cell, o)))
            .collect();
        for (cell, id) in &classified {
            for d in EIGHT_DIRECTIONS {
                if let Some(other) = classified.get(&cell.step(d)) {
                    prop_assert_eq!(other, id, "{:?} touches {:?}", cell, cell.step(d));
                }
            }
        }
    }

    #[test]
    fn pass_is_deterministic(seed_a in any::<i32>(), ox in -500i32..500, oy in -500i32..500) {
        let cat = two_region_catalog(seed_a, seed_a.wrapping_add(1), 1, 2);
        let a = generate_pass(&cat, Cell::new(ox, oy), 12);
        let b = generate_pass(&cat, Cell::new(ox, oy), 12);
        prop_assert_eq!(a.tiles, b.tiles);
    }
}

#[test]
fn every_window_cell_gets_exactly_one_base_tile() {
    let cat = two_region_catalog(3, 4, 1, 1);
    let out = generate_pass(&cat, Cell::new(10, -7), 15);
    let mut cells: Vec<Cell> = out.layer(Layer::Base).map(|t| t.cell).collect();
    assert_eq!(cells.len(), 225);
    cells.sort();
    cells.dedup();
    assert_eq!(cells.len(), 225);
    assert!(cells.iter().all(|c| (10..25).contains(&c.x) && (-7..8).contains(&c.y)));
}

#[test]
fn single_region_with_zero_threshold_fills_the_window() {
    let cfg = WorldGenConfig::from_toml_str(
        r#"
        [[regions]]
        name = "meadow"
        rule_set = "meadow"
        threshold = 0.0

        [rule_sets.meadow]
        default_visual = "meadow"
    "#,
    )
    .unwrap();
    let cat = WorldCatalog::from_config(&cfg).unwrap();
    let out = generate_pass(&cat, Cell::new(0, 0), 5);
    assert_eq!(out.stats.spacing.adjacent_cleared, 0);
    assert_eq!(out.stats.spacing.bridged_cleared, 0);
    assert_eq!(out.tiles.len(), 25);
    assert!(out
        .tiles
        .iter()
        .all(|t| t.owner == Some(0) && t.code == tilegen_world::TileCode::Default));
}
