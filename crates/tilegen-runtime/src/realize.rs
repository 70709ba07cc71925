//! Turns a scheduled cell record into what the host should draw.

use tilegen_geom::{Cell, ColliderShape, Layer, Vec2};
use tilegen_rules::{ColliderParams, collider_for_rule};
use tilegen_world::hash::consistent_index;
use tilegen_world::worldgen::ObjectCollider;
use tilegen_world::{ObjectKind, ObjectSpec, RegionId, TileCode, WorldCatalog};

use crate::host::{PlaceCommand, Visual};

/// Seed mixed into the object variant hash.
const VARIANT_SEED: u32 = 0;

/// Builds the host command for a cell, or `None` when nothing resolves to a visual.
pub fn realize(
    catalog: &WorldCatalog,
    cell: Cell,
    layer: Layer,
    owner: Option<RegionId>,
    code: TileCode,
) -> Option<PlaceCommand> {
    let (visual, collider) = match layer {
        Layer::Base => base_tile(catalog, owner, code)?,
        Layer::Height => height_tile(catalog, owner, code)?,
        Layer::BaseObjects | Layer::HeightObjects => {
            let TileCode::Object(index) = code else {
                log::trace!("non-object code {:?} on {}", code, layer.name());
                return None;
            };
            object(catalog.object(owner, index)?, cell)?
        }
    };
    Some(PlaceCommand {
        cell,
        layer,
        position: cell.center(catalog.cell_size),
        visual,
        collider,
    })
}

fn base_tile(
    catalog: &WorldCatalog,
    owner: Option<RegionId>,
    code: TileCode,
) -> Option<(Visual, Option<ColliderShape>)> {
    let Some(id) = owner else {
        let name = catalog.base_visual.clone()?;
        return Some((Visual::Tile(name), None));
    };
    let set = catalog.region_rule_set(id)?;
    let name = set.visual(code.rule_index())?.to_owned();
    // Only edges between terrain that walks differently get a collider.
    let collider = match (code, catalog.region(id)) {
        (TileCode::Rule(k), Some(region)) if region.collider != catalog.base_collider => set
            .rule(k as usize)
            .map(|rule| {
                let params = ColliderParams::ground(catalog.cell_size, region.collider_thickness);
                collider_for_rule(rule, &params)
            }),
        _ => None,
    };
    Some((Visual::Tile(name), collider))
}

fn height_tile(
    catalog: &WorldCatalog,
    owner: Option<RegionId>,
    code: TileCode,
) -> Option<(Visual, Option<ColliderShape>)> {
    let spec = catalog.height_spec(owner)?;
    if let TileCode::Slope(dir) = code {
        return Some((Visual::Tile(spec.slope_visual(dir)?.to_owned()), None));
    }
    let set = catalog.height_rule_set(owner)?;
    let name = set.visual(code.rule_index())?.to_owned();
    let collider = match code {
        TileCode::Rule(k) => set.rule(k as usize).map(|rule| {
            let params = ColliderParams::cliff(
                catalog.cell_size,
                spec.collider_thickness,
                spec.collider_padding,
            );
            collider_for_rule(rule, &params)
        }),
        _ => None,
    };
    Some((Visual::Tile(name), collider))
}

fn object(spec: &ObjectSpec, cell: Cell) -> Option<(Visual, Option<ColliderShape>)> {
    let choices = spec.kind.choices();
    let name = choices
        .get(consistent_index(cell, choices.len(), VARIANT_SEED))?
        .clone();
    Some(match &spec.kind {
        ObjectKind::Prefab(_) => (
            Visual::Prefab {
                name,
                scale: spec.scale,
            },
            None,
        ),
        ObjectKind::Sprite(_) => {
            let collider = match spec.collider {
                ObjectCollider::None => None,
                ObjectCollider::Circle => Some(ColliderShape::Circle {
                    radius: spec.collider_size,
                }),
                ObjectCollider::Box => Some(ColliderShape::Box {
                    size: Vec2::new(spec.collider_size, spec.collider_size),
                    offset: Vec2::ZERO,
                }),
            };
            (
                Visual::Sprite {
                    name,
                    scale: spec.scale,
                },
                collider,
            )
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilegen_world::{SlopeDir, WorldGenConfig};

    fn catalog() -> WorldCatalog {
        let cfg = WorldGenConfig::from_toml_str(
            r#"
            [base]
            visual = "grass"

            [base.height]
            rule_set = "cliff"
            slopes = { top = "ramp_up" }

            [[base.objects]]
            name = "rock"
            kind = { sprite = ["rock"] }
            collider = "circle"
            collider_size = 0.3
            scale = 2.0

            [[base.objects]]
            name = "tree"
            kind = { prefab = ["oak"] }
            collider = "box"

            [[regions]]
            name = "water"
            rule_set = "water"
            collider = "non_walkable"

            [[regions]]
            name = "sand"
            priority = 0
            rule_set = "water"

            [rule_sets.water]
            default_visual = "water"

            [[rule_sets.water.rules]]
            visuals = ["shore"]
            neighbors = [{ at = [0, 1], is = "this" }, { at = [0, -1], is = "not_this" }]

            [rule_sets.cliff]

            [[rule_sets.cliff.rules]]
            visuals = ["cliff_face"]
            neighbors = [{ at = [0, 1], is = "this" }, { at = [0, -1], is = "not_this" }]
        "#,
        )
        .unwrap();
        WorldCatalog::from_config(&cfg).unwrap()
    }

    #[test]
    fn base_cells_resolve_visuals_and_edge_colliders() {
        let cat = catalog();
        let c = Cell::new(2, 3);
        let plain = realize(&cat, c, Layer::Base, None, TileCode::Default).unwrap();
        assert_eq!(plain.visual, Visual::Tile("grass".into()));
        assert_eq!(plain.position, Vec2::new(2.5, 3.5));
        assert!(plain.collider.is_none());

        let inner = realize(&cat, c, Layer::Base, Some(0), TileCode::Default).unwrap();
        assert_eq!(inner.visual, Visual::Tile("water".into()));
        assert!(inner.collider.is_none());

        let shore = realize(&cat, c, Layer::Base, Some(0), TileCode::Rule(0)).unwrap();
        assert_eq!(shore.visual, Visual::Tile("shore".into()));
        assert!(shore.collider.is_some());

        // walkable like the base, so no collider
        let sand = realize(&cat, c, Layer::Base, Some(1), TileCode::Rule(0)).unwrap();
        assert!(sand.collider.is_none());
    }

    #[test]
    fn height_cells_use_slopes_and_cliff_colliders() {
        let cat = catalog();
        let c = Cell::new(0, 0);
        let slope = realize(&cat, c, Layer::Height, None, TileCode::Slope(SlopeDir::Top)).unwrap();
        assert_eq!(slope.visual, Visual::Tile("ramp_up".into()));
        assert!(slope.collider.is_none());
        assert!(realize(&cat, c, Layer::Height, None, TileCode::Slope(SlopeDir::Left)).is_none());

        let face = realize(&cat, c, Layer::Height, None, TileCode::Rule(0)).unwrap();
        assert!(face.collider.is_some());
        // the cliff set has no default visual
        assert!(realize(&cat, c, Layer::Height, None, TileCode::Default).is_none());
    }

    #[test]
    fn objects_pick_variants_and_colliders() {
        let cat = catalog();
        let c = Cell::new(7, -4);
        let rock = realize(&cat, c, Layer::BaseObjects, None, TileCode::Object(0)).unwrap();
        assert_eq!(rock.visual, Visual::Sprite { name: "rock".into(), scale: 2.0 });
        assert_eq!(rock.collider, Some(ColliderShape::Circle { radius: 0.3 }));

        let tree = realize(&cat, c, Layer::HeightObjects, None, TileCode::Object(1)).unwrap();
        assert_eq!(tree.visual, Visual::Prefab { name: "oak".into(), scale: 1.0 });
        assert!(tree.collider.is_none());

        assert!(realize(&cat, c, Layer::BaseObjects, None, TileCode::Object(9)).is_none());
        assert!(realize(&cat, c, Layer::BaseObjects, None, TileCode::Default).is_none());
    }
}
