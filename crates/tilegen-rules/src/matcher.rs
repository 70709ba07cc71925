//! Neighbor signatures and rule scoring.
//!
//! A signature describes what a tile at a cell expects of its eight neighbors. Transition
//! signatures are built for empty cells bordering a region; cliff signatures for edge cells of a
//! height region. Rules are scored against a signature and the best one wins.

use tilegen_geom::{DOWN, DOWN_LEFT, DOWN_RIGHT, LEFT, Offset, RIGHT, UP, UP_LEFT, UP_RIGHT};

use crate::types::{Neighbor, Occupancy, RuleSet, Signature, TilingRule};

const S_UP: usize = 0;
const S_DOWN: usize = 1;
const S_LEFT: usize = 2;
const S_RIGHT: usize = 3;
const S_UP_LEFT: usize = 4;
const S_UP_RIGHT: usize = 5;
const S_DOWN_LEFT: usize = 6;
const S_DOWN_RIGHT: usize = 7;

/// `NotThis` at the diagonal, `Any` on the two cardinals beside it, `This` elsewhere.
fn notch(diag: Offset) -> Signature {
    Signature::from_fn(|o| {
        if o == diag {
            Neighbor::NotThis
        } else if o == Offset::new(diag.dx, 0) || o == Offset::new(0, diag.dy) {
            Neighbor::Any
        } else {
            Neighbor::This
        }
    })
}

/// `This` at the diagonal, `Any` on the two cardinals beside it, `NotThis` elsewhere.
fn corner(diag: Offset) -> Signature {
    Signature::from_fn(|o| {
        if o == diag {
            Neighbor::This
        } else if o == Offset::new(diag.dx, 0) || o == Offset::new(0, diag.dy) {
            Neighbor::Any
        } else {
            Neighbor::NotThis
        }
    })
}

/// `This` along the given side, `Any` across the middle, `NotThis` on the opposite side.
fn edge(side: Offset) -> Signature {
    Signature::from_fn(|o| {
        let along = o.dx * side.dx + o.dy * side.dy;
        match along {
            1 => Neighbor::This,
            0 => Neighbor::Any,
            _ => Neighbor::NotThis,
        }
    })
}

fn exact(present: &Occupancy) -> Signature {
    Signature::from_fn(|o| match o.neighbor_slot() {
        Some(s) if present[s] => Neighbor::This,
        _ => Neighbor::NotThis,
    })
}

/// Signature for an unclassified cell given which neighbors belong to the adjacent region.
pub fn transition_signature(present: &Occupancy) -> Signature {
    let tp = present[S_UP];
    let dn = present[S_DOWN];
    let lf = present[S_LEFT];
    let rt = present[S_RIGHT];
    let count = present.iter().filter(|p| **p).count();

    if rt && dn {
        notch(UP_LEFT)
    } else if lf && tp {
        notch(DOWN_RIGHT)
    } else if rt && tp {
        notch(DOWN_LEFT)
    } else if lf && dn {
        notch(UP_RIGHT)
    } else if count == 1 && !(tp || dn || lf || rt) {
        let diag = [
            (S_UP_RIGHT, UP_RIGHT),
            (S_UP_LEFT, UP_LEFT),
            (S_DOWN_RIGHT, DOWN_RIGHT),
            (S_DOWN_LEFT, DOWN_LEFT),
        ]
        .into_iter()
        .find(|(s, _)| present[*s])
        .map(|(_, d)| d)
        .unwrap_or(UP_RIGHT);
        corner(diag)
    } else if tp {
        edge(UP)
    } else if dn {
        edge(DOWN)
    } else if rt {
        edge(RIGHT)
    } else if lf {
        edge(LEFT)
    } else {
        exact(present)
    }
}

/// Signature for a height cell given which neighbors share its height owner.
///
/// Corner shapes with 3..=5 matching neighbors come first, then single missing diagonals,
/// then straight edges. Anything else leaves the signature unconstrained.
pub fn cliff_signature(same: &Occupancy) -> Signature {
    let tp = same[S_UP];
    let dn = same[S_DOWN];
    let lf = same[S_LEFT];
    let rt = same[S_RIGHT];
    let tpl = same[S_UP_LEFT];
    let tpr = same[S_UP_RIGHT];
    let dnl = same[S_DOWN_LEFT];
    let dnr = same[S_DOWN_RIGHT];
    let count = same.iter().filter(|p| **p).count();
    let cornerish = (3..=5).contains(&count);

    if cornerish && tp && rt && ((!dn && (!lf || !tpl)) || (!lf && (!dn || !dnr))) {
        corner(UP_RIGHT)
    } else if cornerish && tp && lf && ((!rt && (!dn || !dnl)) || (!dn && (!rt || !tpr))) {
        corner(UP_LEFT)
    } else if cornerish && dn && rt && ((!lf && (!tp || !tpr)) || (!tp && (!lf || !dnl))) {
        corner(DOWN_RIGHT)
    } else if cornerish && dn && lf && ((!tp && (!rt || !dnr)) || (!rt && (!tp || !tpl))) {
        corner(DOWN_LEFT)
    } else if count == 7 && !tpl {
        notch(UP_LEFT)
    } else if count == 7 && !dnr {
        notch(DOWN_RIGHT)
    } else if count == 7 && !dnl {
        notch(DOWN_LEFT)
    } else if count == 7 && !tpr {
        notch(UP_RIGHT)
    } else if !dn && rt && lf {
        edge(UP)
    } else if !tp && rt && lf {
        edge(DOWN)
    } else if !lf && tp && dn {
        edge(RIGHT)
    } else if !rt && tp && dn {
        edge(LEFT)
    } else {
        Signature::unconstrained()
    }
}

/// +1 for every constraint equal to the signature, -1 for every non-`Any` constraint that
/// differs. Neighbors the signature leaves unconstrained are skipped.
pub fn score(rule: &TilingRule, sig: &Signature) -> i32 {
    rule.constraints
        .iter()
        .fold(0, |acc, (at, want)| match sig.get(*at) {
            Some(have) if have == *want => acc + 1,
            Some(_) if *want != Neighbor::Any => acc - 1,
            _ => acc,
        })
}

/// Index of the best scoring rule, first one on ties. `None` when the set is empty or the
/// winner has no visuals, meaning the default visual applies.
pub fn match_rule(set: &RuleSet, sig: &Signature) -> Option<usize> {
    let mut best: Option<(usize, i32)> = None;
    for (k, rule) in set.rules.iter().enumerate() {
        let s = score(rule, sig);
        if best.is_none_or(|(_, b)| s > b) {
            best = Some((k, s));
        }
    }
    best.map(|(k, _)| k).filter(|k| set.rules[*k].has_visuals())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn occ(cells: &[Offset]) -> Occupancy {
        let mut o = [false; 8];
        for c in cells {
            o[c.neighbor_slot().unwrap()] = true;
        }
        o
    }

    fn rule(visual: &str, constraints: &[(Offset, Neighbor)]) -> TilingRule {
        TilingRule {
            visuals: vec![visual.to_string()],
            constraints: constraints.to_vec(),
        }
    }

    #[test]
    fn single_cardinal_gives_edge() {
        let sig = transition_signature(&occ(&[UP]));
        assert_eq!(sig.get(UP), Some(Neighbor::This));
        assert_eq!(sig.get(UP_LEFT), Some(Neighbor::This));
        assert_eq!(sig.get(LEFT), Some(Neighbor::Any));
        assert_eq!(sig.get(DOWN), Some(Neighbor::NotThis));
        assert_eq!(sig.get(DOWN_RIGHT), Some(Neighbor::NotThis));
    }

    #[test]
    fn lone_diagonal_gives_corner() {
        let sig = transition_signature(&occ(&[DOWN_LEFT]));
        assert_eq!(sig.get(DOWN_LEFT), Some(Neighbor::This));
        assert_eq!(sig.get(LEFT), Some(Neighbor::Any));
        assert_eq!(sig.get(DOWN), Some(Neighbor::Any));
        assert_eq!(sig.get(UP_RIGHT), Some(Neighbor::NotThis));
    }

    #[test]
    fn perpendicular_cardinals_give_notch() {
        let sig = transition_signature(&occ(&[RIGHT, DOWN]));
        assert_eq!(sig.get(UP_LEFT), Some(Neighbor::NotThis));
        assert_eq!(sig.get(LEFT), Some(Neighbor::Any));
        assert_eq!(sig.get(UP), Some(Neighbor::Any));
        assert_eq!(sig.get(DOWN_RIGHT), Some(Neighbor::This));
    }

    #[test]
    fn two_diagonals_fall_back_to_exact() {
        let sig = transition_signature(&occ(&[UP_LEFT, DOWN_RIGHT]));
        assert_eq!(sig.get(UP_LEFT), Some(Neighbor::This));
        assert_eq!(sig.get(DOWN_RIGHT), Some(Neighbor::This));
        assert_eq!(sig.get(UP), Some(Neighbor::NotThis));
    }

    #[test]
    fn cliff_interior_is_unconstrained_and_edges_are_sided() {
        assert!(cliff_signature(&[true; 8]).is_unconstrained());
        // bottom row missing: top edge of a cliff
        let sig = cliff_signature(&occ(&[UP, UP_LEFT, UP_RIGHT, LEFT, RIGHT]));
        assert_eq!(sig, edge(UP));
        // only the top-left diagonal missing
        let sig = cliff_signature(&occ(&[UP, DOWN, LEFT, RIGHT, UP_RIGHT, DOWN_LEFT, DOWN_RIGHT]));
        assert_eq!(sig, notch(UP_LEFT));
        // outer corner
        let sig = cliff_signature(&occ(&[UP, RIGHT, UP_RIGHT]));
        assert_eq!(sig, corner(UP_RIGHT));
    }

    #[test]
    fn best_rule_wins_and_ties_keep_first() {
        let set = RuleSet {
            name: "t".into(),
            default_visual: Some("fill".into()),
            rules: vec![
                rule("top", &[(UP, Neighbor::This), (DOWN, Neighbor::NotThis)]),
                rule("top_again", &[(UP, Neighbor::This), (DOWN, Neighbor::NotThis)]),
                rule("bottom", &[(UP, Neighbor::NotThis), (DOWN, Neighbor::This)]),
            ],
        };
        let sig = transition_signature(&occ(&[UP]));
        assert_eq!(score(&set.rules[0], &sig), 2);
        assert_eq!(score(&set.rules[2], &sig), -2);
        assert_eq!(match_rule(&set, &sig), Some(0));
        let sig = transition_signature(&occ(&[DOWN]));
        assert_eq!(match_rule(&set, &sig), Some(2));
    }

    #[test]
    fn winner_without_visuals_falls_back_to_default() {
        let mut set = RuleSet::default();
        set.rules.push(TilingRule {
            visuals: vec![],
            constraints: vec![(UP, Neighbor::This)],
        });
        assert_eq!(match_rule(&set, &transition_signature(&occ(&[UP]))), None);
        assert_eq!(match_rule(&RuleSet::default(), &Signature::unconstrained()), None);
    }

    #[test]
    fn unconstrained_signature_selects_first_rule() {
        let set = RuleSet {
            rules: vec![rule("a", &[(UP, Neighbor::This)]), rule("b", &[])],
            ..Default::default()
        };
        assert_eq!(match_rule(&set, &Signature::unconstrained()), Some(0));
    }
}
