//! Per-layer bookkeeping for streamed tile placement and removal.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use hashbrown::{HashMap, HashSet};
use rayon::prelude::*;
use thiserror::Error;
use tilegen_geom::{Cell, Layer};
use tilegen_world::{RegionId, TileCode};

/// Share of a tick budget reserved for each non-base layer.
const LAYER_SHARE: f32 = 0.1;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("no pending cells to select from")]
    NothingPending,
    #[error("cannot select {requested} of {available} pending cells")]
    InvalidCount { requested: usize, available: usize },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellRecord {
    pub owner: Option<RegionId>,
    pub code: TileCode,
    /// Distance to the focus when the record was (re)computed.
    pub distance: f32,
}

impl CellRecord {
    #[inline]
    pub fn shows(&self, owner: Option<RegionId>, code: TileCode) -> bool {
        self.owner == owner && self.code == code
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlacedCell {
    pub owner: Option<RegionId>,
    pub code: TileCode,
    /// False when the cell resolved to no visual; the host was never told about it.
    pub spawned: bool,
    pub has_collider: bool,
}

#[derive(Debug, Default)]
pub struct LayerState {
    pub to_place: HashMap<Cell, CellRecord>,
    pub placed: HashMap<Cell, PlacedCell>,
    pub to_clear: HashSet<Cell>,
}

impl LayerState {
    pub fn is_idle(&self) -> bool {
        self.to_place.is_empty() && self.to_clear.is_empty()
    }
}

#[derive(Debug, PartialEq)]
pub enum ScheduleOutcome {
    /// The cell already shows, or is about to show, this tile.
    Unchanged,
    Queued,
    /// Immediate mode: the caller realizes the record now.
    Ready(CellRecord),
}

#[derive(Debug, Default)]
pub struct Scheduler {
    layers: [LayerState; 4],
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn layer(&self, layer: Layer) -> &LayerState {
        &self.layers[layer.index()]
    }

    #[inline]
    pub fn layer_mut(&mut self, layer: Layer) -> &mut LayerState {
        &mut self.layers[layer.index()]
    }

    pub fn pending_counts(&self) -> [usize; 4] {
        Layer::ALL.map(|l| self.layer(l).to_place.len())
    }

    pub fn clear_counts(&self) -> [usize; 4] {
        Layer::ALL.map(|l| self.layer(l).to_clear.len())
    }

    pub fn placed_count(&self) -> usize {
        self.layers.iter().map(|l| l.placed.len()).sum()
    }

    pub fn is_idle(&self) -> bool {
        self.layers.iter().all(LayerState::is_idle)
    }

    pub fn schedule(
        &mut self,
        layer: Layer,
        cell: Cell,
        owner: Option<RegionId>,
        code: TileCode,
        distance: f32,
        immediate: bool,
    ) -> ScheduleOutcome {
        let state = self.layer_mut(layer);
        state.to_clear.remove(&cell);
        let placed_same = state
            .placed
            .get(&cell)
            .is_some_and(|p| p.owner == owner && p.code == code);
        let pending_same = state
            .to_place
            .get(&cell)
            .is_some_and(|r| r.shows(owner, code));
        if placed_same || pending_same {
            return ScheduleOutcome::Unchanged;
        }
        let record = CellRecord {
            owner,
            code,
            distance,
        };
        if immediate {
            state.to_place.remove(&cell);
            ScheduleOutcome::Ready(record)
        } else {
            state.to_place.insert(cell, record);
            ScheduleOutcome::Queued
        }
    }

    /// Removes and returns the `k` pending cells closest to the focus, nearest first.
    pub fn take_closest(
        &mut self,
        layer: Layer,
        k: usize,
    ) -> Result<Vec<(Cell, CellRecord)>, SchedulerError> {
        let state = self.layer_mut(layer);
        let picked = select_closest(&state.to_place, k)?;
        for (cell, _) in &picked {
            state.to_place.remove(cell);
        }
        Ok(picked)
    }

    /// Removes up to `k` cells from the pending-removal set.
    pub fn take_removals(&mut self, layer: Layer, k: usize) -> Vec<Cell> {
        let state = self.layer_mut(layer);
        let cells: Vec<Cell> = state.to_clear.iter().take(k).copied().collect();
        for cell in &cells {
            state.to_clear.remove(cell);
        }
        cells
    }

    /// Drops every pending placement; optionally queues every placed cell for removal.
    pub fn clear_pending(&mut self, queue_removals: bool) {
        for state in &mut self.layers {
            state.to_place.clear();
            if queue_removals {
                let placed: Vec<Cell> = state.placed.keys().copied().collect();
                state.to_clear.extend(placed);
            } else {
                state.to_clear.clear();
            }
        }
    }

    /// Recomputes every pending distance against a new focus cell.
    pub fn refresh_distances(&mut self, focus: Cell) {
        for state in &mut self.layers {
            state
                .to_place
                .par_iter_mut()
                .for_each(|(cell, record)| record.distance = cell.distance(focus));
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Candidate {
    distance: f32,
    cell: Cell,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then_with(|| self.cell.cmp(&other.cell))
    }
}

/// The `k` entries with the smallest distance, ascending; equal distances order by cell.
///
/// Keeps a max-heap of capacity `k`, so the cost is `O(n log k)`. Asking for nothing, or for
/// more than is pending, is a caller bug and is reported as an error.
pub fn select_closest(
    pending: &HashMap<Cell, CellRecord>,
    k: usize,
) -> Result<Vec<(Cell, CellRecord)>, SchedulerError> {
    if pending.is_empty() {
        log::error!("select_closest called with no pending cells");
        return Err(SchedulerError::NothingPending);
    }
    if k == 0 || k > pending.len() {
        log::error!("select_closest asked for {} of {} cells", k, pending.len());
        return Err(SchedulerError::InvalidCount {
            requested: k,
            available: pending.len(),
        });
    }
    let mut heap: BinaryHeap<Candidate> = BinaryHeap::with_capacity(k);
    for (cell, record) in pending {
        let cand = Candidate {
            distance: record.distance,
            cell: *cell,
        };
        if heap.len() < k {
            heap.push(cand);
        } else if heap.peek().is_some_and(|top| cand < *top) {
            heap.pop();
            heap.push(cand);
        }
    }
    Ok(heap
        .into_sorted_vec()
        .into_iter()
        .filter_map(|c| pending.get(&c.cell).map(|r| (c.cell, *r)))
        .collect())
}

/// Splits a tick budget across layers.
///
/// Object and height layers each get a fixed share (at least one cell when the budget is
/// non-zero), in order 1, 2, 3; whatever is left goes to the base layer. No layer is given
/// more than it has pending.
pub fn split_budget(budget: usize, pending: [usize; 4]) -> [usize; 4] {
    let mut alloc = [0usize; 4];
    if budget == 0 {
        return alloc;
    }
    let share = ((budget as f32 * LAYER_SHARE).round() as usize).max(1);
    let mut remaining = budget;
    for layer in [Layer::BaseObjects, Layer::Height, Layer::HeightObjects] {
        let i = layer.index();
        let take = share.min(remaining).min(pending[i]);
        alloc[i] = take;
        remaining -= take;
    }
    alloc[Layer::Base.index()] = remaining.min(pending[Layer::Base.index()]);
    alloc
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(distance: f32) -> CellRecord {
        CellRecord {
            owner: None,
            code: TileCode::Default,
            distance,
        }
    }

    #[test]
    fn selection_errors_on_bad_requests() {
        let empty = HashMap::new();
        assert_eq!(select_closest(&empty, 1), Err(SchedulerError::NothingPending));
        let mut one = HashMap::new();
        one.insert(Cell::new(0, 0), rec(1.0));
        assert_eq!(
            select_closest(&one, 0),
            Err(SchedulerError::InvalidCount { requested: 0, available: 1 })
        );
        assert_eq!(
            select_closest(&one, 2),
            Err(SchedulerError::InvalidCount { requested: 2, available: 1 })
        );
    }

    #[test]
    fn selection_is_ascending() {
        let mut m = HashMap::new();
        for (i, d) in [5.0, 1.0, 3.0, 2.0, 4.0].into_iter().enumerate() {
            m.insert(Cell::new(i as i32, 0), rec(d));
        }
        let picked: Vec<f32> = select_closest(&m, 3)
            .unwrap()
            .iter()
            .map(|(_, r)| r.distance)
            .collect();
        assert_eq!(picked, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn schedule_skips_identical_and_unqueues_removal() {
        let mut s = Scheduler::new();
        let c = Cell::new(3, 4);
        assert_eq!(
            s.schedule(Layer::Base, c, Some(1), TileCode::Rule(2), 1.0, false),
            ScheduleOutcome::Queued
        );
        assert_eq!(
            s.schedule(Layer::Base, c, Some(1), TileCode::Rule(2), 9.0, false),
            ScheduleOutcome::Unchanged
        );
        s.layer_mut(Layer::Base).to_place.clear();
        s.layer_mut(Layer::Base).placed.insert(
            c,
            PlacedCell { owner: Some(1), code: TileCode::Rule(2), spawned: true, has_collider: false },
        );
        s.layer_mut(Layer::Base).to_clear.insert(c);
        assert_eq!(
            s.schedule(Layer::Base, c, Some(1), TileCode::Rule(2), 1.0, true),
            ScheduleOutcome::Unchanged
        );
        assert!(s.layer(Layer::Base).to_clear.is_empty());
        assert_eq!(
            s.schedule(Layer::Base, c, Some(1), TileCode::Default, 1.0, true),
            ScheduleOutcome::Ready(CellRecord { owner: Some(1), code: TileCode::Default, distance: 1.0 })
        );
    }

    #[test]
    fn budget_split_reserves_shares_then_base() {
        assert_eq!(split_budget(50, [100, 100, 100, 100]), [35, 5, 5, 5]);
        assert_eq!(split_budget(50, [100, 0, 2, 100]), [43, 0, 2, 5]);
        assert_eq!(split_budget(3, [10, 10, 10, 10]), [0, 1, 1, 1]);
        assert_eq!(split_budget(50, [10, 0, 0, 0]), [10, 0, 0, 0]);
        assert_eq!(split_budget(0, [10, 10, 10, 10]), [0; 4]);
    }

    #[test]
    fn clear_pending_queues_placed_cells() {
        let mut s = Scheduler::new();
        let c = Cell::new(1, 1);
        s.layer_mut(Layer::Height).placed.insert(
            c,
            PlacedCell { owner: None, code: TileCode::Default, spawned: true, has_collider: false },
        );
        s.schedule(Layer::Base, Cell::new(0, 0), None, TileCode::Default, 0.0, false);
        s.clear_pending(true);
        assert_eq!(s.pending_counts(), [0; 4]);
        assert!(s.layer(Layer::Height).to_clear.contains(&c));
        s.clear_pending(false);
        assert!(s.is_idle());
    }

    #[test]
    fn refresh_recomputes_distances() {
        let mut s = Scheduler::new();
        s.schedule(Layer::Base, Cell::new(3, 4), None, TileCode::Default, 99.0, false);
        s.refresh_distances(Cell::new(0, 0));
        assert_eq!(s.layer(Layer::Base).to_place[&Cell::new(3, 4)].distance, 5.0);
    }
}
