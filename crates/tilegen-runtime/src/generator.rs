use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};
use tilegen_geom::{Cell, Layer, Vec2};
use tilegen_world::worldgen::Mode;
use tilegen_world::{
    ConfigError, PassStats, RegionId, TileCode, WorldCatalog, WorldGenConfig, generate_pass,
};

use crate::host::TileHost;
use crate::realize::realize;
use crate::scheduler::{CellRecord, PlacedCell, ScheduleOutcome, Scheduler, split_budget};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Speed {
    /// Everything is realized before `generate` returns.
    Immediate,
    /// Work is queued and drained by `advance`.
    Budgeted,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClearPolicy {
    NoClear,
    Immediate,
    Budgeted,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GenerateReport {
    pub bottom_left: Cell,
    pub size: i32,
    pub placed: usize,
    pub queued: usize,
    pub unchanged: usize,
    pub stats: PassStats,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    pub regenerated: bool,
    pub placed: usize,
    pub removed: usize,
}

/// Drives generation passes and streams their tiles into a [`TileHost`].
pub struct TilemapGenerator<H: TileHost> {
    catalog: WorldCatalog,
    scheduler: Scheduler,
    host: H,
    pool: Option<ThreadPool>,
    focus: Option<Vec2>,
    /// Focus cell at the last focus-driven generation.
    last_cell: Option<Cell>,
    generation_timer: f32,
}

impl<H: TileHost> TilemapGenerator<H> {
    pub fn new(config: &WorldGenConfig, host: H) -> Result<Self, ConfigError> {
        Ok(Self::from_catalog(WorldCatalog::from_config(config)?, host))
    }

    pub fn from_catalog(catalog: WorldCatalog, host: H) -> Self {
        Self {
            catalog,
            scheduler: Scheduler::new(),
            host,
            pool: None,
            focus: None,
            last_cell: None,
            generation_timer: 0.0,
        }
    }

    /// Runs passes on a dedicated pool instead of the global one.
    pub fn with_workers(mut self, workers: usize) -> Result<Self, ThreadPoolBuildError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers.max(1))
            .thread_name(|i| format!("tilegen-pass-{i}"))
            .build()?;
        self.pool = Some(pool);
        Ok(self)
    }

    /// Swaps in a new world description. Everything placed under the old one is removed.
    pub fn set_config(&mut self, config: &WorldGenConfig) -> Result<(), ConfigError> {
        let catalog = WorldCatalog::from_config(config)?;
        self.clear(ClearPolicy::Immediate);
        self.catalog = catalog;
        self.last_cell = None;
        self.generation_timer = 0.0;
        log::info!("world config reloaded ({} regions)", self.catalog.regions.len());
        Ok(())
    }

    pub fn catalog(&self) -> &WorldCatalog {
        &self.catalog
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// World-space point that infinite worlds follow. `None` stops following.
    pub fn set_focus(&mut self, position: Option<Vec2>) {
        self.focus = position;
    }

    pub fn focus_cell(&self) -> Option<Cell> {
        self.focus.map(|p| Cell::from_world(p, self.catalog.cell_size))
    }

    fn follows_focus(&self) -> Option<Cell> {
        match self.catalog.mode {
            Mode::Infinite => self.focus_cell(),
            Mode::Static => None,
        }
    }

    /// Centre of the default window, also the reference point for pending distances.
    fn target_cell(&self) -> Cell {
        self.follows_focus().unwrap_or_else(|| {
            Cell::from_world(self.catalog.static_position, self.catalog.cell_size)
        })
    }

    pub fn is_idle(&self) -> bool {
        self.scheduler.is_idle()
    }

    /// First generation, placed all at once. Infinite worlds always start; static ones only
    /// when `generate_on_start` is set. Later regenerations stream through `advance`.
    pub fn start(&mut self) -> Option<GenerateReport> {
        match self.catalog.mode {
            Mode::Static if !self.catalog.generate_on_start => None,
            _ => Some(self.generate(Speed::Immediate, ClearPolicy::Immediate)),
        }
    }

    /// Generates the configured window around the focus (infinite) or the static position.
    pub fn generate(&mut self, speed: Speed, clear: ClearPolicy) -> GenerateReport {
        let size = self.catalog.size;
        let target = self.target_cell();
        self.generate_at(
            Cell::new(target.x - size / 2, target.y - size / 2),
            size,
            speed,
            clear,
        )
    }

    pub fn generate_centered(
        &mut self,
        center: Vec2,
        size: i32,
        speed: Speed,
        clear: ClearPolicy,
    ) -> GenerateReport {
        let size = size.max(1);
        let c = Cell::from_world(center, self.catalog.cell_size);
        self.generate_at(Cell::new(c.x - size / 2, c.y - size / 2), size, speed, clear)
    }

    pub fn generate_at(
        &mut self,
        bottom_left: Cell,
        size: i32,
        speed: Speed,
        clear: ClearPolicy,
    ) -> GenerateReport {
        let size = size.max(1);
        self.clear(clear);
        let catalog = &self.catalog;
        let pass = match &self.pool {
            Some(pool) => pool.install(|| generate_pass(catalog, bottom_left, size)),
            None => generate_pass(catalog, bottom_left, size),
        };

        let reference = self.target_cell();
        let immediate = speed == Speed::Immediate;
        let mut report = GenerateReport {
            bottom_left,
            size,
            stats: pass.stats,
            ..Default::default()
        };
        for t in &pass.tiles {
            let distance = t.cell.distance(reference);
            match self
                .scheduler
                .schedule(t.layer, t.cell, t.owner, t.code, distance, immediate)
            {
                ScheduleOutcome::Unchanged => report.unchanged += 1,
                ScheduleOutcome::Queued => report.queued += 1,
                ScheduleOutcome::Ready(record) => {
                    if self.place_record(t.layer, t.cell, record) {
                        report.placed += 1;
                    }
                }
            }
        }

        if let Some(focus) = self.follows_focus() {
            if clear == ClearPolicy::NoClear {
                self.scheduler.refresh_distances(focus);
            }
            self.last_cell = Some(focus);
        }
        log::info!(
            "generated {}x{} at ({}, {}): {} placed, {} queued, {} unchanged",
            report.size,
            report.size,
            bottom_left.x,
            bottom_left.y,
            report.placed,
            report.queued,
            report.unchanged
        );
        report
    }

    /// Removes what is on screen, now or over the following ticks. Pending placements are
    /// dropped unless the policy is `NoClear`.
    pub fn clear(&mut self, policy: ClearPolicy) {
        match policy {
            ClearPolicy::NoClear => {}
            ClearPolicy::Budgeted => self.scheduler.clear_pending(true),
            ClearPolicy::Immediate => {
                self.scheduler.clear_pending(false);
                for layer in Layer::ALL {
                    let placed = std::mem::take(&mut self.scheduler.layer_mut(layer).placed);
                    for (cell, p) in placed {
                        if p.spawned {
                            self.host.remove(cell, layer);
                        }
                    }
                }
            }
        }
    }

    /// Realizes a record, removing whatever the cell showed before. True when the host got a
    /// placement.
    fn place_record(&mut self, layer: Layer, cell: Cell, record: CellRecord) -> bool {
        let state = self.scheduler.layer_mut(layer);
        if state.placed.remove(&cell).is_some_and(|p| p.spawned) {
            self.host.remove(cell, layer);
        }
        let cmd = realize(&self.catalog, cell, layer, record.owner, record.code);
        let placed = PlacedCell {
            owner: record.owner,
            code: record.code,
            spawned: cmd.is_some(),
            has_collider: cmd.as_ref().is_some_and(|c| c.collider.is_some()),
        };
        match cmd {
            Some(cmd) => self.host.place(cmd),
            None => log::debug!(
                "no visual for {:?} at ({}, {}) on {}",
                record.code,
                cell.x,
                cell.y,
                layer.name()
            ),
        }
        state.placed.insert(cell, placed);
        placed.spawned
    }

    /// Realizes up to `budget` pending cells of one layer, closest to the focus first.
    pub fn commit_placements(&mut self, layer: Layer, budget: usize) -> usize {
        let k = budget.min(self.scheduler.layer(layer).to_place.len());
        if k == 0 {
            return 0;
        }
        let picked = match self.scheduler.take_closest(layer, k) {
            Ok(picked) => picked,
            Err(e) => {
                log::error!("commit on {} failed: {}", layer.name(), e);
                return 0;
            }
        };
        for (cell, record) in &picked {
            self.place_record(layer, *cell, *record);
        }
        picked.len()
    }

    /// Removes up to `budget` cells queued for clearing on one layer.
    pub fn commit_removals(&mut self, layer: Layer, budget: usize) -> usize {
        let cells = self.scheduler.take_removals(layer, budget);
        for cell in &cells {
            let state = self.scheduler.layer_mut(layer);
            if state.placed.remove(cell).is_some_and(|p| p.spawned) {
                self.host.remove(*cell, layer);
            }
        }
        cells.len()
    }

    /// One frame of work: maybe regenerate around the focus, then spend the tick budgets.
    pub fn advance(&mut self, dt: f32) -> TickReport {
        let mut report = TickReport::default();
        if let Some(current) = self.follows_focus() {
            let threshold = self.catalog.streaming.regenerate_distance;
            let moved = self
                .last_cell
                .is_none_or(|last| current.distance(last) >= threshold);
            if moved {
                if self.generation_timer <= 0.0 {
                    self.generation_timer = self.catalog.streaming.generation_period;
                    self.generate(Speed::Budgeted, ClearPolicy::Budgeted);
                    report.regenerated = true;
                } else {
                    self.generation_timer -= dt;
                }
            }
        }

        let order = [
            Layer::BaseObjects,
            Layer::Height,
            Layer::HeightObjects,
            Layer::Base,
        ];
        let places = split_budget(
            self.catalog.streaming.place_per_tick,
            self.scheduler.pending_counts(),
        );
        let clears = split_budget(
            self.catalog.streaming.clear_per_tick,
            self.scheduler.clear_counts(),
        );
        for layer in order {
            report.placed += self.commit_placements(layer, places[layer.index()]);
            report.removed += self.commit_removals(layer, clears[layer.index()]);
        }
        if report.placed + report.removed > 0 {
            log::trace!("tick: {} placed, {} removed", report.placed, report.removed);
        }
        report
    }

    /// Current classification of a placed cell.
    pub fn placed(&self, cell: Cell, layer: Layer) -> Option<(Option<RegionId>, TileCode)> {
        self.scheduler
            .layer(layer)
            .placed
            .get(&cell)
            .map(|p| (p.owner, p.code))
    }
}
