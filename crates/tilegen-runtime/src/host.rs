//! The seam between the generator and whatever draws tiles.

use crossbeam_channel::{Receiver, Sender, unbounded};
use hashbrown::HashMap;
use tilegen_geom::{Cell, ColliderShape, Layer, Vec2};

#[derive(Clone, Debug, PartialEq)]
pub enum Visual {
    Tile(String),
    Sprite { name: String, scale: f32 },
    Prefab { name: String, scale: f32 },
}

impl Visual {
    pub fn name(&self) -> &str {
        match self {
            Visual::Tile(name) => name,
            Visual::Sprite { name, .. } | Visual::Prefab { name, .. } => name,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlaceCommand {
    pub cell: Cell,
    pub layer: Layer,
    /// World-space centre of the cell.
    pub position: Vec2,
    pub visual: Visual,
    pub collider: Option<ColliderShape>,
}

/// Receives placements and removals. A `place` on an occupied cell never happens; the
/// generator always removes first.
pub trait TileHost {
    fn place(&mut self, cmd: PlaceCommand);
    fn remove(&mut self, cell: Cell, layer: Layer);
}

/// Keeps the current picture in memory. Used by the CLI and tests.
#[derive(Debug, Default)]
pub struct RecordingHost {
    pub tiles: HashMap<(Cell, Layer), PlaceCommand>,
    pub placed_total: usize,
    pub removed_total: usize,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, cell: Cell, layer: Layer) -> Option<&PlaceCommand> {
        self.tiles.get(&(cell, layer))
    }

    pub fn layer(&self, layer: Layer) -> impl Iterator<Item = &PlaceCommand> {
        self.tiles
            .iter()
            .filter(move |((_, l), _)| *l == layer)
            .map(|(_, cmd)| cmd)
    }

    pub fn colliders(&self) -> usize {
        self.tiles.values().filter(|c| c.collider.is_some()).count()
    }
}

impl TileHost for RecordingHost {
    fn place(&mut self, cmd: PlaceCommand) {
        self.placed_total += 1;
        if self.tiles.insert((cmd.cell, cmd.layer), cmd).is_some() {
            log::warn!("host placed over an occupied cell");
        }
    }

    fn remove(&mut self, cell: Cell, layer: Layer) {
        self.removed_total += 1;
        self.tiles.remove(&(cell, layer));
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum HostCommand {
    Place(PlaceCommand),
    Remove { cell: Cell, layer: Layer },
}

/// Forwards commands to another thread.
#[derive(Debug)]
pub struct ChannelHost {
    tx: Sender<HostCommand>,
    disconnected: bool,
}

impl ChannelHost {
    pub fn new() -> (Self, Receiver<HostCommand>) {
        let (tx, rx) = unbounded();
        (Self::from_sender(tx), rx)
    }

    pub fn from_sender(tx: Sender<HostCommand>) -> Self {
        Self {
            tx,
            disconnected: false,
        }
    }

    fn send(&mut self, cmd: HostCommand) {
        if self.tx.send(cmd).is_err() && !self.disconnected {
            self.disconnected = true;
            log::warn!("tile host receiver dropped; further commands are discarded");
        }
    }
}

impl TileHost for ChannelHost {
    fn place(&mut self, cmd: PlaceCommand) {
        self.send(HostCommand::Place(cmd));
    }

    fn remove(&mut self, cell: Cell, layer: Layer) {
        self.send(HostCommand::Remove { cell, layer });
    }
}
