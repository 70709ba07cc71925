//! Streaming placement: per-layer scheduling, tile hosts, and the generator facade.
#![forbid(unsafe_code)]

pub mod generator;
pub mod host;
pub mod realize;
pub mod scheduler;

pub use generator::{ClearPolicy, GenerateReport, Speed, TickReport, TilemapGenerator};
pub use host::{ChannelHost, HostCommand, PlaceCommand, RecordingHost, TileHost, Visual};
pub use scheduler::{CellRecord, Scheduler, SchedulerError, select_closest, split_budget};
