//! Chunk streaming around a moving viewer.
//!
//! Each tile goes through climate sampling, heightfield generation, seam
//! stitching against its loaded neighbours, and meshing at the LOD its
//! distance calls for. Generation runs on a worker pool; results are applied
//! on the thread calling [`ChunkStreamer::update`], which also decides what
//! the [`MeshSink`] shows.

mod chunk;
mod error;
mod settings;
mod sink;
mod streamer;

pub use chunk::{Chunk, ChunkPhase};
pub use error::StreamError;
pub use settings::{StreamerSettings, parse_corner_statistic};
pub use sink::MeshSink;
pub use streamer::{ChunkStreamer, StreamStats, TickReport};
