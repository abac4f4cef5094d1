//! Level-of-detail management: distance-based LOD selection and request ordering.

mod detail;
mod priority_queue;

pub use detail::{DetailLevels, LodError, LodInfo, distance_to_tile_bounds};
pub use priority_queue::{RequestQueue, request_priority};
