//! Distance thresholds mapping viewer distance to a mesh LOD.

use glam::Vec2;

/// Invalid detail level tables.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LodError {
    #[error("at least one detail level is required")]
    Empty,

    #[error("detail level {index} has non-positive visible distance {distance}")]
    NonPositiveDistance { index: usize, distance: f32 },

    #[error("visible distances must be strictly increasing (level {index}: {distance} <= {previous})")]
    NotIncreasing {
        index: usize,
        distance: f32,
        previous: f32,
    },
}

/// One detail level: mesh LOD `lod` is used up to `visible_distance`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LodInfo {
    pub lod: usize,
    pub visible_distance: f32,
}

impl LodInfo {
    pub const fn new(lod: usize, visible_distance: f32) -> Self {
        Self {
            lod,
            visible_distance,
        }
    }
}

/// Ordered detail levels. The last level's distance is the maximum view
/// distance; chunks beyond it are not visible.
#[derive(Clone, Debug, PartialEq)]
pub struct DetailLevels {
    levels: Vec<LodInfo>,
}

impl Default for DetailLevels {
    fn default() -> Self {
        Self {
            levels: vec![
                LodInfo::new(0, 200.0),
                LodInfo::new(1, 400.0),
                LodInfo::new(4, 600.0),
            ],
        }
    }
}

impl DetailLevels {
    pub fn new(levels: Vec<LodInfo>) -> Result<Self, LodError> {
        if levels.is_empty() {
            return Err(LodError::Empty);
        }
        for (index, level) in levels.iter().enumerate() {
            if !(level.visible_distance > 0.0) {
                return Err(LodError::NonPositiveDistance {
                    index,
                    distance: level.visible_distance,
                });
            }
            if index > 0 && level.visible_distance <= levels[index - 1].visible_distance {
                return Err(LodError::NotIncreasing {
                    index,
                    distance: level.visible_distance,
                    previous: levels[index - 1].visible_distance,
                });
            }
        }
        Ok(Self { levels })
    }

    pub fn levels(&self) -> &[LodInfo] {
        &self.levels
    }

    pub fn max_view_distance(&self) -> f32 {
        self.levels.last().map_or(0.0, |l| l.visible_distance)
    }

    /// Index of the detail level for `distance`, or `None` when out of view.
    /// A distance equal to a threshold still belongs to that level.
    pub fn select_index(&self, distance: f32) -> Option<usize> {
        self.levels
            .iter()
            .position(|level| distance <= level.visible_distance)
    }

    /// Mesh LOD for `distance`, or `None` when out of view.
    pub fn select_lod(&self, distance: f32) -> Option<usize> {
        self.select_index(distance).map(|i| self.levels[i].lod)
    }

    /// Highest LOD index referenced by any level.
    pub fn max_lod(&self) -> usize {
        self.levels.iter().map(|l| l.lod).max().unwrap_or(0)
    }
}

/// Distance from `viewer` to the nearest point of the square tile of side
/// `size` centered at `center`. Zero inside the tile.
pub fn distance_to_tile_bounds(viewer: Vec2, center: Vec2, size: f32) -> f32 {
    let half = Vec2::splat(size * 0.5);
    let outside = ((viewer - center).abs() - half).max(Vec2::ZERO);
    outside.length()
}
