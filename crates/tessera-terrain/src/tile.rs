//! Integer tile coordinates and neighbour directions.
//!
//! Tiles live on an infinite integer grid. `+x` runs east and `+y` runs south,
//! matching the row order of a [`crate::Heightfield`] so a tile's last row borders
//! the first row of the tile below it.

use glam::Vec2;

/// Integer position of one chunk in the infinite tile grid.
///
/// Used as the sole key of chunk registries; equality and hashing are exact.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord {
    pub x: i32,
    pub y: i32,
}

impl TileCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The tile displaced by `(dx, dy)`.
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// The adjacent tile in direction `neighbor`.
    pub fn neighbor(self, neighbor: Neighbor) -> Self {
        let (dx, dy) = neighbor.offset();
        self.offset(dx, dy)
    }

    /// The tile whose centre is nearest to a world-space point.
    ///
    /// Tile `(x, y)` is centred on `(x, y) * tile_world_size`.
    pub fn from_world(position: Vec2, tile_world_size: f32) -> Self {
        let scaled = position / tile_world_size;
        Self::new(scaled.x.round() as i32, scaled.y.round() as i32)
    }

    /// World-space centre of this tile.
    pub fn world_center(self, tile_world_size: f32) -> Vec2 {
        Vec2::new(self.x as f32, self.y as f32) * tile_world_size
    }

    /// Chebyshev (king-move) distance in tiles.
    pub fn chebyshev_distance(self, other: TileCoord) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }
}

impl std::fmt::Display for TileCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// One of the eight tiles surrounding a centre tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Neighbor {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Neighbor {
    /// All neighbours in index order.
    pub const ALL: [Neighbor; 8] = [
        Neighbor::North,
        Neighbor::NorthEast,
        Neighbor::East,
        Neighbor::SouthEast,
        Neighbor::South,
        Neighbor::SouthWest,
        Neighbor::West,
        Neighbor::NorthWest,
    ];

    /// Grid offset of this neighbour (`+y` is south).
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Neighbor::North => (0, -1),
            Neighbor::NorthEast => (1, -1),
            Neighbor::East => (1, 0),
            Neighbor::SouthEast => (1, 1),
            Neighbor::South => (0, 1),
            Neighbor::SouthWest => (-1, 1),
            Neighbor::West => (-1, 0),
            Neighbor::NorthWest => (-1, -1),
        }
    }

    /// Position of this neighbour in [`Neighbor::ALL`].
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The neighbour whose offset is `(dx, dy)`, or `None` for `(0, 0)` and
    /// offsets outside the 3x3 block.
    pub fn from_offset(dx: i32, dy: i32) -> Option<Neighbor> {
        Neighbor::ALL.into_iter().find(|n| n.offset() == (dx, dy))
    }
}

/// The side of a tile shared with an adjacent tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    /// Neighbour at `-x`; this tile's first column meets its last column.
    Left,
    /// Neighbour at `+x`; this tile's last column meets its first column.
    Right,
    /// Neighbour at `-y`; this tile's first row meets its last row.
    Top,
    /// Neighbour at `+y`; this tile's last row meets its first row.
    Bottom,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Left, Side::Right, Side::Top, Side::Bottom];

    pub const fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
            Side::Top => Side::Bottom,
            Side::Bottom => Side::Top,
        }
    }

    pub const fn neighbor(self) -> Neighbor {
        match self {
            Side::Left => Neighbor::West,
            Side::Right => Neighbor::East,
            Side::Top => Neighbor::North,
            Side::Bottom => Neighbor::South,
        }
    }
}
