use crate::math::Vec3;
use crate::state::{Guid, Unit};

/// Square tile grid used to fan notifications out to nearby characters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisibilityGrid {
    tile_size: f32,
    sight_tiles: i32,
}

impl VisibilityGrid {
    pub fn new(tile_size: f32, sight_tiles: i32) -> Self {
        Self {
            tile_size: tile_size.max(f32::EPSILON),
            sight_tiles: sight_tiles.max(0),
        }
    }

    pub fn tile_of(&self, position: Vec3) -> (i32, i32) {
        (
            (position.x / self.tile_size).floor() as i32,
            (position.y / self.tile_size).floor() as i32,
        )
    }

    /// True if the tiles of `a` and `b` are within sight of each other.
    pub fn in_sight(&self, a: Vec3, b: Vec3) -> bool {
        let (ax, ay) = self.tile_of(a);
        let (bx, by) = self.tile_of(b);
        (ax - bx).abs() <= self.sight_tiles && (ay - by).abs() <= self.sight_tiles
    }

    /// Characters on `map` whose tile is in sight of `origin`.
    pub fn subscribers_in_sight<'a>(
        &self,
        map: u32,
        origin: Vec3,
        units: impl Iterator<Item = &'a Unit>,
    ) -> Vec<Guid> {
        units
            .filter(|u| u.is_player() && u.map == map && self.in_sight(origin, u.position))
            .map(|u| u.guid)
            .collect()
    }
}
