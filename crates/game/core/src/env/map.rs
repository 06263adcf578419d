use crate::math::Vec3;

/// Static terrain queries. Navigation is not modelled; only sight lines.
pub trait MapOracle: Send + Sync {
    fn is_in_line_of_sight(&self, map: u32, from: Vec3, to: Vec3) -> bool;
}

/// Terrain without any obstruction.
#[derive(Clone, Copy, Debug, Default)]
pub struct OpenTerrain;

impl MapOracle for OpenTerrain {
    fn is_in_line_of_sight(&self, _map: u32, _from: Vec3, _to: Vec3) -> bool {
        true
    }
}
