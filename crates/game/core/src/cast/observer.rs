use crate::world::World;

use super::CastEnded;

/// Receives the `ended` signal of every cast in a world.
///
/// Observers run synchronously inside the world step that ended the cast and
/// may mutate the world, including stopping or starting other casts.
pub trait CastObserver: Send + Sync {
    fn on_cast_ended(&self, world: &mut World, ended: &CastEnded);
}
