//! Combat resolution.
//!
//! # Architecture
//!
//! - **Attack Table**: [`AttackTable`] decides the per-target outcome and
//!   resist percentage. [`StandardAttackTable`] is the level-based default;
//!   tests plug in scripted tables.
//! - **Pure Functions**: mitigation math in [`damage`] and chance tables in
//!   [`hit`] are side-effect free.
//! - **Used by Effects**: damage, heal, and aura handlers resolve every target
//!   through the table before mutating it.

pub mod damage;
pub mod hit;
pub mod result;

pub use damage::{Mitigation, crit_heal, mitigate};
pub use hit::{HitChances, melee_chances, spell_miss_chance, spell_resist_pct};
pub use result::{
    AttackContext, AttackRoll, AttackTable, HitOutcome, ResolutionMode, StandardAttackTable,
};
