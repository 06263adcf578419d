//! Scripted demo encounter: a mage and a warrior against a spider.

use anyhow::Result;
use spell_core::{
    CastRequest, Character, GameError, Guid, PowerType, SpellId, TargetSelector, Unit, Vec3,
};
use spell_runtime::{RuntimeError, RuntimeHandle, Topic};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{info, warn};

const MAGE: Guid = Guid(1);
const WARRIOR: Guid = Guid(2);
const SPIDER: Guid = Guid(3);

const POWER_WORD_SHIELD: SpellId = SpellId(17);
const HEROIC_STRIKE: SpellId = SpellId(78);
const FIREBALL: SpellId = SpellId(133);
const CORRUPTION: SpellId = SpellId(172);
const CONJURE_WATER: SpellId = SpellId(5504);

pub fn cast_list() -> Vec<Unit> {
    let mut mage_sheet = Character::default();
    mage_sheet.join_group(WARRIOR);
    let mut warrior_sheet = Character::default();
    warrior_sheet.join_group(MAGE);

    vec![
        Unit::new(MAGE, "Jaina", 60)
            .with_faction(1)
            .with_health(1200)
            .with_power(PowerType::Mana, 3000)
            .with_character(mage_sheet),
        Unit::new(WARRIOR, "Varian", 60)
            .with_faction(1)
            .with_health(2000)
            .with_power(PowerType::Rage, 100)
            .with_weapon(40.0, 60.0)
            .with_position(Vec3::new(10.0, 1.0, 0.0), 0.0)
            .with_character(warrior_sheet),
        Unit::new(SPIDER, "Webwood Lurker", 60)
            .with_faction(16)
            .with_health(1500)
            .with_position(Vec3::new(12.0, 0.0, 0.0), core::f32::consts::PI),
    ]
}

/// Prints every published event as one JSON line until the bus closes.
pub fn print_events(handle: &RuntimeHandle) -> Vec<JoinHandle<()>> {
    Topic::ALL
        .iter()
        .map(|&topic| {
            let mut rx = handle.subscribe(topic);
            tokio::spawn(async move {
                loop {
                    match rx.recv().await {
                        Ok(event) => match serde_json::to_string(&event) {
                            Ok(line) => println!("{line}"),
                            Err(error) => warn!(?topic, %error, "event not serializable"),
                        },
                        Err(RecvError::Lagged(skipped)) => {
                            warn!(?topic, skipped, "event printer lagged");
                        }
                        Err(RecvError::Closed) => break,
                    }
                }
            })
        })
        .collect()
}

/// Issues a cast; synchronous rejections are logged, not fatal.
async fn cast(
    handle: &RuntimeHandle,
    caster: Guid,
    spell: SpellId,
    target: TargetSelector,
) -> Result<()> {
    match handle
        .start_cast(CastRequest::new(caster, spell, target))
        .await
    {
        Ok(id) => {
            info!(%caster, spell = spell.0, cast = %id, "cast accepted");
            Ok(())
        }
        Err(RuntimeError::Cast(error)) => {
            warn!(
                %caster,
                spell = spell.0,
                code = error.error_code(),
                severity = error.severity().as_str(),
                %error,
                "cast rejected"
            );
            Ok(())
        }
        Err(other) => Err(other.into()),
    }
}

pub async fn run(handle: &RuntimeHandle) -> Result<()> {
    info!("shield up");
    cast(handle, MAGE, POWER_WORD_SHIELD, TargetSelector::SelfCast).await?;

    info!("corruption");
    cast(handle, MAGE, CORRUPTION, TargetSelector::Unit(SPIDER)).await?;
    handle.advance(2000).await?;

    info!("fireball");
    cast(handle, MAGE, FIREBALL, TargetSelector::Unit(SPIDER)).await?;
    handle.advance(3500).await?;
    handle.advance(500).await?;

    info!("heroic strike");
    cast(handle, WARRIOR, HEROIC_STRIKE, TargetSelector::Unit(SPIDER)).await?;
    let swing = handle.attack_swing(WARRIOR).await?;
    info!(consumed = swing.is_consumed(), "warrior swings");

    info!("conjure water");
    cast(handle, MAGE, CONJURE_WATER, TargetSelector::SelfCast).await?;
    handle.advance(3000).await?;

    handle.advance(9000).await?;

    let now = handle.clock().await?;
    for guid in [MAGE, WARRIOR, SPIDER] {
        if let Some(unit) = handle.query_unit(guid).await? {
            info!(
                now,
                unit = %unit.name,
                health = unit.health,
                max_health = unit.max_health,
                auras = unit.auras.len(),
                "final state"
            );
        }
    }
    Ok(())
}
