use std::fs;

use spell_content::{ContentFactory, ContentSource, LoadError, bundled};
use spell_core::env::{CreatureOracle, ItemOracle, SpellOracle};
use spell_core::{EffectKind, ErrorSeverity, GameError, ItemId, SpellId};

#[test]
fn bundled_tables_load_and_cross_reference() {
    let factory = ContentFactory::bundled();
    let data = factory.load_data().expect("bundled content is valid");

    let fireball = data.spell(SpellId(133)).expect("fireball");
    assert_eq!(fireball.effects[0].kind, EffectKind::SchoolDamage);
    assert!(fireball.speed > 0.0);

    let water = data.spell(SpellId(5504)).expect("conjure water");
    assert!(data.item(ItemId(water.effects[0].item_type)).is_some());
    assert!(data.creature(416).is_some());
    assert_eq!(data.category_spells(4), &[SpellId(2379)]);

    let config = factory.load_config().expect("bundled config");
    assert_eq!(config.duel_flag_spell, SpellId(7267));
    assert!(data.spell(config.duel_flag_spell).is_some());
}

#[test]
fn directory_source_reads_the_same_layout() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("spells.ron"), bundled::SPELLS).unwrap();
    fs::write(dir.path().join("items.ron"), bundled::ITEMS).unwrap();
    fs::write(dir.path().join("creatures.ron"), bundled::CREATURES).unwrap();

    let factory = ContentFactory::directory(dir.path());
    assert_eq!(
        factory.source(),
        &ContentSource::Directory(dir.path().to_path_buf())
    );
    let from_disk = factory.load_data().unwrap();
    let embedded = ContentFactory::bundled().load_data().unwrap();
    assert_eq!(from_disk.spell_count(), embedded.spell_count());
    assert_eq!(from_disk.item_count(), embedded.item_count());
    assert_eq!(from_disk.creature_count(), embedded.creature_count());

    // No config.toml on disk.
    assert_eq!(factory.load_config().unwrap(), spell_core::GameConfig::default());
}

#[test]
fn missing_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let err = ContentFactory::directory(dir.path()).load_data().unwrap_err();
    assert!(matches!(err, LoadError::Io { .. }));
    assert_eq!(err.severity(), ErrorSeverity::Fatal);
    assert_eq!(err.error_code(), "CONTENT_IO");
}

#[test]
fn dangling_trigger_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("spells.ron"),
        r#"(spells: [(id: 1, name: "Proc", effects: [(kind: TriggerSpell, trigger_spell: Some(99))])])"#,
    )
    .unwrap();
    fs::write(dir.path().join("items.ron"), "(items: [])").unwrap();
    fs::write(dir.path().join("creatures.ron"), "(creatures: [])").unwrap();

    let err = ContentFactory::directory(dir.path()).load_data().unwrap_err();
    match err {
        LoadError::DanglingReference { owner, table, id } => {
            assert_eq!(owner, "spell 1");
            assert_eq!(table, "spell");
            assert_eq!(id, 99);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn item_spell_must_exist() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("spells.ron"), "(spells: [])").unwrap();
    fs::write(
        dir.path().join("items.ron"),
        r#"(items: [(id: 3, name: "Scroll", spells: [(spell: 12)])])"#,
    )
    .unwrap();
    fs::write(dir.path().join("creatures.ron"), "(creatures: [])").unwrap();

    let err = ContentFactory::directory(dir.path()).load_data().unwrap_err();
    assert!(matches!(
        err,
        LoadError::DanglingReference { table: "spell", id: 12, .. }
    ));
}
