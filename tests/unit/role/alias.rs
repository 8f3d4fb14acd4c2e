use crate::assets::buffer::RawImage;
use crate::assets::color::Color;
use crate::role::spec::ScaleHint;

use super::*;

fn tiled(id: u32, c: Color) -> RoleSpec {
    RoleSpec::new(id)
        .with_scale(ScaleHint::Tile)
        .with_source(RawImage::solid(2, 2, c).unwrap())
}

fn map(specs: Vec<RoleSpec>) -> BTreeMap<u32, RoleSpec> {
    specs.into_iter().map(|s| (s.role_id, s)).collect()
}

#[test]
fn declared_alias_resolves_to_final_owner() {
    let specs = map(vec![
        tiled(1, Color::WHITE),
        tiled(2, Color::WHITE).with_alias_of(1),
        tiled(3, Color::WHITE).with_alias_of(2),
    ]);
    let plan = plan_aliases(&specs).unwrap();
    assert_eq!(plan.owner_of(2), Some(1));
    assert_eq!(plan.owner_of(3), Some(1));
    assert_eq!(plan.owner_of(1), None);
    assert_eq!(plan.dependents_of(1).as_slice(), &[2, 3]);
}

#[test]
fn declared_alias_keeps_its_direction() {
    let specs = map(vec![
        tiled(2, Color::WHITE).with_alias_of(5),
        tiled(5, Color::WHITE),
    ]);
    let plan = plan_aliases(&specs).unwrap();
    assert_eq!(plan.owner_of(2), Some(5));
    assert_eq!(plan.owner_of(5), None);
}

#[test]
fn cycles_are_rejected() {
    let specs = map(vec![
        tiled(1, Color::WHITE).with_alias_of(2),
        tiled(2, Color::WHITE).with_alias_of(1),
    ]);
    match plan_aliases(&specs) {
        Err(PixcacheError::AliasCycle { roles }) => assert_eq!(roles, vec![1, 2]),
        other => panic!("expected alias cycle, got {other:?}"),
    }
}

#[test]
fn unknown_targets_are_configuration_errors() {
    let specs = map(vec![tiled(1, Color::WHITE).with_alias_of(40)]);
    assert!(matches!(
        plan_aliases(&specs),
        Err(PixcacheError::Configuration(_))
    ));
}

#[test]
fn non_qualifying_declarations_degrade_to_independent() {
    let scaled = RoleSpec::new(2)
        .with_source(RawImage::solid(2, 2, Color::WHITE).unwrap())
        .with_alias_of(1);
    let specs = map(vec![
        RoleSpec::new(1).with_source(RawImage::solid(2, 2, Color::WHITE).unwrap()),
        scaled,
        tiled(3, Color::BLACK).with_alias_of(4),
        tiled(4, Color::WHITE),
    ]);
    let plan = plan_aliases(&specs).unwrap();
    assert_eq!(plan.owner_of(2), None, "full-scale roles never share");
    assert_eq!(plan.owner_of(3), None, "different recipes never share");
    assert_eq!(plan.len(), 0);
}

#[test]
fn identical_tiles_are_deduplicated_onto_lowest_id() {
    let specs = map(vec![
        tiled(7, Color::WHITE),
        tiled(3, Color::WHITE),
        tiled(5, Color::BLACK),
        tiled(9, Color::WHITE),
    ]);
    let plan = plan_aliases(&specs).unwrap();
    assert_eq!(plan.owner_of(7), Some(3));
    assert_eq!(plan.owner_of(9), Some(3));
    assert_eq!(plan.owner_of(5), None);
    assert_eq!(plan.owner_of(3), None);
}

#[test]
fn declared_aliases_follow_their_owner_into_a_merge() {
    let specs = map(vec![
        tiled(1, Color::WHITE),
        tiled(4, Color::WHITE),
        tiled(6, Color::WHITE).with_alias_of(4),
    ]);
    let plan = plan_aliases(&specs).unwrap();
    assert_eq!(plan.owner_of(4), Some(1));
    assert_eq!(plan.owner_of(6), Some(1));
}

#[test]
fn blended_tiles_are_not_shared() {
    let specs = map(vec![
        tiled(1, Color::WHITE).with_blend(0.5, Color::BLACK),
        tiled(2, Color::WHITE).with_blend(0.5, Color::BLACK),
    ]);
    assert_eq!(plan_aliases(&specs).unwrap().len(), 0);
}
