use worms_core::{Coord, Profession, Side, Terrain, WormId};
use worms_system_danger::{
    danger_from_current_shot, dangerous_cells, shootability_count, threats_to, DangerQuery,
};
use worms_world::scaffolding::SnapshotBuilder;

const SUBJECT: WormId = WormId::new(Side::Own, 0);

/// Three own units so that every opponent unit gets a turn before the own
/// side cycles back.
fn full_rotation(width: i32, height: i32) -> SnapshotBuilder {
    SnapshotBuilder::new(width, height)
        .worm(Side::Own, Coord::new(10, 10), Profession::Commando)
        .worm(Side::Own, Coord::new(1, 1), Profession::Commando)
        .worm(Side::Own, Coord::new(1, 3), Profession::Commando)
}

#[test]
fn excluding_the_current_unit_never_adds_cells() {
    let actives = [
        Coord::new(14, 10),
        Coord::new(12, 12),
        Coord::new(10, 7),
        Coord::new(18, 18),
    ];

    for active in actives {
        let state = full_rotation(24, 24)
            .worm(Side::Opponent, active, Profession::Commando)
            .worm(Side::Opponent, Coord::new(10, 14), Profession::Agent)
            .worm(Side::Opponent, Coord::new(20, 4), Profession::Technologist)
            .build()
            .expect("valid snapshot");

        let full = dangerous_cells(&state, &DangerQuery::against(SUBJECT));
        for query in [
            DangerQuery::against(SUBJECT).excluding_current(),
            DangerQuery::against(SUBJECT).excluding_current().without_bananas(),
        ] {
            let reduced = dangerous_cells(&state, &query);
            assert!(reduced.is_subset(&full), "active at {active:?}");
        }
    }
}

#[test]
fn excluding_the_current_unit_keeps_only_its_lined_up_shot() {
    let state = full_rotation(24, 24)
        .worm(Side::Opponent, Coord::new(14, 10), Profession::Commando)
        .worm(Side::Opponent, Coord::new(10, 14), Profession::Agent)
        .worm(Side::Opponent, Coord::new(20, 4), Profession::Technologist)
        .build()
        .expect("valid snapshot");

    let full = dangerous_cells(&state, &DangerQuery::against(SUBJECT));
    let reduced = dangerous_cells(&state, &DangerQuery::against(SUBJECT).excluding_current());

    assert!(full.contains(&Coord::new(14, 6)));
    assert!(!reduced.contains(&Coord::new(14, 6)));
    assert!(reduced.contains(&Coord::new(11, 10)));

    let current = danger_from_current_shot(&state, SUBJECT, false);
    assert_eq!(
        current.into_iter().collect::<Vec<_>>(),
        vec![
            Coord::new(10, 10),
            Coord::new(11, 10),
            Coord::new(12, 10),
            Coord::new(13, 10),
        ]
    );
}

#[test]
fn current_unit_alone_contributes_exactly_its_lined_up_reach() {
    let state = full_rotation(24, 24)
        .worm(Side::Opponent, Coord::new(13, 10), Profession::Agent)
        .worm(Side::Opponent, Coord::new(20, 20), Profession::Commando)
        .build()
        .expect("valid snapshot");
    let only_active = vec![WormId::new(Side::Opponent, 0)];

    let with_bananas = DangerQuery::against(SUBJECT)
        .with_enemies(only_active.clone())
        .excluding_current();
    assert_eq!(
        dangerous_cells(&state, &with_bananas),
        danger_from_current_shot(&state, SUBJECT, true)
    );

    let rifle_only = DangerQuery::against(SUBJECT)
        .with_enemies(only_active)
        .excluding_current()
        .without_bananas();
    let current = danger_from_current_shot(&state, SUBJECT, false);
    assert_eq!(dangerous_cells(&state, &rifle_only), current);
    assert!(current.contains(&Coord::new(11, 10)));
    assert!(!current.contains(&Coord::new(13, 7)));
}

#[test]
fn a_blast_that_would_catch_the_thrower_is_never_counted() {
    let state = SnapshotBuilder::new(3, 3)
        .worm(Side::Own, Coord::new(0, 0), Profession::Commando)
        .worm(Side::Opponent, Coord::new(1, 1), Profession::Agent)
        .build()
        .expect("valid snapshot");

    let with_bananas = dangerous_cells(&state, &DangerQuery::against(SUBJECT));
    let rifle_only = dangerous_cells(&state, &DangerQuery::against(SUBJECT).without_bananas());

    assert_eq!(with_bananas, rifle_only);
    assert_eq!(with_bananas.len(), 8);
    assert!(!with_bananas.contains(&Coord::new(1, 1)));
}

#[test]
fn banana_reach_extends_two_cells_past_throw_range() {
    let state = SnapshotBuilder::new(33, 33)
        .worm(Side::Own, Coord::new(30, 30), Profession::Commando)
        .worm(Side::Opponent, Coord::new(10, 10), Profession::Agent)
        .build()
        .expect("valid snapshot");

    let cells = dangerous_cells(&state, &DangerQuery::against(SUBJECT));
    assert!(cells.contains(&Coord::new(10, 17)));
    assert!(!cells.contains(&Coord::new(10, 18)));

    let rifle_only = dangerous_cells(&state, &DangerQuery::against(SUBJECT).without_bananas());
    assert!(!rifle_only.contains(&Coord::new(10, 17)));
    assert!(rifle_only.contains(&Coord::new(10, 14)));
}

#[test]
fn digging_opens_the_line_of_fire() {
    let state = SnapshotBuilder::new(24, 24)
        .terrain(Coord::new(12, 10), Terrain::Dirt)
        .worm(Side::Own, Coord::new(20, 20), Profession::Commando)
        .worm(Side::Opponent, Coord::new(10, 10), Profession::Commando)
        .build()
        .expect("valid snapshot");

    let closed = dangerous_cells(&state, &DangerQuery::against(SUBJECT));
    assert!(closed.contains(&Coord::new(11, 10)));
    assert!(!closed.contains(&Coord::new(13, 10)));

    let opened = dangerous_cells(
        &state,
        &DangerQuery::against(SUBJECT).with_dug(Some(Coord::new(12, 10))),
    );
    assert!(opened.contains(&Coord::new(12, 10)));
    assert!(opened.contains(&Coord::new(13, 10)));
}

#[test]
fn explicit_enemy_lists_replace_the_turn_order() {
    let state = full_rotation(24, 24)
        .worm(Side::Opponent, Coord::new(20, 20), Profession::Commando)
        .worm(Side::Opponent, Coord::new(4, 10), Profession::Commando)
        .build()
        .expect("valid snapshot");

    let only_first = dangerous_cells(
        &state,
        &DangerQuery::against(SUBJECT).with_enemies(vec![WormId::new(Side::Opponent, 0)]),
    );
    assert!(only_first.contains(&Coord::new(20, 16)));
    assert!(!only_first.contains(&Coord::new(4, 6)));

    let nobody = dangerous_cells(&state, &DangerQuery::against(SUBJECT).with_enemies(Vec::new()));
    assert!(nobody.is_empty());
}

#[test]
fn shootability_counts_distinct_non_active_enemies() {
    let state = SnapshotBuilder::new(24, 24)
        .worm(Side::Own, Coord::new(1, 1), Profession::Commando)
        .worm(Side::Own, Coord::new(1, 3), Profession::Commando)
        .worm(Side::Own, Coord::new(1, 5), Profession::Commando)
        .worm(Side::Opponent, Coord::new(20, 20), Profession::Commando)
        .worm(Side::Opponent, Coord::new(10, 6), Profession::Commando)
        .worm(Side::Opponent, Coord::new(14, 10), Profession::Commando)
        .build()
        .expect("valid snapshot");

    let counts = shootability_count(&state, SUBJECT);
    assert_eq!(counts.get(&Coord::new(10, 10)), Some(&2));
    assert_eq!(counts.get(&Coord::new(11, 6)), Some(&1));
    assert_eq!(counts.get(&Coord::new(20, 16)), None);
}

#[test]
fn threats_require_a_clear_line_or_a_blast() {
    let open = SnapshotBuilder::new(24, 24)
        .worm(Side::Own, Coord::new(10, 10), Profession::Commando)
        .worm(Side::Opponent, Coord::new(14, 10), Profession::Commando)
        .build()
        .expect("valid snapshot");
    let subject = open.active_worm(Side::Own);
    assert_eq!(
        threats_to(&open, subject),
        vec![WormId::new(Side::Opponent, 0)]
    );

    let covered = SnapshotBuilder::new(24, 24)
        .terrain(Coord::new(12, 10), Terrain::Dirt)
        .worm(Side::Own, Coord::new(10, 10), Profession::Commando)
        .worm(Side::Opponent, Coord::new(14, 10), Profession::Commando)
        .build()
        .expect("valid snapshot");
    assert!(threats_to(&covered, covered.active_worm(Side::Own)).is_empty());

    let lobbed = SnapshotBuilder::new(24, 24)
        .terrain(Coord::new(12, 10), Terrain::Dirt)
        .worm(Side::Own, Coord::new(10, 10), Profession::Commando)
        .worm(Side::Opponent, Coord::new(14, 10), Profession::Agent)
        .build()
        .expect("valid snapshot");
    assert_eq!(
        threats_to(&lobbed, lobbed.active_worm(Side::Own)),
        vec![WormId::new(Side::Opponent, 0)]
    );
}
