//! Placement writes and their event-log entries commit together or not at all.

use chrono::NaiveDate;
use influence_core::{
    catalog::PlacementStatus,
    clock::FixedClock,
    config::DeskConfig,
    desk::Desk,
    model::{NewBlogger, NewCampaign, NewPlacement, PlacementUpdate},
    repository::DeskRepository,
    store::DeskStore,
    types::EntityId,
};
use rusqlite::Connection;
use tempfile::TempDir;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// File-backed desk, so a second connection can see the same database.
fn build_desk() -> (TempDir, String, Desk<DeskStore>) {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("desk.sqlite3").to_string_lossy().into_owned();
    let config = DeskConfig {
        database_path: path.clone(),
        sweep_before_reads: false,
        ..DeskConfig::default_test()
    };
    let desk = Desk::open(config, Box::new(FixedClock::new(date(2025, 8, 10)))).unwrap();
    (dir, path, desk)
}

fn book(desk: &Desk<DeskStore>, scheduled: NaiveDate) -> EntityId {
    let campaign = desk
        .create_campaign(NewCampaign { name: "Autumn".into(), ..Default::default() })
        .unwrap();
    let blogger = desk
        .create_blogger(NewBlogger {
            name: format!("Nina {}", campaign.id),
            url: format!("https://example.com/nina/{}", campaign.id),
            ..Default::default()
        })
        .unwrap();
    desk.create_placement(NewPlacement {
        campaign_id: campaign.id,
        blogger_id: blogger.id,
        scheduled_date: Some(scheduled),
        ..Default::default()
    })
    .unwrap()
    .id
}

/// Make every event-log insert fail from now on.
fn take_event_log_offline(path: &str) {
    let conn = Connection::open(path).unwrap();
    conn.execute_batch(
        "CREATE TRIGGER block_events BEFORE INSERT ON event_log
         BEGIN SELECT RAISE(ABORT, 'event log offline'); END;",
    )
    .unwrap();
}

fn status_of(desk: &Desk<DeskStore>, id: EntityId) -> PlacementStatus {
    desk.repo().placement(id).unwrap().unwrap().status
}

/// A manager status change rolls back when its history entry cannot be written.
#[test]
fn status_change_rolls_back_without_history() {
    let (_dir, path, desk) = build_desk();
    let id = book(&desk, date(2025, 8, 20));
    take_event_log_offline(&path);

    let result = desk.update_placement(
        id,
        PlacementUpdate {
            status: Some(PlacementStatus::Agreed),
            fee: Some(250.0),
            ..Default::default()
        },
    );
    assert!(result.is_err());

    let stored = desk.repo().placement(id).unwrap().unwrap();
    assert_eq!(stored.status, PlacementStatus::Planning);
    assert_eq!(stored.fee, None);
    assert_eq!(desk.placement_history(id).unwrap().len(), 1);
}

/// Updates that change no status write no history, so they still succeed.
#[test]
fn field_edit_needs_no_history() {
    let (_dir, path, desk) = build_desk();
    let id = book(&desk, date(2025, 8, 20));
    take_event_log_offline(&path);

    let updated = desk
        .update_placement(id, PlacementUpdate { views: Some(900), ..Default::default() })
        .unwrap();
    assert_eq!(updated.views, Some(900));
    assert_eq!(desk.repo().placement(id).unwrap().unwrap().views, Some(900));
}

/// Sweep promotions roll back as a whole when the history write fails.
#[test]
fn sweep_rolls_back_without_history() {
    let (_dir, path, desk) = build_desk();
    let first = book(&desk, date(2025, 8, 1));
    let second = book(&desk, date(2025, 8, 2));
    take_event_log_offline(&path);

    assert!(desk.sweep_overdue().is_err());
    assert_eq!(status_of(&desk, first), PlacementStatus::Planning);
    assert_eq!(status_of(&desk, second), PlacementStatus::Planning);
    assert_eq!(desk.placement_history(first).unwrap().len(), 1);
}

/// Creation and deletion are undone when their history entry cannot be written.
#[test]
fn create_and_delete_roll_back_without_history() {
    let (_dir, path, desk) = build_desk();
    let kept = book(&desk, date(2025, 8, 20));
    let before = desk.repo().placements(&Default::default()).unwrap().len();
    take_event_log_offline(&path);

    assert!(desk.delete_placement(kept).is_err());
    assert!(desk.repo().placement(kept).unwrap().is_some());

    let owner = desk.repo().placement(kept).unwrap().unwrap();
    let created = desk.create_placement(NewPlacement {
        campaign_id: owner.campaign_id,
        blogger_id: owner.blogger_id,
        ..Default::default()
    });
    assert!(created.is_err());
    assert_eq!(desk.repo().placements(&Default::default()).unwrap().len(), before);
}
