//! Overdue sweep against the SQLite store and the in-memory store.

use chrono::NaiveDate;
use influence_core::{
    catalog::{CampaignStatus, PlacementStatus},
    clock::FixedClock,
    config::DeskConfig,
    dashboard::DashboardFilter,
    desk::Desk,
    error::DeskError,
    event::{Actor, DeskEvent},
    memory_store::MemoryStore,
    model::{NewBlogger, NewCampaign, NewPlacement, PlacementFilter, PlacementRecord},
    repository::DeskRepository,
    status_policy::sweep_overdue,
    store::DeskStore,
    types::EntityId,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn build_desk(today: NaiveDate) -> Desk<DeskStore> {
    let _ = env_logger::builder().is_test(true).try_init();
    Desk::open(DeskConfig::default_test(), Box::new(FixedClock::new(today))).expect("open desk")
}

/// Campaign + blogger, returning (campaign_id, blogger_id).
fn seed_owner(desk: &Desk<DeskStore>) -> (EntityId, EntityId) {
    let campaign = desk
        .create_campaign(NewCampaign {
            name: "Spring launch".into(),
            status: Some(CampaignStatus::Active),
            ..Default::default()
        })
        .unwrap();
    let blogger = desk
        .create_blogger(NewBlogger {
            name: "Rita".into(),
            url: "https://example.com/rita".into(),
            ..Default::default()
        })
        .unwrap();
    (campaign.id, blogger.id)
}

fn book(
    desk: &Desk<DeskStore>,
    owner: (EntityId, EntityId),
    scheduled: Option<NaiveDate>,
    status: PlacementStatus,
) -> EntityId {
    desk.create_placement(NewPlacement {
        campaign_id: owner.0,
        blogger_id: owner.1,
        scheduled_date: scheduled,
        status: Some(status),
        fee: Some(100.0),
        ..Default::default()
    })
    .unwrap()
    .id
}

fn status_of(desk: &Desk<DeskStore>, id: EntityId) -> PlacementStatus {
    desk.repo().placement(id).unwrap().unwrap().status
}

fn memory_placement(id: EntityId, scheduled: Option<NaiveDate>, status: PlacementStatus) -> PlacementRecord {
    PlacementRecord {
        id,
        campaign_id: 1,
        blogger_id: 1,
        counterparty_id: None,
        scheduled_date: scheduled,
        status,
        fee: None,
        views: None,
        likes: None,
        comments: None,
        shares: None,
        engagement_rate: None,
        link: None,
        placement_type: None,
        pricing_model: None,
        payment_terms: None,
        tracking_link: None,
        ad_token: None,
    }
}

/// Past-dated open placements are promoted; everything else is left alone.
#[test]
fn sweep_promotes_only_eligible_placements() {
    let today = date(2025, 3, 10);
    let desk = build_desk(today);
    let owner = seed_owner(&desk);

    let late = book(&desk, owner, Some(date(2025, 3, 1)), PlacementStatus::PaidWaitingPublication);
    let planning = book(&desk, owner, Some(date(2025, 2, 1)), PlacementStatus::Planning);
    let published = book(&desk, owner, Some(date(2025, 1, 1)), PlacementStatus::Published);
    let done = book(&desk, owner, Some(date(2025, 1, 1)), PlacementStatus::Done);
    let due_today = book(&desk, owner, Some(today), PlacementStatus::PaidWaitingPublication);
    let undated = book(&desk, owner, None, PlacementStatus::Planning);

    let report = desk.sweep_overdue().unwrap();
    assert_eq!(report.placement_ids, vec![late, planning]);

    assert_eq!(status_of(&desk, late), PlacementStatus::Overdue);
    assert_eq!(status_of(&desk, planning), PlacementStatus::Overdue);
    assert_eq!(status_of(&desk, published), PlacementStatus::Published);
    assert_eq!(status_of(&desk, done), PlacementStatus::Done);
    assert_eq!(status_of(&desk, due_today), PlacementStatus::PaidWaitingPublication);
    assert_eq!(status_of(&desk, undated), PlacementStatus::Planning);
}

/// A second sweep with the same date reports zero changes.
#[test]
fn sweep_is_idempotent() {
    let desk = build_desk(date(2025, 3, 10));
    let owner = seed_owner(&desk);
    book(&desk, owner, Some(date(2025, 3, 1)), PlacementStatus::Planning);
    book(&desk, owner, Some(date(2025, 3, 2)), PlacementStatus::Declined);

    let first = desk.sweep_overdue().unwrap();
    assert_eq!(first.changed(), 2);

    let before = desk.repo().placements(&PlacementFilter::all()).unwrap();
    let second = desk.sweep_overdue().unwrap();
    let after = desk.repo().placements(&PlacementFilter::all()).unwrap();

    assert_eq!(second.changed(), 0);
    assert_eq!(before, after);
}

/// Overdue rows stay overdue whatever their date, even a future one.
#[test]
fn sweep_never_reverses_overdue() {
    let store = MemoryStore::new();
    store.seed_placement(memory_placement(1, Some(date(2030, 1, 1)), PlacementStatus::Overdue));
    store.seed_placement(memory_placement(2, None, PlacementStatus::Overdue));
    store.seed_placement(memory_placement(3, Some(date(2020, 1, 1)), PlacementStatus::Overdue));

    for today in [date(2019, 1, 1), date(2025, 6, 1), date(2040, 1, 1)] {
        let report = sweep_overdue(&store, today).unwrap();
        assert_eq!(report.changed(), 0);
        for p in store.placements(&PlacementFilter::all()).unwrap() {
            assert_eq!(p.status, PlacementStatus::Overdue, "placement {}", p.id);
        }
    }
}

/// Published and Done are terminal for the sweep, however old the date.
#[test]
fn sweep_leaves_terminal_statuses_alone() {
    let store = MemoryStore::new();
    store.seed_placement(memory_placement(1, Some(date(2001, 1, 1)), PlacementStatus::Published));
    store.seed_placement(memory_placement(2, Some(date(2001, 1, 1)), PlacementStatus::Done));

    let report = sweep_overdue(&store, date(2025, 1, 1)).unwrap();
    assert_eq!(report.changed(), 0);
    assert_eq!(store.placement(1).unwrap().unwrap().status, PlacementStatus::Published);
    assert_eq!(store.placement(2).unwrap().unwrap().status, PlacementStatus::Done);
    assert_eq!(store.event_count(), 0);
}

/// Listing placements sweeps first, so the listing already shows Overdue.
#[test]
fn listing_sees_sweep_writes() {
    let desk = build_desk(date(2025, 3, 10));
    let owner = seed_owner(&desk);
    let late = book(&desk, owner, Some(date(2025, 3, 9)), PlacementStatus::Planning);

    let overdue = desk
        .list_placements(&PlacementFilter::with_status(PlacementStatus::Overdue))
        .unwrap();
    assert_eq!(overdue.len(), 1);
    assert_eq!(overdue[0].id, late);
}

/// Campaign detail sweeps first, so its placement list shows Overdue.
#[test]
fn campaign_detail_sees_sweep_writes() {
    let desk = build_desk(date(2025, 3, 10));
    let owner = seed_owner(&desk);
    let late = book(&desk, owner, Some(date(2025, 3, 1)), PlacementStatus::Agreed);
    book(&desk, owner, Some(date(2025, 3, 20)), PlacementStatus::Agreed);

    let detail = desk.campaign_detail(owner.0).unwrap();
    let statuses: Vec<(EntityId, PlacementStatus)> =
        detail.placements.iter().map(|p| (p.id, p.status)).collect();
    assert!(statuses.contains(&(late, PlacementStatus::Overdue)), "{statuses:?}");
    assert_eq!(
        statuses.iter().filter(|(_, s)| *s == PlacementStatus::Overdue).count(),
        1
    );
}

/// Building the dashboard runs the sweep and its writes persist.
#[test]
fn dashboard_persists_sweep_writes() {
    let desk = build_desk(date(2025, 3, 10));
    let owner = seed_owner(&desk);
    let late = book(&desk, owner, Some(date(2025, 3, 1)), PlacementStatus::PaidWaitingPublication);
    assert_eq!(status_of(&desk, late), PlacementStatus::PaidWaitingPublication);

    desk.dashboard(&DashboardFilter::default()).unwrap();
    assert_eq!(status_of(&desk, late), PlacementStatus::Overdue);
}

/// A read that fails after the sweep still leaves the sweep committed.
#[test]
fn failed_read_keeps_sweep_writes() {
    let desk = build_desk(date(2025, 3, 10));
    let owner = seed_owner(&desk);
    let late = book(&desk, owner, Some(date(2025, 3, 1)), PlacementStatus::Planning);

    assert!(matches!(
        desk.campaign_detail(999),
        Err(DeskError::NotFound { entity: "campaign", id: 999 })
    ));
    assert_eq!(status_of(&desk, late), PlacementStatus::Overdue);
    assert_eq!(desk.placement_history(late).unwrap().len(), 2);
}

/// With sweep_before_reads off, listings show stored status untouched.
#[test]
fn sweep_before_reads_can_be_disabled() {
    let config = DeskConfig {
        sweep_before_reads: false,
        ..DeskConfig::default_test()
    };
    let desk = Desk::open(config, Box::new(FixedClock::new(date(2025, 3, 10)))).unwrap();
    let owner = seed_owner(&desk);
    let late = book(&desk, owner, Some(date(2025, 3, 9)), PlacementStatus::Planning);

    let rows = desk.list_placements(&PlacementFilter::all()).unwrap();
    assert_eq!(rows[0].status, PlacementStatus::Planning);

    desk.sweep_overdue().unwrap();
    assert_eq!(status_of(&desk, late), PlacementStatus::Overdue);
}

/// Each promotion is recorded as a sweep-driven status change.
#[test]
fn sweep_records_history() {
    let desk = build_desk(date(2025, 3, 10));
    let owner = seed_owner(&desk);
    let late = book(&desk, owner, Some(date(2025, 3, 1)), PlacementStatus::Agreed);

    desk.sweep_overdue().unwrap();
    let history = desk.placement_history(late).unwrap();
    assert_eq!(history.len(), 2, "created + swept: {history:?}");
    assert_eq!(
        history[1],
        DeskEvent::PlacementStatusChanged {
            placement_id: late,
            from: PlacementStatus::Agreed,
            to: PlacementStatus::Overdue,
            actor: Actor::Sweep,
        }
    );
}

/// run_tasks drives the same sweep as a standalone scheduled pass.
#[test]
fn scheduled_run_matches_pre_read_sweep() {
    let mut desk = build_desk(date(2025, 3, 10));
    let owner = seed_owner(&desk);
    book(&desk, owner, Some(date(2025, 3, 1)), PlacementStatus::Planning);

    let events = desk.run_tasks().unwrap();
    assert_eq!(
        events,
        vec![DeskEvent::OverdueSweepCompleted {
            today: date(2025, 3, 10),
            changed: 1,
        }]
    );
    assert_eq!(desk.last_sweep_report().map(|r| r.changed()), Some(1));

    desk.run_tasks().unwrap();
    assert_eq!(desk.last_sweep_report().map(|r| r.changed()), Some(0));
}

/// The sweep works against any repository, including the in-memory one.
#[test]
fn desk_runs_on_memory_store() {
    let store = MemoryStore::new();
    let desk = Desk::build(
        store,
        Box::new(FixedClock::new(date(2025, 3, 10))),
        DeskConfig::default_test(),
    );
    let campaign = desk
        .create_campaign(NewCampaign { name: "c".into(), ..Default::default() })
        .unwrap();
    let blogger = desk
        .create_blogger(NewBlogger {
            name: "b".into(),
            url: "https://example.com/b".into(),
            ..Default::default()
        })
        .unwrap();
    let p = desk
        .create_placement(NewPlacement {
            campaign_id: campaign.id,
            blogger_id: blogger.id,
            scheduled_date: Some(date(2025, 3, 1)),
            ..Default::default()
        })
        .unwrap();

    assert_eq!(desk.sweep_overdue().unwrap().placement_ids, vec![p.id]);
    assert_eq!(desk.repo().event_count(), 2);
}
