//! Placement editing rules, history and campaign spend, through the desk.

use chrono::NaiveDate;
use influence_core::{
    catalog::{CampaignStatus, PlacementStatus},
    clock::FixedClock,
    config::DeskConfig,
    desk::Desk,
    error::DeskError,
    event::{Actor, DeskEvent},
    model::{
        CampaignFilter, CampaignUpdate, NewBlogger, NewCampaign, NewPlacement, PlacementFilter,
        PlacementUpdate,
    },
    progress::AdvisoryFlag,
    repository::DeskRepository,
    store::DeskStore,
    types::EntityId,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Desk with one campaign and one blogger; returns (desk, campaign, blogger).
fn build_desk() -> (Desk<DeskStore>, EntityId, EntityId) {
    let _ = env_logger::builder().is_test(true).try_init();
    let desk = Desk::open(
        DeskConfig::default_test(),
        Box::new(FixedClock::new(date(2025, 5, 1))),
    )
    .unwrap();
    let campaign = desk
        .create_campaign(NewCampaign {
            name: "May drop".into(),
            status: Some(CampaignStatus::Active),
            budget: Some(2000.0),
            start_date: Some(date(2025, 5, 1)),
            end_date: Some(date(2025, 5, 31)),
            ..Default::default()
        })
        .unwrap();
    let blogger = desk
        .create_blogger(NewBlogger {
            name: "Lev".into(),
            url: "https://example.com/lev".into(),
            ..Default::default()
        })
        .unwrap();
    (desk, campaign.id, blogger.id)
}

fn planning(campaign: EntityId, blogger: EntityId) -> NewPlacement {
    NewPlacement {
        campaign_id: campaign,
        blogger_id: blogger,
        ..Default::default()
    }
}

fn is_rule(result: Result<impl std::fmt::Debug, DeskError>) -> bool {
    matches!(result, Err(DeskError::Rule(_)))
}

/// New placements default to Planning.
#[test]
fn new_placement_starts_in_planning() {
    let (desk, c, b) = build_desk();
    let p = desk.create_placement(planning(c, b)).unwrap();
    assert_eq!(p.status, PlacementStatus::Planning);
    assert_eq!(p.fee, None);
}

/// Agreed needs a fee and a date, at creation and on transition.
#[test]
fn agreed_requires_fee_and_date() {
    let (desk, c, b) = build_desk();
    let bare = NewPlacement {
        status: Some(PlacementStatus::Agreed),
        ..planning(c, b)
    };
    assert!(is_rule(desk.create_placement(bare)));

    let p = desk.create_placement(planning(c, b)).unwrap();
    let to_agreed = PlacementUpdate {
        status: Some(PlacementStatus::Agreed),
        ..Default::default()
    };
    assert!(is_rule(desk.update_placement(p.id, to_agreed)));

    let complete = PlacementUpdate {
        status: Some(PlacementStatus::Agreed),
        fee: Some(400.0),
        scheduled_date: Some(date(2025, 5, 20)),
        ..Default::default()
    };
    let agreed = desk.update_placement(p.id, complete).unwrap();
    assert_eq!(agreed.status, PlacementStatus::Agreed);
    assert_eq!(agreed.fee, Some(400.0));
}

/// Once payment is pending the fee cannot move.
#[test]
fn fee_locked_after_payment_starts() {
    let (desk, c, b) = build_desk();
    let p = desk
        .create_placement(NewPlacement {
            status: Some(PlacementStatus::WaitingPayment),
            fee: Some(300.0),
            scheduled_date: Some(date(2025, 5, 20)),
            ..planning(c, b)
        })
        .unwrap();

    let raise = PlacementUpdate {
        fee: Some(350.0),
        ..Default::default()
    };
    assert!(is_rule(desk.update_placement(p.id, raise)));

    let stored = desk.list_placements(&PlacementFilter::all()).unwrap();
    assert_eq!(stored[0].fee, Some(300.0));
}

/// Declined placements take status changes only.
#[test]
fn declined_accepts_only_status() {
    let (desk, c, b) = build_desk();
    let p = desk
        .create_placement(NewPlacement {
            status: Some(PlacementStatus::Declined),
            ..planning(c, b)
        })
        .unwrap();

    let relink = PlacementUpdate {
        link: Some("https://example.com/post".into()),
        ..Default::default()
    };
    assert!(is_rule(desk.update_placement(p.id, relink)));

    let reopen = PlacementUpdate {
        status: Some(PlacementStatus::Planning),
        ..Default::default()
    };
    assert_eq!(
        desk.update_placement(p.id, reopen).unwrap().status,
        PlacementStatus::Planning
    );
}

/// Overdue belongs to the sweep; managers cannot set it.
#[test]
fn manual_overdue_is_rejected() {
    let (desk, c, b) = build_desk();
    let create = NewPlacement {
        status: Some(PlacementStatus::Overdue),
        ..planning(c, b)
    };
    assert!(is_rule(desk.create_placement(create)));

    let p = desk.create_placement(planning(c, b)).unwrap();
    let update = PlacementUpdate {
        status: Some(PlacementStatus::Overdue),
        ..Default::default()
    };
    assert!(is_rule(desk.update_placement(p.id, update)));
}

/// Only Planning placements can be deleted.
#[test]
fn delete_only_in_planning() {
    let (desk, c, b) = build_desk();
    let keep = desk
        .create_placement(NewPlacement {
            status: Some(PlacementStatus::Published),
            fee: Some(10.0),
            ..planning(c, b)
        })
        .unwrap();
    let drop = desk.create_placement(planning(c, b)).unwrap();

    assert!(is_rule(desk.delete_placement(keep.id)));
    desk.delete_placement(drop.id).unwrap();

    let left: Vec<EntityId> = desk
        .list_placements(&PlacementFilter::all())
        .unwrap()
        .iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(left, vec![keep.id]);
    assert_eq!(
        desk.placement_history(drop.id).unwrap().last(),
        Some(&DeskEvent::PlacementDeleted { placement_id: drop.id })
    );
}

/// Unknown ids surface as NotFound.
#[test]
fn unknown_references_are_not_found() {
    let (desk, c, b) = build_desk();
    assert!(matches!(
        desk.create_placement(planning(999, b)),
        Err(DeskError::NotFound { entity: "campaign", id: 999 })
    ));
    assert!(matches!(
        desk.create_placement(planning(c, 999)),
        Err(DeskError::NotFound { entity: "blogger", .. })
    ));
    assert!(matches!(
        desk.update_placement(999, PlacementUpdate::default()),
        Err(DeskError::NotFound { entity: "placement", .. })
    ));
    assert!(matches!(
        desk.campaign_detail(999),
        Err(DeskError::NotFound { entity: "campaign", .. })
    ));
}

/// Manager changes are logged in order; no-op updates log nothing.
#[test]
fn history_tracks_manager_changes() {
    let (desk, c, b) = build_desk();
    let p = desk.create_placement(planning(c, b)).unwrap();

    desk.update_placement(
        p.id,
        PlacementUpdate {
            views: Some(10),
            ..Default::default()
        },
    )
    .unwrap();
    desk.update_placement(
        p.id,
        PlacementUpdate {
            status: Some(PlacementStatus::Agreed),
            fee: Some(100.0),
            scheduled_date: Some(date(2025, 5, 10)),
            ..Default::default()
        },
    )
    .unwrap();

    let history = desk.placement_history(p.id).unwrap();
    assert_eq!(
        history,
        vec![
            DeskEvent::PlacementCreated {
                placement_id: p.id,
                campaign_id: c,
                status: PlacementStatus::Planning,
            },
            DeskEvent::PlacementStatusChanged {
                placement_id: p.id,
                from: PlacementStatus::Planning,
                to: PlacementStatus::Agreed,
                actor: Actor::Manager,
            },
        ]
    );
}

/// Campaign listing and detail carry qualifying spend and progress.
#[test]
fn campaign_views_carry_spend() {
    let (desk, c, b) = build_desk();
    desk.create_placement(NewPlacement {
        status: Some(PlacementStatus::Done),
        fee: Some(500.0),
        scheduled_date: Some(date(2025, 5, 1)),
        ..planning(c, b)
    })
    .unwrap();
    desk.create_placement(NewPlacement {
        status: Some(PlacementStatus::WaitingPayment),
        fee: Some(700.0),
        scheduled_date: Some(date(2025, 5, 15)),
        ..planning(c, b)
    })
    .unwrap();

    let listed = desk.list_campaigns(&CampaignFilter::active()).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].spend, 500.0);

    let detail = desk.campaign_detail(c).unwrap();
    assert_eq!(detail.spend, 500.0);
    assert_eq!(detail.placements.len(), 2);
    assert_eq!(detail.progress.time_fraction, 0.0);
    assert_eq!(detail.progress.budget_fraction, 0.25);
    assert_eq!(detail.progress.advisory_flag, AdvisoryFlag::OnTrack);
}

/// Partial campaign updates leave untouched fields alone.
#[test]
fn campaign_update_is_partial() {
    let (desk, c, _) = build_desk();
    let updated = desk
        .update_campaign(
            c,
            CampaignUpdate {
                status: Some(CampaignStatus::Completed),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(updated.status, CampaignStatus::Completed);
    assert_eq!(updated.name, "May drop");
    assert_eq!(updated.budget, Some(2000.0));
    assert!(desk.list_campaigns(&CampaignFilter::active()).unwrap().is_empty());
}

/// Engagement counts and tracking fields given at creation are stored.
#[test]
fn creation_keeps_engagement_and_tracking_fields() {
    let (desk, c, b) = build_desk();
    let payload = format!(
        r#"{{"campaign_id":{c},"blogger_id":{b},"likes":42,"shares":7,"tracking_link":"https://t"}}"#
    );
    let new: NewPlacement = serde_json::from_str(&payload).unwrap();
    let created = desk.create_placement(new).unwrap();
    assert_eq!(created.likes, Some(42));
    assert_eq!(created.shares, Some(7));
    assert_eq!(created.comments, None);
    assert_eq!(created.tracking_link.as_deref(), Some("https://t"));

    let stored = desk.repo().placement(created.id).unwrap().unwrap();
    assert_eq!(stored, created);

    let full = desk
        .create_placement(NewPlacement {
            comments: Some(3),
            ad_token: Some("erid-2VtzqwQ".into()),
            ..planning(c, b)
        })
        .unwrap();
    let stored = desk.repo().placement(full.id).unwrap().unwrap();
    assert_eq!(stored.comments, Some(3));
    assert_eq!(stored.ad_token.as_deref(), Some("erid-2VtzqwQ"));
}
