//! Dashboard aggregation over published work.
//!
//! RULES:
//!   - Only qualifying placements (Published or Done) count toward
//!     spend, views, engagement and publications.
//!   - Absent optional fields contribute nothing; no aggregate divides
//!     by zero.
//!   - Reads only. Callers sweep before loading when status must be current.

use crate::{
    catalog::{CampaignStatus, CounterpartyType, PlacementStatus},
    error::DeskResult,
    model::{BloggerRecord, CampaignFilter, CampaignRecord, CounterpartyRecord, PlacementFilter,
            PlacementRecord},
    progress::{campaign_progress, CampaignProgress},
    repository::DeskRepository,
    types::{EntityId, Money},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Statuses whose placements count as delivered work.
pub const QUALIFYING_STATUSES: [PlacementStatus; 2] =
    [PlacementStatus::Published, PlacementStatus::Done];

pub fn is_qualifying(p: &PlacementRecord) -> bool {
    QUALIFYING_STATUSES.contains(&p.status)
}

/// Narrows the dashboard to one product and/or a scheduled-date window.
/// The default filter covers everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardFilter {
    pub product: Option<String>,
    /// Inclusive.
    pub from: Option<NaiveDate>,
    /// Inclusive.
    pub to: Option<NaiveDate>,
}

impl DashboardFilter {
    fn has_window(&self) -> bool {
        self.from.is_some() || self.to.is_some()
    }

    fn date_in_window(&self, date: Option<NaiveDate>) -> bool {
        if !self.has_window() {
            return true;
        }
        let Some(d) = date else {
            return false;
        };
        self.from.map_or(true, |f| d >= f) && self.to.map_or(true, |t| d <= t)
    }

    fn product_matches(&self, campaign: Option<&CampaignRecord>) -> bool {
        match self.product.as_deref() {
            None => true,
            Some(product) => campaign.and_then(|c| c.product.as_deref()) == Some(product),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub total_publications:  usize,
    pub total_spend:         Money,
    pub avg_cost_per_view:   f64,
    pub avg_engagement_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveCampaignProgress {
    pub campaign_id: EntityId,
    pub name:        String,
    pub spend:       Money,
    #[serde(flatten)]
    pub progress:    CampaignProgress,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopBlogger {
    pub blogger_id:        EntityId,
    pub name:              String,
    pub placements:        usize,
    pub spend:             Money,
    pub views:             u64,
    /// `None` when the blogger has no recorded views.
    pub avg_cost_per_view: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterpartySpend {
    pub kind:  CounterpartyType,
    pub spend: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub filter:                     DashboardFilter,
    #[serde(flatten)]
    pub summary:                    DashboardSummary,
    /// Ascending by campaign id.
    pub active_campaign_progress:   Vec<ActiveCampaignProgress>,
    pub top_bloggers:               Vec<TopBlogger>,
    pub spend_by_counterparty_type: Vec<CounterpartySpend>,
}

/// Snapshot of the entities the dashboard reads.
pub struct DashboardInput<'a> {
    pub placements:     &'a [PlacementRecord],
    pub campaigns:      &'a [CampaignRecord],
    pub bloggers:       &'a [BloggerRecord],
    pub counterparties: &'a [CounterpartyRecord],
}

// ── Aggregates ─────────────────────────────────────────────────────

/// Headline numbers over placements the caller has already narrowed to
/// qualifying ones.
pub fn summarize<'a, I>(qualifying: I) -> DashboardSummary
where
    I: IntoIterator<Item = &'a PlacementRecord>,
{
    let mut summary = DashboardSummary::default();
    let mut total_views: u64 = 0;
    let mut er_sum = 0.0;
    let mut er_count = 0usize;

    for p in qualifying {
        summary.total_publications += 1;
        summary.total_spend += p.fee.unwrap_or(0.0);
        if let Some(v) = p.views {
            total_views = total_views.saturating_add(v);
        }
        if let Some(er) = p.engagement_rate {
            er_sum += er;
            er_count += 1;
        }
    }

    summary.avg_cost_per_view = if total_views > 0 {
        summary.total_spend / total_views as f64
    } else {
        0.0
    };
    summary.avg_engagement_rate = if er_count > 0 {
        er_sum / er_count as f64
    } else {
        0.0
    };
    summary
}

/// Qualifying spend of one campaign.
pub fn campaign_spend(placements: &[PlacementRecord], campaign_id: EntityId) -> Money {
    placements
        .iter()
        .filter(|p| p.campaign_id == campaign_id && is_qualifying(p))
        .map(|p| p.fee.unwrap_or(0.0))
        .sum()
}

pub fn active_campaign_progress(
    campaigns: &[CampaignRecord],
    placements: &[PlacementRecord],
    product: Option<&str>,
    today: NaiveDate,
) -> Vec<ActiveCampaignProgress> {
    let mut entries: Vec<ActiveCampaignProgress> = campaigns
        .iter()
        .filter(|c| c.status == CampaignStatus::Active)
        .filter(|c| product.map_or(true, |p| c.product.as_deref() == Some(p)))
        .map(|c| {
            let spend = campaign_spend(placements, c.id);
            ActiveCampaignProgress {
                campaign_id: c.id,
                name: c.name.clone(),
                spend,
                progress: campaign_progress(c.start_date, c.end_date, c.budget, spend, today),
            }
        })
        .collect();
    entries.sort_by_key(|e| e.campaign_id);
    entries
}

pub fn top_bloggers(
    qualifying: &[&PlacementRecord],
    bloggers: &[BloggerRecord],
    limit: usize,
) -> Vec<TopBlogger> {
    let names: HashMap<EntityId, &str> =
        bloggers.iter().map(|b| (b.id, b.name.as_str())).collect();

    let mut per_blogger: BTreeMap<EntityId, TopBlogger> = BTreeMap::new();
    for p in qualifying {
        let entry = per_blogger.entry(p.blogger_id).or_insert_with(|| TopBlogger {
            blogger_id: p.blogger_id,
            name: names.get(&p.blogger_id).copied().unwrap_or_default().to_string(),
            placements: 0,
            spend: 0.0,
            views: 0,
            avg_cost_per_view: None,
        });
        entry.placements += 1;
        entry.spend += p.fee.unwrap_or(0.0);
        entry.views = entry.views.saturating_add(p.views.unwrap_or(0));
    }

    let mut ranked: Vec<TopBlogger> = per_blogger
        .into_values()
        .map(|mut b| {
            b.avg_cost_per_view = (b.views > 0).then(|| b.spend / b.views as f64);
            b
        })
        .collect();
    // BTreeMap iteration already gives ascending ids; a stable sort keeps them as tie-break.
    ranked.sort_by(|a, b| b.spend.total_cmp(&a.spend));
    ranked.truncate(limit);
    ranked
}

pub fn spend_by_counterparty_type(
    qualifying: &[&PlacementRecord],
    counterparties: &[CounterpartyRecord],
) -> Vec<CounterpartySpend> {
    let kinds: HashMap<EntityId, CounterpartyType> = counterparties
        .iter()
        .filter_map(|c| c.kind.map(|k| (c.id, k)))
        .collect();

    let mut totals: BTreeMap<CounterpartyType, Money> = BTreeMap::new();
    for p in qualifying {
        let Some(kind) = p.counterparty_id.and_then(|id| kinds.get(&id)) else {
            continue;
        };
        *totals.entry(*kind).or_insert(0.0) += p.fee.unwrap_or(0.0);
    }
    totals
        .into_iter()
        .map(|(kind, spend)| CounterpartySpend { kind, spend })
        .collect()
}

// ── Assembly ───────────────────────────────────────────────────────

pub fn build_dashboard(
    input: &DashboardInput<'_>,
    filter: &DashboardFilter,
    today: NaiveDate,
    top_limit: usize,
) -> Dashboard {
    let campaigns_by_id: HashMap<EntityId, &CampaignRecord> =
        input.campaigns.iter().map(|c| (c.id, c)).collect();

    let qualifying: Vec<&PlacementRecord> = input
        .placements
        .iter()
        .filter(|p| is_qualifying(p))
        .filter(|p| filter.date_in_window(p.scheduled_date))
        .filter(|p| filter.product_matches(campaigns_by_id.get(&p.campaign_id).copied()))
        .collect();

    Dashboard {
        filter: filter.clone(),
        summary: summarize(qualifying.iter().copied()),
        active_campaign_progress: active_campaign_progress(
            input.campaigns,
            input.placements,
            filter.product.as_deref(),
            today,
        ),
        top_bloggers: top_bloggers(&qualifying, input.bloggers, top_limit),
        spend_by_counterparty_type: spend_by_counterparty_type(&qualifying, input.counterparties),
    }
}

/// Read the snapshot from storage and build the dashboard.
pub fn load_dashboard<R>(
    repo: &R,
    filter: &DashboardFilter,
    today: NaiveDate,
    top_limit: usize,
) -> DeskResult<Dashboard>
where
    R: DeskRepository + ?Sized,
{
    let placements = repo.placements(&PlacementFilter::all())?;
    let campaigns = repo.campaigns(&CampaignFilter::default())?;
    let bloggers = repo.bloggers()?;
    let counterparties = repo.counterparties()?;
    log::debug!(
        "Dashboard snapshot: {} placements, {} campaigns",
        placements.len(),
        campaigns.len()
    );

    let input = DashboardInput {
        placements: &placements,
        campaigns: &campaigns,
        bloggers: &bloggers,
        counterparties: &counterparties,
    };
    Ok(build_dashboard(&input, filter, today, top_limit))
}
