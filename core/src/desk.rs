//! The desk: every operation the request layer can invoke.
//!
//! READ PATH (fixed):
//!   1. Overdue sweep, when `sweep_before_reads` is on. Its writes commit
//!      before anything is read.
//!   2. Snapshot read through the repository.
//!   3. Pure derivation (dashboard, progress).
//!
//! RULES:
//!   - Storage is injected; the desk never opens connections on its own
//!     except through `Desk::open`.
//!   - "Today" always comes from the injected clock.
//!   - Every placement status change lands in the event log.
//!   - Storage errors propagate unchanged. A read that fails after the
//!     sweep leaves the sweep committed.

use crate::{
    clock::DeskClock,
    config::DeskConfig,
    dashboard::{self, campaign_spend, Dashboard, DashboardFilter},
    error::{DeskError, DeskResult},
    event::{Actor, DeskEvent, EventLogEntry},
    export,
    model::{
        BloggerRecord, CampaignFilter, CampaignRecord, CampaignUpdate, CommentFilter,
        CommentRecord, CounterpartyRecord, NewBlogger, NewCampaign, NewComment, NewCounterparty,
        NewPlacement, NewPricePreset, NewUser, PlacementFilter, PlacementRecord, PlacementUpdate,
        PricePresetRecord, PricePresetUpdate, UserRecord, UserUpdate,
    },
    placement_rules,
    progress::{campaign_progress, CampaignProgress},
    repository::DeskRepository,
    status_policy::{self, OverdueSweep, SweepReport},
    store::DeskStore,
    task::DeskTask,
    types::{EntityId, Money},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::io::Write;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignSummary {
    #[serde(flatten)]
    pub campaign: CampaignRecord,
    pub spend:    Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignDetail {
    #[serde(flatten)]
    pub campaign:   CampaignRecord,
    pub spend:      Money,
    pub progress:   CampaignProgress,
    /// Newest first.
    pub placements: Vec<PlacementRecord>,
}

pub struct Desk<R: DeskRepository = DeskStore> {
    repo:   R,
    clock:  Box<dyn DeskClock>,
    config: DeskConfig,
    tasks:  Vec<Box<dyn DeskTask>>,
}

impl Desk<DeskStore> {
    /// Open (and migrate) the SQLite store named in `config`, with all
    /// tasks registered.
    pub fn open(config: DeskConfig, clock: Box<dyn DeskClock>) -> DeskResult<Self> {
        let store = if config.database_path == ":memory:" {
            DeskStore::in_memory()?
        } else {
            DeskStore::open(&config.database_path)?
        };
        store.migrate()?;
        Ok(Desk::build(store, clock, config))
    }
}

impl<R: DeskRepository> Desk<R> {
    pub fn new(repo: R, clock: Box<dyn DeskClock>, config: DeskConfig) -> Self {
        Self {
            repo,
            clock,
            config,
            tasks: Vec::new(),
        }
    }

    /// Build a desk with every task registered.
    /// Call this instead of new() + manual register() calls.
    pub fn build(repo: R, clock: Box<dyn DeskClock>, config: DeskConfig) -> Self {
        let mut desk = Desk::new(repo, clock, config);
        desk.register(Box::new(OverdueSweep::new()));
        desk
    }

    /// Register a task. Tasks run in registration order.
    pub fn register(&mut self, task: Box<dyn DeskTask>) {
        self.tasks.push(task);
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn config(&self) -> &DeskConfig {
        &self.config
    }

    // ── Tasks ──────────────────────────────────────────────────

    /// Run the overdue sweep on its own.
    pub fn sweep_overdue(&self) -> DeskResult<SweepReport> {
        status_policy::sweep_overdue(&self.repo, self.today())
    }

    /// Run every registered task once, in order. Summary events are
    /// appended to the log and returned.
    pub fn run_tasks(&mut self) -> DeskResult<Vec<DeskEvent>> {
        let today = self.clock.today();
        let mut all = Vec::new();
        for task in &mut self.tasks {
            let events = task.run(today, &self.repo)?;
            log::debug!("Task {} emitted {} event(s)", task.name(), events.len());
            for event in &events {
                self.repo.append_event(&EventLogEntry::new(today, event)?)?;
            }
            all.extend(events);
        }
        Ok(all)
    }

    /// The report of the last sweep run through `run_tasks`.
    pub fn last_sweep_report(&self) -> Option<&SweepReport> {
        self.tasks.iter().find_map(|t| {
            t.as_any()
                .downcast_ref::<OverdueSweep>()
                .and_then(|s| s.last_report())
        })
    }

    fn prepare_read(&self) -> DeskResult<()> {
        if self.config.sweep_before_reads {
            self.sweep_overdue()?;
        }
        Ok(())
    }

    // ── Directory ──────────────────────────────────────────────

    pub fn create_blogger(&self, b: NewBlogger) -> DeskResult<BloggerRecord> {
        if self.repo.blogger_by_url(&b.url)?.is_some() {
            return Err(DeskError::Duplicate {
                entity: "blogger",
                field: "url",
                value: b.url,
            });
        }
        let record = self.repo.insert_blogger(&b)?;
        log::info!("Blogger {} created ({})", record.id, record.url);
        Ok(record)
    }

    pub fn list_bloggers(&self) -> DeskResult<Vec<BloggerRecord>> {
        self.repo.bloggers()
    }

    pub fn create_counterparty(&self, c: NewCounterparty) -> DeskResult<CounterpartyRecord> {
        let record = self.repo.insert_counterparty(&c)?;
        log::info!("Counterparty {} created", record.id);
        Ok(record)
    }

    pub fn list_counterparties(&self) -> DeskResult<Vec<CounterpartyRecord>> {
        self.repo.counterparties()
    }

    /// Replace the blogger's counterparties. Unknown ids are dropped.
    /// Returns the linked ids, ascending.
    pub fn set_blogger_counterparties(
        &self,
        blogger_id: EntityId,
        counterparty_ids: &[EntityId],
    ) -> DeskResult<Vec<EntityId>> {
        if self.repo.blogger(blogger_id)?.is_none() {
            return Err(DeskError::not_found("blogger", blogger_id));
        }
        let mut known = Vec::with_capacity(counterparty_ids.len());
        for id in counterparty_ids {
            if self.repo.counterparty(*id)?.is_some() {
                known.push(*id);
            } else {
                log::warn!("Ignoring unknown counterparty {id} for blogger {blogger_id}");
            }
        }
        known.sort_unstable();
        known.dedup();
        self.repo.replace_blogger_counterparties(blogger_id, &known)?;
        self.repo.blogger_counterparty_ids(blogger_id)
    }

    pub fn counterparties_for_blogger(
        &self,
        blogger_id: EntityId,
    ) -> DeskResult<Vec<CounterpartyRecord>> {
        let mut out = Vec::new();
        for id in self.repo.blogger_counterparty_ids(blogger_id)? {
            if let Some(c) = self.repo.counterparty(id)? {
                out.push(c);
            }
        }
        Ok(out)
    }

    pub fn create_user(&self, u: NewUser) -> DeskResult<UserRecord> {
        if self.repo.user_by_email(&u.email)?.is_some() {
            return Err(DeskError::Duplicate {
                entity: "user",
                field: "email",
                value: u.email,
            });
        }
        self.repo.insert_user(&u)
    }

    pub fn list_users(&self) -> DeskResult<Vec<UserRecord>> {
        self.repo.users()
    }

    /// Rename, change role, or move between invited/active/deactivated.
    pub fn update_user(&self, id: EntityId, update: UserUpdate) -> DeskResult<UserRecord> {
        let mut user = self
            .repo
            .user(id)?
            .ok_or_else(|| DeskError::not_found("user", id))?;
        if update.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(DeskError::rule("user name cannot be empty"));
        }
        update.apply(&mut user);
        self.repo.save_user(&user)?;
        log::info!("User {id} updated ({}, {})", user.role, user.status);
        Ok(user)
    }

    // ── Price presets ──────────────────────────────────────────

    pub fn create_price_preset(&self, p: NewPricePreset) -> DeskResult<PricePresetRecord> {
        check_preset(&p.title, p.cost)?;
        if self.repo.blogger(p.blogger_id)?.is_none() {
            return Err(DeskError::not_found("blogger", p.blogger_id));
        }
        let record = self.repo.insert_price_preset(&p)?;
        log::info!("Price preset {} created for blogger {}", record.id, record.blogger_id);
        Ok(record)
    }

    pub fn update_price_preset(
        &self,
        id: EntityId,
        update: PricePresetUpdate,
    ) -> DeskResult<PricePresetRecord> {
        let mut preset = self
            .repo
            .price_preset(id)?
            .ok_or_else(|| DeskError::not_found("price preset", id))?;
        if let Some(b) = update.blogger_id {
            if self.repo.blogger(b)?.is_none() {
                return Err(DeskError::not_found("blogger", b));
            }
        }
        update.apply(&mut preset);
        check_preset(&preset.title, preset.cost)?;
        self.repo.save_price_preset(&preset)?;
        Ok(preset)
    }

    pub fn delete_price_preset(&self, id: EntityId) -> DeskResult<()> {
        if self.repo.price_preset(id)?.is_none() {
            return Err(DeskError::not_found("price preset", id));
        }
        self.repo.delete_price_preset(id)?;
        log::info!("Price preset {id} deleted");
        Ok(())
    }

    /// Newest first; every blogger's presets when `blogger_id` is `None`.
    pub fn list_price_presets(
        &self,
        blogger_id: Option<EntityId>,
    ) -> DeskResult<Vec<PricePresetRecord>> {
        self.repo.price_presets(blogger_id)
    }

    // ── Comments ───────────────────────────────────────────────

    /// Attach a note to a blogger, counterparty and/or placement.
    /// Every referenced entity must exist.
    pub fn create_comment(&self, c: NewComment) -> DeskResult<CommentRecord> {
        if c.body.trim().is_empty() {
            return Err(DeskError::rule("comment body cannot be empty"));
        }
        if !c.has_target() {
            return Err(DeskError::rule(
                "comment needs a blogger, counterparty or placement",
            ));
        }
        if let Some(id) = c.author_id {
            if self.repo.user(id)?.is_none() {
                return Err(DeskError::not_found("user", id));
            }
        }
        if let Some(id) = c.blogger_id {
            if self.repo.blogger(id)?.is_none() {
                return Err(DeskError::not_found("blogger", id));
            }
        }
        if let Some(id) = c.counterparty_id {
            if self.repo.counterparty(id)?.is_none() {
                return Err(DeskError::not_found("counterparty", id));
            }
        }
        if let Some(id) = c.placement_id {
            if self.repo.placement(id)?.is_none() {
                return Err(DeskError::not_found("placement", id));
            }
        }
        self.repo.insert_comment(&c, self.today())
    }

    pub fn list_comments(&self, filter: &CommentFilter) -> DeskResult<Vec<CommentRecord>> {
        self.repo.comments(filter)
    }

    // ── Campaigns ──────────────────────────────────────────────

    pub fn create_campaign(&self, c: NewCampaign) -> DeskResult<CampaignRecord> {
        let record = self.repo.insert_campaign(&c)?;
        log::info!("Campaign {} created ({})", record.id, record.status);
        Ok(record)
    }

    pub fn update_campaign(&self, id: EntityId, update: CampaignUpdate) -> DeskResult<CampaignRecord> {
        let mut campaign = self
            .repo
            .campaign(id)?
            .ok_or_else(|| DeskError::not_found("campaign", id))?;
        update.apply(&mut campaign);
        self.repo.save_campaign(&campaign)?;
        Ok(campaign)
    }

    pub fn list_campaigns(&self, filter: &CampaignFilter) -> DeskResult<Vec<CampaignSummary>> {
        let campaigns = self.repo.campaigns(filter)?;
        let placements = self.repo.placements(&PlacementFilter::all())?;
        Ok(campaigns
            .into_iter()
            .map(|campaign| CampaignSummary {
                spend: campaign_spend(&placements, campaign.id),
                campaign,
            })
            .collect())
    }

    pub fn campaign_detail(&self, id: EntityId) -> DeskResult<CampaignDetail> {
        self.prepare_read()?;
        let campaign = self
            .repo
            .campaign(id)?
            .ok_or_else(|| DeskError::not_found("campaign", id))?;
        let placements = self.repo.placements(&PlacementFilter::for_campaign(id))?;
        let spend = campaign_spend(&placements, id);
        let progress = campaign_progress(
            campaign.start_date,
            campaign.end_date,
            campaign.budget,
            spend,
            self.today(),
        );
        Ok(CampaignDetail {
            campaign,
            spend,
            progress,
            placements,
        })
    }

    // ── Placements ─────────────────────────────────────────────

    pub fn create_placement(&self, p: NewPlacement) -> DeskResult<PlacementRecord> {
        placement_rules::check_create(&p)?;
        if self.repo.campaign(p.campaign_id)?.is_none() {
            return Err(DeskError::not_found("campaign", p.campaign_id));
        }
        if self.repo.blogger(p.blogger_id)?.is_none() {
            return Err(DeskError::not_found("blogger", p.blogger_id));
        }
        if let Some(cp) = p.counterparty_id {
            if self.repo.counterparty(cp)?.is_none() {
                return Err(DeskError::not_found("counterparty", cp));
            }
        }

        let record = self.repo.insert_placement(&p, self.today())?;
        log::info!(
            "Placement {} created in campaign {} ({})",
            record.id,
            record.campaign_id,
            record.status
        );
        Ok(record)
    }

    pub fn update_placement(&self, id: EntityId, update: PlacementUpdate) -> DeskResult<PlacementRecord> {
        let current = self
            .repo
            .placement(id)?
            .ok_or_else(|| DeskError::not_found("placement", id))?;
        if let Err(e) = placement_rules::check_update(&current, &update) {
            log::warn!("Rejected update of placement {id}: {e}");
            return Err(e);
        }
        if let Some(b) = update.blogger_id {
            if self.repo.blogger(b)?.is_none() {
                return Err(DeskError::not_found("blogger", b));
            }
        }
        if let Some(cp) = update.counterparty_id {
            if self.repo.counterparty(cp)?.is_none() {
                return Err(DeskError::not_found("counterparty", cp));
            }
        }

        let mut next = current.clone();
        update.apply(&mut next);

        let mut events = Vec::new();
        if next.status != current.status {
            let event = DeskEvent::PlacementStatusChanged {
                placement_id: id,
                from: current.status,
                to: next.status,
                actor: Actor::Manager,
            };
            events.push(EventLogEntry::new(self.today(), &event)?);
        }
        self.repo.save_placement(&next, &events)?;
        if !events.is_empty() {
            log::info!("Placement {id}: {} -> {}", current.status, next.status);
        }
        Ok(next)
    }

    pub fn delete_placement(&self, id: EntityId) -> DeskResult<()> {
        let current = self
            .repo
            .placement(id)?
            .ok_or_else(|| DeskError::not_found("placement", id))?;
        placement_rules::check_delete(&current)?;
        let deleted = DeskEvent::PlacementDeleted { placement_id: id };
        let entry = EventLogEntry::new(self.today(), &deleted)?;
        self.repo.delete_placement(id, &[entry])?;
        log::info!("Placement {id} deleted");
        Ok(())
    }

    pub fn list_placements(&self, filter: &PlacementFilter) -> DeskResult<Vec<PlacementRecord>> {
        self.prepare_read()?;
        self.repo.placements(filter)
    }

    /// Status history of one placement, oldest first.
    pub fn placement_history(&self, id: EntityId) -> DeskResult<Vec<DeskEvent>> {
        self.repo
            .events_for_placement(id)?
            .iter()
            .map(|e| e.event().map_err(DeskError::from))
            .collect()
    }

    // ── Reporting ──────────────────────────────────────────────

    pub fn dashboard(&self, filter: &DashboardFilter) -> DeskResult<Dashboard> {
        self.prepare_read()?;
        dashboard::load_dashboard(
            &self.repo,
            filter,
            self.today(),
            self.config.top_bloggers_limit,
        )
    }

    /// Write the prepayment CSV to `out`. Returns the number of rows.
    pub fn export_prepayments<W: Write>(&self, out: W) -> DeskResult<usize> {
        let rows = export::prepayment_rows(&self.repo)?;
        let n = export::write_prepayments(&rows, &self.config.export, out)?;
        log::info!("Exported {n} prepayment row(s)");
        Ok(n)
    }
}

fn check_preset(title: &str, cost: Money) -> DeskResult<()> {
    if title.trim().is_empty() {
        return Err(DeskError::rule("price preset title cannot be empty"));
    }
    if !(cost >= 0.0) {
        return Err(DeskError::rule(format!(
            "price preset cost must be non-negative, got {cost}"
        )));
    }
    Ok(())
}
