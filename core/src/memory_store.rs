//! In-process `DeskRepository`.
//!
//! Holds everything in ordered maps. Behaves like `DeskStore` for every
//! repository call, including newest-first ordering of listings.

use crate::{
    catalog::{PlacementStatus, UserStatus},
    error::DeskResult,
    event::{DeskEvent, EventLogEntry},
    model::{
        BloggerRecord, CampaignFilter, CampaignRecord, CommentFilter, CommentRecord,
        CounterpartyRecord, NewBlogger, NewCampaign, NewComment, NewCounterparty, NewPlacement,
        NewPricePreset, NewUser, PlacementFilter, PlacementRecord, PricePresetRecord, UserRecord,
    },
    repository::DeskRepository,
    types::EntityId,
};
use chrono::NaiveDate;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Default)]
struct MemoryState {
    next_id:        EntityId,
    bloggers:       BTreeMap<EntityId, BloggerRecord>,
    counterparties: BTreeMap<EntityId, CounterpartyRecord>,
    links:          BTreeSet<(EntityId, EntityId)>,
    users:          BTreeMap<EntityId, UserRecord>,
    campaigns:      BTreeMap<EntityId, CampaignRecord>,
    placements:     BTreeMap<EntityId, PlacementRecord>,
    presets:        BTreeMap<EntityId, PricePresetRecord>,
    comments:       BTreeMap<EntityId, CommentRecord>,
    events:         Vec<EventLogEntry>,
}

impl MemoryState {
    fn allocate_id(&mut self) -> EntityId {
        self.next_id += 1;
        self.next_id
    }

    fn push_events(&mut self, entries: &[EventLogEntry]) {
        for entry in entries {
            let mut entry = entry.clone();
            entry.id = Some(self.events.len() as i64 + 1);
            self.events.push(entry);
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RefCell<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a placement in place as-is, bypassing desk rules.
    /// Lets tests seed states (such as `Overdue`) that only the sweep produces.
    pub fn seed_placement(&self, p: PlacementRecord) {
        let mut state = self.state.borrow_mut();
        state.next_id = state.next_id.max(p.id);
        state.placements.insert(p.id, p);
    }

    /// Put a campaign in place as-is.
    pub fn seed_campaign(&self, c: CampaignRecord) {
        let mut state = self.state.borrow_mut();
        state.next_id = state.next_id.max(c.id);
        state.campaigns.insert(c.id, c);
    }

    pub fn event_count(&self) -> usize {
        self.state.borrow().events.len()
    }
}

impl DeskRepository for MemoryStore {
    fn insert_blogger(&self, b: &NewBlogger) -> DeskResult<BloggerRecord> {
        let mut state = self.state.borrow_mut();
        let record = BloggerRecord {
            id: state.allocate_id(),
            name: b.name.clone(),
            url: b.url.clone(),
            network: b.network,
            subscribers: b.subscribers,
            avg_reach: b.avg_reach,
            contact_type: b.contact_type,
            contact_value: b.contact_value.clone(),
        };
        state.bloggers.insert(record.id, record.clone());
        Ok(record)
    }

    fn blogger(&self, id: EntityId) -> DeskResult<Option<BloggerRecord>> {
        Ok(self.state.borrow().bloggers.get(&id).cloned())
    }

    fn blogger_by_url(&self, url: &str) -> DeskResult<Option<BloggerRecord>> {
        Ok(self
            .state
            .borrow()
            .bloggers
            .values()
            .find(|b| b.url == url)
            .cloned())
    }

    fn bloggers(&self) -> DeskResult<Vec<BloggerRecord>> {
        Ok(self.state.borrow().bloggers.values().rev().cloned().collect())
    }

    fn insert_counterparty(&self, c: &NewCounterparty) -> DeskResult<CounterpartyRecord> {
        let mut state = self.state.borrow_mut();
        let record = CounterpartyRecord {
            id: state.allocate_id(),
            name: c.name.clone(),
            kind: c.kind,
            tax_id: c.tax_id.clone(),
            relationship_type: c.relationship_type,
            payment_details: c.payment_details.clone(),
            notes: c.notes.clone(),
        };
        state.counterparties.insert(record.id, record.clone());
        Ok(record)
    }

    fn counterparty(&self, id: EntityId) -> DeskResult<Option<CounterpartyRecord>> {
        Ok(self.state.borrow().counterparties.get(&id).cloned())
    }

    fn counterparties(&self) -> DeskResult<Vec<CounterpartyRecord>> {
        Ok(self.state.borrow().counterparties.values().rev().cloned().collect())
    }

    fn replace_blogger_counterparties(
        &self,
        blogger_id: EntityId,
        counterparty_ids: &[EntityId],
    ) -> DeskResult<()> {
        let mut state = self.state.borrow_mut();
        state.links.retain(|(b, _)| *b != blogger_id);
        for id in counterparty_ids {
            state.links.insert((blogger_id, *id));
        }
        Ok(())
    }

    fn blogger_counterparty_ids(&self, blogger_id: EntityId) -> DeskResult<Vec<EntityId>> {
        Ok(self
            .state
            .borrow()
            .links
            .iter()
            .filter(|(b, _)| *b == blogger_id)
            .map(|(_, c)| *c)
            .collect())
    }

    fn insert_user(&self, u: &NewUser) -> DeskResult<UserRecord> {
        let mut state = self.state.borrow_mut();
        let record = UserRecord {
            id: state.allocate_id(),
            name: u.name.clone(),
            email: u.email.clone(),
            role: u.role,
            status: UserStatus::Invited,
        };
        state.users.insert(record.id, record.clone());
        Ok(record)
    }

    fn user_by_email(&self, email: &str) -> DeskResult<Option<UserRecord>> {
        Ok(self
            .state
            .borrow()
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    fn user(&self, id: EntityId) -> DeskResult<Option<UserRecord>> {
        Ok(self.state.borrow().users.get(&id).cloned())
    }

    fn users(&self) -> DeskResult<Vec<UserRecord>> {
        Ok(self.state.borrow().users.values().cloned().collect())
    }

    fn save_user(&self, u: &UserRecord) -> DeskResult<()> {
        self.state.borrow_mut().users.insert(u.id, u.clone());
        Ok(())
    }

    fn insert_price_preset(&self, p: &NewPricePreset) -> DeskResult<PricePresetRecord> {
        let mut state = self.state.borrow_mut();
        let record = PricePresetRecord {
            id: state.allocate_id(),
            blogger_id: p.blogger_id,
            title: p.title.clone(),
            description: p.description.clone(),
            cost: p.cost,
        };
        state.presets.insert(record.id, record.clone());
        Ok(record)
    }

    fn price_preset(&self, id: EntityId) -> DeskResult<Option<PricePresetRecord>> {
        Ok(self.state.borrow().presets.get(&id).cloned())
    }

    fn price_presets(&self, blogger_id: Option<EntityId>) -> DeskResult<Vec<PricePresetRecord>> {
        Ok(self
            .state
            .borrow()
            .presets
            .values()
            .rev()
            .filter(|p| blogger_id.map_or(true, |b| p.blogger_id == b))
            .cloned()
            .collect())
    }

    fn save_price_preset(&self, p: &PricePresetRecord) -> DeskResult<()> {
        self.state.borrow_mut().presets.insert(p.id, p.clone());
        Ok(())
    }

    fn delete_price_preset(&self, id: EntityId) -> DeskResult<()> {
        self.state.borrow_mut().presets.remove(&id);
        Ok(())
    }

    fn insert_comment(&self, c: &NewComment, created_on: NaiveDate) -> DeskResult<CommentRecord> {
        let mut state = self.state.borrow_mut();
        let record = CommentRecord {
            id: state.allocate_id(),
            body: c.body.clone(),
            author_id: c.author_id,
            blogger_id: c.blogger_id,
            counterparty_id: c.counterparty_id,
            placement_id: c.placement_id,
            created_on,
        };
        state.comments.insert(record.id, record.clone());
        Ok(record)
    }

    fn comments(&self, filter: &CommentFilter) -> DeskResult<Vec<CommentRecord>> {
        Ok(self
            .state
            .borrow()
            .comments
            .values()
            .rev()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect())
    }

    fn insert_campaign(&self, c: &NewCampaign) -> DeskResult<CampaignRecord> {
        let mut state = self.state.borrow_mut();
        let record = CampaignRecord {
            id: state.allocate_id(),
            name: c.name.clone(),
            product: c.product.clone(),
            goal_type: c.goal_type,
            budget: c.budget,
            status: c.status.unwrap_or_default(),
            start_date: c.start_date,
            end_date: c.end_date,
        };
        state.campaigns.insert(record.id, record.clone());
        Ok(record)
    }

    fn campaign(&self, id: EntityId) -> DeskResult<Option<CampaignRecord>> {
        Ok(self.state.borrow().campaigns.get(&id).cloned())
    }

    fn campaigns(&self, filter: &CampaignFilter) -> DeskResult<Vec<CampaignRecord>> {
        Ok(self
            .state
            .borrow()
            .campaigns
            .values()
            .rev()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect())
    }

    fn save_campaign(&self, c: &CampaignRecord) -> DeskResult<()> {
        self.state.borrow_mut().campaigns.insert(c.id, c.clone());
        Ok(())
    }

    fn insert_placement(&self, p: &NewPlacement, recorded_on: NaiveDate) -> DeskResult<PlacementRecord> {
        let mut state = self.state.borrow_mut();
        let record = p.to_record(state.allocate_id());
        let entry = EventLogEntry::new(recorded_on, &DeskEvent::placement_created(&record))?;
        state.placements.insert(record.id, record.clone());
        state.push_events(&[entry]);
        Ok(record)
    }

    fn placement(&self, id: EntityId) -> DeskResult<Option<PlacementRecord>> {
        Ok(self.state.borrow().placements.get(&id).cloned())
    }

    fn placements(&self, filter: &PlacementFilter) -> DeskResult<Vec<PlacementRecord>> {
        Ok(self
            .state
            .borrow()
            .placements
            .values()
            .rev()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect())
    }

    fn save_placement(&self, p: &PlacementRecord, events: &[EventLogEntry]) -> DeskResult<()> {
        let mut state = self.state.borrow_mut();
        state.placements.insert(p.id, p.clone());
        state.push_events(events);
        Ok(())
    }

    fn delete_placement(&self, id: EntityId, events: &[EventLogEntry]) -> DeskResult<()> {
        let mut state = self.state.borrow_mut();
        state.placements.remove(&id);
        state.comments.retain(|_, c| c.placement_id != Some(id));
        state.push_events(events);
        Ok(())
    }

    fn mark_overdue(&self, ids: &[EntityId], events: &[EventLogEntry]) -> DeskResult<usize> {
        let mut state = self.state.borrow_mut();
        let mut written = 0;
        for id in ids {
            if let Some(p) = state.placements.get_mut(id) {
                p.status = PlacementStatus::Overdue;
                written += 1;
            }
        }
        state.push_events(events);
        Ok(written)
    }

    fn append_event(&self, entry: &EventLogEntry) -> DeskResult<()> {
        self.state.borrow_mut().push_events(std::slice::from_ref(entry));
        Ok(())
    }

    fn events_for_placement(&self, placement_id: EntityId) -> DeskResult<Vec<EventLogEntry>> {
        Ok(self
            .state
            .borrow()
            .events
            .iter()
            .filter(|e| e.placement_id == Some(placement_id))
            .cloned()
            .collect())
    }
}
