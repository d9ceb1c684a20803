//! Records held by the desk and the payloads used to create or change them.

use crate::{
    catalog::{
        CampaignStatus, ContactType, CounterpartyType, GoalType, PaymentTerms, PlacementStatus,
        PlacementType, PricingModel, RelationshipType, Role, SocialNetwork, UserStatus,
    },
    types::{EntityId, Money},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ── Directory ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BloggerRecord {
    pub id:            EntityId,
    pub name:          String,
    pub url:           String,
    pub network:       Option<SocialNetwork>,
    pub subscribers:   Option<u64>,
    pub avg_reach:     Option<u64>,
    pub contact_type:  Option<ContactType>,
    pub contact_value: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewBlogger {
    pub name: String,
    pub url:  String,
    #[serde(default)]
    pub network: Option<SocialNetwork>,
    #[serde(default)]
    pub subscribers: Option<u64>,
    #[serde(default)]
    pub avg_reach: Option<u64>,
    #[serde(default)]
    pub contact_type: Option<ContactType>,
    #[serde(default)]
    pub contact_value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterpartyRecord {
    pub id:                EntityId,
    pub name:              String,
    pub kind:              Option<CounterpartyType>,
    pub tax_id:            Option<String>,
    pub relationship_type: Option<RelationshipType>,
    pub payment_details:   Option<String>,
    pub notes:             Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewCounterparty {
    pub name: String,
    #[serde(default)]
    pub kind: Option<CounterpartyType>,
    #[serde(default)]
    pub tax_id: Option<String>,
    #[serde(default)]
    pub relationship_type: Option<RelationshipType>,
    #[serde(default)]
    pub payment_details: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id:     EntityId,
    pub name:   String,
    pub email:  String,
    pub role:   Role,
    pub status: UserStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub name:  String,
    pub email: String,
    #[serde(default = "default_role")]
    pub role: Role,
}

fn default_role() -> Role {
    Role::Manager
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UserUpdate {
    pub name:   Option<String>,
    pub role:   Option<Role>,
    pub status: Option<UserStatus>,
}

impl UserUpdate {
    pub fn apply(self, u: &mut UserRecord) {
        if let Some(v) = self.name   { u.name = v; }
        if let Some(v) = self.role   { u.role = v; }
        if let Some(v) = self.status { u.status = v; }
    }
}

// ── Price presets ──────────────────────────────────────────────────

/// A blogger's standing offer, e.g. "story + post" at a fixed cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePresetRecord {
    pub id:          EntityId,
    pub blogger_id:  EntityId,
    pub title:       String,
    pub description: Option<String>,
    pub cost:        Money,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewPricePreset {
    pub blogger_id: EntityId,
    pub title:      String,
    #[serde(default)]
    pub description: Option<String>,
    pub cost: Money,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PricePresetUpdate {
    pub blogger_id:  Option<EntityId>,
    pub title:       Option<String>,
    pub description: Option<String>,
    pub cost:        Option<Money>,
}

impl PricePresetUpdate {
    pub fn apply(self, p: &mut PricePresetRecord) {
        if let Some(v) = self.blogger_id  { p.blogger_id = v; }
        if let Some(v) = self.title       { p.title = v; }
        if let Some(v) = self.description { p.description = Some(v); }
        if let Some(v) = self.cost        { p.cost = v; }
    }
}

// ── Comments ───────────────────────────────────────────────────────

/// A manager's note attached to a blogger, counterparty and/or placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentRecord {
    pub id:              EntityId,
    pub body:            String,
    pub author_id:       Option<EntityId>,
    pub blogger_id:      Option<EntityId>,
    pub counterparty_id: Option<EntityId>,
    pub placement_id:    Option<EntityId>,
    pub created_on:      NaiveDate,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewComment {
    pub body: String,
    #[serde(default)]
    pub author_id: Option<EntityId>,
    #[serde(default)]
    pub blogger_id: Option<EntityId>,
    #[serde(default)]
    pub counterparty_id: Option<EntityId>,
    #[serde(default)]
    pub placement_id: Option<EntityId>,
}

impl NewComment {
    pub fn has_target(&self) -> bool {
        self.blogger_id.is_some() || self.counterparty_id.is_some() || self.placement_id.is_some()
    }
}

/// Every set field must match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentFilter {
    pub blogger_id:      Option<EntityId>,
    pub counterparty_id: Option<EntityId>,
    pub placement_id:    Option<EntityId>,
}

impl CommentFilter {
    pub fn matches(&self, c: &CommentRecord) -> bool {
        self.blogger_id.map_or(true, |id| c.blogger_id == Some(id))
            && self.counterparty_id.map_or(true, |id| c.counterparty_id == Some(id))
            && self.placement_id.map_or(true, |id| c.placement_id == Some(id))
    }
}

// ── Campaign ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignRecord {
    pub id:         EntityId,
    pub name:       String,
    pub product:    Option<String>,
    pub goal_type:  Option<GoalType>,
    pub budget:     Option<Money>,
    pub status:     CampaignStatus,
    pub start_date: Option<NaiveDate>,
    pub end_date:   Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewCampaign {
    pub name: String,
    #[serde(default)]
    pub product: Option<String>,
    #[serde(default)]
    pub goal_type: Option<GoalType>,
    #[serde(default)]
    pub budget: Option<Money>,
    #[serde(default)]
    pub status: Option<CampaignStatus>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

/// Partial campaign update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CampaignUpdate {
    pub name:       Option<String>,
    pub product:    Option<String>,
    pub goal_type:  Option<GoalType>,
    pub budget:     Option<Money>,
    pub status:     Option<CampaignStatus>,
    pub start_date: Option<NaiveDate>,
    pub end_date:   Option<NaiveDate>,
}

impl CampaignUpdate {
    pub fn apply(self, c: &mut CampaignRecord) {
        if let Some(v) = self.name       { c.name = v; }
        if let Some(v) = self.product    { c.product = Some(v); }
        if let Some(v) = self.goal_type  { c.goal_type = Some(v); }
        if let Some(v) = self.budget     { c.budget = Some(v); }
        if let Some(v) = self.status     { c.status = v; }
        if let Some(v) = self.start_date { c.start_date = Some(v); }
        if let Some(v) = self.end_date   { c.end_date = Some(v); }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CampaignFilter {
    pub status:  Option<CampaignStatus>,
    pub product: Option<String>,
}

impl CampaignFilter {
    pub fn active() -> Self {
        Self { status: Some(CampaignStatus::Active), product: None }
    }

    pub fn matches(&self, c: &CampaignRecord) -> bool {
        self.status.map_or(true, |s| c.status == s)
            && self
                .product
                .as_deref()
                .map_or(true, |p| c.product.as_deref() == Some(p))
    }
}

// ── Placement ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementRecord {
    pub id:              EntityId,
    pub campaign_id:     EntityId,
    pub blogger_id:      EntityId,
    pub counterparty_id: Option<EntityId>,
    pub scheduled_date:  Option<NaiveDate>,
    pub status:          PlacementStatus,
    pub fee:             Option<Money>,
    pub views:           Option<u64>,
    pub likes:           Option<u64>,
    pub comments:        Option<u64>,
    pub shares:          Option<u64>,
    pub engagement_rate: Option<f64>,
    pub link:            Option<String>,
    pub placement_type:  Option<PlacementType>,
    pub pricing_model:   Option<PricingModel>,
    pub payment_terms:   Option<PaymentTerms>,
    pub tracking_link:   Option<String>,
    pub ad_token:        Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewPlacement {
    pub campaign_id: EntityId,
    pub blogger_id:  EntityId,
    #[serde(default)]
    pub counterparty_id: Option<EntityId>,
    #[serde(default)]
    pub scheduled_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: Option<PlacementStatus>,
    #[serde(default)]
    pub fee: Option<Money>,
    #[serde(default)]
    pub views: Option<u64>,
    #[serde(default)]
    pub engagement_rate: Option<f64>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub placement_type: Option<PlacementType>,
    #[serde(default)]
    pub pricing_model: Option<PricingModel>,
    #[serde(default)]
    pub payment_terms: Option<PaymentTerms>,
    #[serde(default)]
    pub likes: Option<u64>,
    #[serde(default)]
    pub comments: Option<u64>,
    #[serde(default)]
    pub shares: Option<u64>,
    #[serde(default)]
    pub tracking_link: Option<String>,
    #[serde(default)]
    pub ad_token: Option<String>,
}

impl NewPlacement {
    /// The stored row for this payload under `id`.
    pub fn to_record(&self, id: EntityId) -> PlacementRecord {
        PlacementRecord {
            id,
            campaign_id: self.campaign_id,
            blogger_id: self.blogger_id,
            counterparty_id: self.counterparty_id,
            scheduled_date: self.scheduled_date,
            status: self.status.unwrap_or_default(),
            fee: self.fee,
            views: self.views,
            likes: self.likes,
            comments: self.comments,
            shares: self.shares,
            engagement_rate: self.engagement_rate,
            link: self.link.clone(),
            placement_type: self.placement_type,
            pricing_model: self.pricing_model,
            payment_terms: self.payment_terms,
            tracking_link: self.tracking_link.clone(),
            ad_token: self.ad_token.clone(),
        }
    }
}

/// Partial placement update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementUpdate {
    pub blogger_id:      Option<EntityId>,
    pub counterparty_id: Option<EntityId>,
    pub scheduled_date:  Option<NaiveDate>,
    pub status:          Option<PlacementStatus>,
    pub fee:             Option<Money>,
    pub views:           Option<u64>,
    pub likes:           Option<u64>,
    pub comments:        Option<u64>,
    pub shares:          Option<u64>,
    pub engagement_rate: Option<f64>,
    pub link:            Option<String>,
    pub placement_type:  Option<PlacementType>,
    pub pricing_model:   Option<PricingModel>,
    pub payment_terms:   Option<PaymentTerms>,
    pub tracking_link:   Option<String>,
    pub ad_token:        Option<String>,
}

impl PlacementUpdate {
    /// True when the payload touches anything other than `status`.
    pub fn touches_non_status_fields(&self) -> bool {
        self.blogger_id.is_some()
            || self.counterparty_id.is_some()
            || self.scheduled_date.is_some()
            || self.fee.is_some()
            || self.views.is_some()
            || self.likes.is_some()
            || self.comments.is_some()
            || self.shares.is_some()
            || self.engagement_rate.is_some()
            || self.link.is_some()
            || self.placement_type.is_some()
            || self.pricing_model.is_some()
            || self.payment_terms.is_some()
            || self.tracking_link.is_some()
            || self.ad_token.is_some()
    }

    pub fn apply(self, p: &mut PlacementRecord) {
        if let Some(v) = self.blogger_id      { p.blogger_id = v; }
        if let Some(v) = self.counterparty_id { p.counterparty_id = Some(v); }
        if let Some(v) = self.scheduled_date  { p.scheduled_date = Some(v); }
        if let Some(v) = self.status          { p.status = v; }
        if let Some(v) = self.fee             { p.fee = Some(v); }
        if let Some(v) = self.views           { p.views = Some(v); }
        if let Some(v) = self.likes           { p.likes = Some(v); }
        if let Some(v) = self.comments        { p.comments = Some(v); }
        if let Some(v) = self.shares          { p.shares = Some(v); }
        if let Some(v) = self.engagement_rate { p.engagement_rate = Some(v); }
        if let Some(v) = self.link            { p.link = Some(v); }
        if let Some(v) = self.placement_type  { p.placement_type = Some(v); }
        if let Some(v) = self.pricing_model   { p.pricing_model = Some(v); }
        if let Some(v) = self.payment_terms   { p.payment_terms = Some(v); }
        if let Some(v) = self.tracking_link   { p.tracking_link = Some(v); }
        if let Some(v) = self.ad_token        { p.ad_token = Some(v); }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementFilter {
    pub status:      Option<PlacementStatus>,
    pub campaign_id: Option<EntityId>,
}

impl PlacementFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_status(status: PlacementStatus) -> Self {
        Self { status: Some(status), campaign_id: None }
    }

    pub fn for_campaign(campaign_id: EntityId) -> Self {
        Self { status: None, campaign_id: Some(campaign_id) }
    }

    pub fn matches(&self, p: &PlacementRecord) -> bool {
        self.status.map_or(true, |s| p.status == s)
            && self.campaign_id.map_or(true, |c| p.campaign_id == c)
    }
}
