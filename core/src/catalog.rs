//! Closed vocabularies stored as text columns.
//!
//! Each enum serializes (JSON and SQLite) as its snake_case wire value.
//! Variants are added over time and never renamed; the text is persisted.

use crate::error::DeskError;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        $name:ident as $field:literal {
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = DeskError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(DeskError::InvalidValue {
                        field: $field,
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                value
                    .as_str()?
                    .parse()
                    .map_err(|e: DeskError| FromSqlError::Other(Box::new(e)))
            }
        }
    };
}

text_enum! {
    /// Lifecycle of a single placement.
    ///
    /// `Overdue` is derived by the sweep; see `status_policy`.
    PlacementStatus as "placement status" {
        Planning               => "planning",
        Agreed                 => "agreed",
        Declined               => "declined",
        WaitingPayment         => "waiting_payment",
        PaidWaitingPublication => "paid_waiting_publication",
        Published              => "published",
        Overdue                => "overdue",
        Done                   => "done",
    }
}

impl Default for PlacementStatus {
    fn default() -> Self {
        PlacementStatus::Planning
    }
}

text_enum! {
    CampaignStatus as "campaign status" {
        Planned   => "planned",
        Active    => "active",
        Completed => "completed",
    }
}

impl Default for CampaignStatus {
    fn default() -> Self {
        CampaignStatus::Planned
    }
}

text_enum! {
    GoalType as "goal type" {
        Awareness   => "awareness",
        Performance => "performance",
    }
}

text_enum! {
    SocialNetwork as "network" {
        YouTube   => "youtube",
        Telegram  => "telegram",
        Vk        => "vk",
        Dzen      => "dzen",
        Twitch    => "twitch",
        Instagram => "instagram",
    }
}

text_enum! {
    ContactType as "contact type" {
        Email    => "email",
        Telegram => "telegram",
        Phone    => "phone",
        Other    => "other",
    }
}

text_enum! {
    /// Legal form of a payee.
    CounterpartyType as "counterparty type" {
        SelfEmployed           => "self_employed",
        IndividualEntrepreneur => "individual_entrepreneur",
        LegalEntity            => "legal_entity",
    }
}

text_enum! {
    RelationshipType as "relationship type" {
        Direct     => "direct",
        Agency     => "agency",
        CpaNetwork => "cpa_network",
    }
}

text_enum! {
    PaymentTerms as "payment terms" {
        Prepaid  => "prepaid",
        Postpaid => "postpaid",
        Partial  => "partial",
    }
}

text_enum! {
    PlacementType as "placement type" {
        Post         => "post",
        Video        => "video",
        Shorts       => "shorts",
        Stream       => "stream",
        Stories      => "stories",
        Integration  => "integration",
        Announcement => "announcement",
    }
}

text_enum! {
    PricingModel as "pricing model" {
        Fix      => "fix",
        Cpa      => "cpa",
        RevShare => "rev_share",
        Barter   => "barter",
    }
}

text_enum! {
    /// Stored for display only; nothing in the desk enforces roles.
    Role as "role" {
        Admin   => "admin",
        Manager => "manager",
    }
}

text_enum! {
    UserStatus as "user status" {
        Active      => "active",
        Invited     => "invited",
        Deactivated => "deactivated",
    }
}
