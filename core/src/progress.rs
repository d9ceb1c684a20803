//! Campaign progress: how much of the schedule and of the budget is used.

use crate::types::Money;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Dashboard hint comparing schedule use with budget use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvisoryFlag {
    /// More of the schedule has elapsed than of the budget has been spent.
    Behind,
    OnTrack,
}

impl AdvisoryFlag {
    /// Strict comparison: equal fractions are on track.
    pub fn from_fractions(time_fraction: f64, budget_fraction: f64) -> Self {
        if time_fraction > budget_fraction {
            AdvisoryFlag::Behind
        } else {
            AdvisoryFlag::OnTrack
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CampaignProgress {
    pub time_fraction:   f64,
    pub budget_fraction: f64,
    pub advisory_flag:   AdvisoryFlag,
}

/// Share of the campaign window elapsed by `today`, in whole days.
/// 0.0 without both dates or when the window is empty or inverted.
pub fn time_fraction(
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    today: NaiveDate,
) -> f64 {
    let (Some(start), Some(end)) = (start_date, end_date) else {
        return 0.0;
    };
    if end <= start {
        return 0.0;
    }
    let total = (end - start).num_days() as f64;
    let elapsed = (today - start).num_days().max(0) as f64;
    (elapsed / total).clamp(0.0, 1.0)
}

/// Share of the budget consumed by `spend`. 0.0 without a positive budget.
pub fn budget_fraction(budget: Option<Money>, spend: Money) -> f64 {
    match budget {
        Some(b) if b > 0.0 => {
            let fraction = spend / b;
            if fraction.is_nan() {
                0.0
            } else {
                fraction.clamp(0.0, 1.0)
            }
        }
        _ => 0.0,
    }
}

pub fn campaign_progress(
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    budget: Option<Money>,
    spend: Money,
    today: NaiveDate,
) -> CampaignProgress {
    let time_fraction = time_fraction(start_date, end_date, today);
    let budget_fraction = budget_fraction(budget, spend);
    CampaignProgress {
        time_fraction,
        budget_fraction,
        advisory_flag: AdvisoryFlag::from_fractions(time_fraction, budget_fraction),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn not_started_campaign_reports_zero_time() {
        let p = campaign_progress(
            Some(date(2025, 6, 1)),
            Some(date(2025, 6, 30)),
            Some(1000.0),
            0.0,
            date(2025, 5, 1),
        );
        assert_eq!(p.time_fraction, 0.0);
    }

    #[test]
    fn mid_campaign_uses_whole_days() {
        let f = time_fraction(Some(date(2025, 1, 1)), Some(date(2025, 1, 11)), date(2025, 1, 4));
        assert!((f - 0.3).abs() < 1e-12, "got {f}");
    }

    #[test]
    fn finished_campaign_caps_at_one() {
        let f = time_fraction(Some(date(2025, 1, 1)), Some(date(2025, 1, 11)), date(2026, 1, 1));
        assert_eq!(f, 1.0);
    }

    #[test]
    fn missing_or_inverted_window_is_zero() {
        let today = date(2025, 1, 5);
        assert_eq!(time_fraction(None, Some(date(2025, 1, 11)), today), 0.0);
        assert_eq!(time_fraction(Some(date(2025, 1, 1)), None, today), 0.0);
        assert_eq!(time_fraction(Some(date(2025, 1, 1)), Some(date(2025, 1, 1)), today), 0.0);
        assert_eq!(time_fraction(Some(date(2025, 1, 9)), Some(date(2025, 1, 1)), today), 0.0);
    }

    #[test]
    fn budget_fraction_handles_absent_and_non_positive_budget() {
        assert_eq!(budget_fraction(None, 500.0), 0.0);
        assert_eq!(budget_fraction(Some(0.0), 500.0), 0.0);
        assert_eq!(budget_fraction(Some(-100.0), 500.0), 0.0);
    }

    #[test]
    fn budget_fraction_is_clamped() {
        assert_eq!(budget_fraction(Some(1000.0), 250.0), 0.25);
        assert_eq!(budget_fraction(Some(1000.0), 5000.0), 1.0);
        assert_eq!(budget_fraction(Some(1000.0), -50.0), 0.0);
    }

    #[test]
    fn advisory_flag_is_strict() {
        assert_eq!(AdvisoryFlag::from_fractions(0.6, 0.4), AdvisoryFlag::Behind);
        assert_eq!(AdvisoryFlag::from_fractions(0.4, 0.4), AdvisoryFlag::OnTrack);
        assert_eq!(AdvisoryFlag::from_fractions(0.2, 0.4), AdvisoryFlag::OnTrack);
    }

    #[test]
    fn fractions_stay_in_unit_interval() {
        let start = date(2025, 1, 1);
        let end = date(2025, 3, 1);
        let budgets = [None, Some(-10.0), Some(0.0), Some(1.0), Some(1e9)];
        let spends = [-1e6, -1.0, 0.0, 0.5, 1e3, 1e12];
        for offset in -100i64..200 {
            let today = start + chrono::Duration::days(offset);
            for budget in budgets {
                for spend in spends {
                    let p = campaign_progress(Some(start), Some(end), budget, spend, today);
                    assert!((0.0..=1.0).contains(&p.time_fraction));
                    assert!((0.0..=1.0).contains(&p.budget_fraction));
                }
            }
        }
    }
}
