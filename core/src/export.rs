//! Prepayment export: placements waiting for payment, as CSV.
//!
//! Selection looks at `WaitingPayment` only and is independent of the
//! dashboard's qualifying filter.

use crate::{
    catalog::PlacementStatus,
    config::ExportConfig,
    error::DeskResult,
    model::{PlacementFilter, PlacementRecord},
    repository::DeskRepository,
};
use csv::WriterBuilder;
use std::io::Write;

pub const HEADER: [&str; 7] = [
    "ID",
    "Campaign ID",
    "Blogger ID",
    "Counterparty ID",
    "Placement Date",
    "Fee",
    "Status",
];

pub fn awaiting_payment_filter() -> PlacementFilter {
    PlacementFilter::with_status(PlacementStatus::WaitingPayment)
}

/// Placements awaiting payment, oldest id first.
pub fn prepayment_rows<R>(repo: &R) -> DeskResult<Vec<PlacementRecord>>
where
    R: DeskRepository + ?Sized,
{
    let mut rows = repo.placements(&awaiting_payment_filter())?;
    rows.sort_by_key(|p| p.id);
    Ok(rows)
}

fn to_row(p: &PlacementRecord) -> [String; 7] {
    [
        p.id.to_string(),
        p.campaign_id.to_string(),
        p.blogger_id.to_string(),
        p.counterparty_id.map(|id| id.to_string()).unwrap_or_default(),
        p.scheduled_date.map(|d| d.to_string()).unwrap_or_default(),
        p.fee.unwrap_or(0.0).to_string(),
        p.status.to_string(),
    ]
}

/// Write `rows` as CSV. Returns the number of data rows written.
pub fn write_prepayments<W: Write>(
    rows: &[PlacementRecord],
    config: &ExportConfig,
    out: W,
) -> DeskResult<usize> {
    let mut writer = WriterBuilder::new()
        .delimiter(config.delimiter_byte())
        .from_writer(out);
    if config.include_header {
        writer.write_record(HEADER)?;
    }
    for p in rows {
        writer.write_record(to_row(p))?;
    }
    writer.flush()?;
    Ok(rows.len())
}
