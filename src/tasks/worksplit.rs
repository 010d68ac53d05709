//! Work-split calculation
//!
//! Parses pricing rows from the Schedule B spreadsheet (first sheet, header
//! row skipped, columns CLIN / contractor / extended price), totals them per
//! contractor group, and derives the prime/sub percentage split. The same
//! computed values fan out to the requirements, compliance, and volumes
//! documents plus the dashboard heartbeat, all through section merges.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use serde::Serialize;
use serde_json::{json, Map, Value};

use super::{TaskContext, TaskError, TaskReport};
use crate::config::WorkSplitConfig;
use crate::heartbeat;
use crate::store::DocumentId;

pub const HEARTBEAT_TASK: &str = "work_split";
const COMPUTED_SOURCE: &str = "auto_calculated_from_volume_iii_pricing";

/// One spreadsheet pricing row.
#[derive(Debug, Clone)]
pub struct PricingRow {
    pub clin: String,
    pub contractor: String,
    pub price: f64,
}

/// Group totals and percentages, rounded to cents / hundredths.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SplitTotals {
    pub rpr_total: f64,
    pub movius_total: f64,
    pub overall_total: f64,
    pub rpr_percentage: f64,
    pub movius_percentage: f64,
}

/// Accumulate rows into group totals and percentage split.
///
/// Contractor names classify by case-insensitive substring against the
/// configured group tokens; rows matching neither group still count toward
/// the overall total. A zero overall total yields zero percentages rather
/// than a division error.
pub fn compute_split(rows: &[PricingRow], cfg: &WorkSplitConfig) -> SplitTotals {
    let mut rpr_total = 0.0;
    let mut movius_total = 0.0;
    let mut overall_total = 0.0;
    for row in rows {
        let contractor = row.contractor.to_lowercase();
        overall_total += row.price;
        if matches_group(&contractor, &cfg.primary_tokens) {
            rpr_total += row.price;
        } else if matches_group(&contractor, &cfg.secondary_tokens) {
            movius_total += row.price;
        }
    }
    let pct = |group: f64| {
        if overall_total > 0.0 {
            group / overall_total * 100.0
        } else {
            0.0
        }
    };
    SplitTotals {
        rpr_percentage: round2(pct(rpr_total)),
        movius_percentage: round2(pct(movius_total)),
        rpr_total: round2(rpr_total),
        movius_total: round2(movius_total),
        overall_total: round2(overall_total),
    }
}

fn matches_group(contractor: &str, tokens: &[String]) -> bool {
    tokens
        .iter()
        .any(|token| contractor.contains(token.to_lowercase().as_str()))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Pricing rows from the first sheet, header row skipped. Failures are
/// reported as data (the check's error field), not propagated.
fn read_pricing(path: &Path) -> Result<Vec<PricingRow>, String> {
    if !path.exists() {
        return Err(format!("missing_xlsx:{}", path.display()));
    }
    let mut workbook = open_workbook_auto(path).map_err(|err| err.to_string())?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| "empty_workbook".to_string())?
        .map_err(|err| err.to_string())?;
    let mut rows = Vec::new();
    for row in range.rows().skip(1) {
        if row.is_empty() {
            continue;
        }
        rows.push(PricingRow {
            clin: cell_text(row.first()),
            contractor: cell_text(row.get(1)),
            price: cell_price(row.get(2)),
        });
    }
    Ok(rows)
}

fn cell_text(cell: Option<&Data>) -> String {
    match cell {
        Some(Data::String(text)) => text.trim().to_string(),
        Some(Data::Float(value)) => value.to_string(),
        Some(Data::Int(value)) => value.to_string(),
        _ => String::new(),
    }
}

/// Non-numeric or missing prices count as zero.
fn cell_price(cell: Option<&Data>) -> f64 {
    match cell {
        Some(Data::Float(value)) => *value,
        Some(Data::Int(value)) => *value as f64,
        Some(Data::String(text)) => text.trim().replace(',', "").parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

pub fn run(ctx: &TaskContext) -> Result<TaskReport, TaskError> {
    let sheet = ctx.config.pricing_sheet();
    let calc = read_pricing(&sheet).map(|rows| compute_split(&rows, &ctx.config.work_split));
    let now = heartbeat::timestamp();
    let ok = matches!(&calc, Ok(totals) if totals.rpr_percentage >= ctx.config.work_split.threshold_pct);
    let status = if ok { "pass" } else { "fail" };

    let (rpr_pct, movius_pct, overall) = match &calc {
        Ok(totals) => (
            json!(totals.rpr_percentage),
            json!(totals.movius_percentage),
            json!(totals.overall_total),
        ),
        Err(_) => (Value::Null, Value::Null, Value::Null),
    };

    ctx.store.merge_section(
        DocumentId::Requirements,
        "work_split_calculation",
        json!({
            "computed_source": COMPUTED_SOURCE,
            "rpr_tech_percentage": rpr_pct,
            "movius_percentage": movius_pct,
            "total_contract_value": overall,
            "last_calculated": now,
            "verification_status": status,
        }),
    )?;

    ctx.store.merge_section(
        DocumentId::Compliance,
        "work_split_verification",
        json!({
            "computed_source": COMPUTED_SOURCE,
            "rpr_tech_percentage": rpr_pct,
            "movius_percentage": movius_pct,
            "verification_status": status,
            "verified_at": now,
        }),
    )?;

    ctx.store.merge_section(
        DocumentId::Volumes,
        "work_split_cross_reference",
        json!({
            "rpr_tech_percentage": rpr_pct,
            "movius_percentage": movius_pct,
            "total_contract_value": overall,
            "verification_check": {
                "status": status,
                "last_calculated": now,
            },
        }),
    )?;

    let mut summary = Map::new();
    summary.insert("rpr_percentage".to_string(), rpr_pct);
    summary.insert("movius_percentage".to_string(), movius_pct);
    heartbeat::record(ctx.store.as_ref(), HEARTBEAT_TASK, ok, summary)?;

    let body = match calc {
        Ok(totals) => {
            let mut map = Map::new();
            map.insert("ok".to_string(), json!(ok));
            if let Value::Object(fields) = serde_json::to_value(&totals)? {
                map.extend(fields);
            }
            Value::Object(map)
        }
        Err(error) => json!({ "ok": false, "error": error }),
    };

    Ok(TaskReport { ok, body })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(contractor: &str, price: f64) -> PricingRow {
        PricingRow {
            clin: "0001".to_string(),
            contractor: contractor.to_string(),
            price,
        }
    }

    #[test]
    fn test_split_above_threshold_passes() {
        let cfg = WorkSplitConfig::default();
        let totals = compute_split(
            &[row("RPR Tech", 600_000.0), row("Movius", 400_000.0)],
            &cfg,
        );
        assert_eq!(totals.rpr_percentage, 60.0);
        assert_eq!(totals.movius_percentage, 40.0);
        assert!(totals.rpr_percentage >= cfg.threshold_pct);
    }

    #[test]
    fn test_even_split_fails_threshold() {
        let cfg = WorkSplitConfig::default();
        let totals = compute_split(
            &[row("RPR Tech", 500_000.0), row("Movius Sub", 500_000.0)],
            &cfg,
        );
        assert_eq!(totals.rpr_percentage, 50.0);
        assert_eq!(totals.movius_percentage, 50.0);
        assert!(totals.rpr_percentage < cfg.threshold_pct);
    }

    #[test]
    fn test_zero_total_guard() {
        let cfg = WorkSplitConfig::default();
        let totals = compute_split(&[], &cfg);
        assert_eq!(totals.overall_total, 0.0);
        assert_eq!(totals.rpr_percentage, 0.0);
        assert_eq!(totals.movius_percentage, 0.0);
    }

    #[test]
    fn test_unmatched_contractor_counts_toward_overall() {
        let cfg = WorkSplitConfig::default();
        let totals = compute_split(
            &[row("RPR Tech", 300_000.0), row("Acme", 100_000.0)],
            &cfg,
        );
        assert_eq!(totals.overall_total, 400_000.0);
        assert_eq!(totals.rpr_percentage, 75.0);
        assert_eq!(totals.movius_percentage, 0.0);
    }
}
