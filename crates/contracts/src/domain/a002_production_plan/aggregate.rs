use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::shared::columns::{ColumnDef, ColumnKind};
use crate::shared::record::{Record, RecordKey};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error("period total must not be negative: {0}")]
    NegativeTotal(i64),
    #[error("plan line has no periods")]
    NoPeriods,
}

/// Spreads `total` over `slots` periods: every slot gets `total / slots`,
/// the first `total % slots` slots get one more.
pub fn redistribute_total(total: i64, slots: usize) -> Result<Vec<i64>, PlanError> {
    if total < 0 {
        return Err(PlanError::NegativeTotal(total));
    }
    if slots == 0 {
        return Err(PlanError::NoPeriods);
    }
    let n = slots as i64;
    let base = total / n;
    let remainder = (total % n) as usize;
    Ok((0..slots)
        .map(|i| if i < remainder { base + 1 } else { base })
        .collect())
}

/// Production plan line (a002): one product with planned quantities per period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionPlanLine {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<RecordKey>,

    pub product: String,

    pub workshop: String,

    /// Planned quantity per period, in period order
    pub periods: Vec<i64>,
}

impl ProductionPlanLine {
    pub fn total(&self) -> i64 {
        self.periods.iter().sum()
    }

    /// Replaces the line total, redistributing it over the existing periods.
    pub fn set_total(&mut self, total: i64) -> Result<(), PlanError> {
        self.periods = redistribute_total(total, self.periods.len())?;
        Ok(())
    }

    /// Flat record with one `p<N>` field per period plus `total`.
    pub fn to_record(&self) -> Record {
        let mut record = Record::new();
        if let Some(key) = &self.key {
            record.insert("key".into(), key.to_value());
        }
        record.insert("product".into(), Value::from(self.product.clone()));
        record.insert("workshop".into(), Value::from(self.workshop.clone()));
        for (i, quantity) in self.periods.iter().enumerate() {
            record.insert(period_field(i), Value::from(*quantity));
        }
        record.insert("total".into(), Value::from(self.total()));
        record
    }
}

pub fn period_field(index: usize) -> String {
    format!("p{}", index + 1)
}

/// Columns for a plan with the given period titles
pub fn columns(period_titles: &[&str]) -> Vec<ColumnDef> {
    let mut columns = vec![
        ColumnDef::new("product", "产品"),
        ColumnDef::new("workshop", "车间"),
    ];
    columns.extend(
        period_titles
            .iter()
            .enumerate()
            .map(|(i, title)| ColumnDef::new(period_field(i), *title).kind(ColumnKind::Number)),
    );
    columns.push(ColumnDef::new("total", "合计").kind(ColumnKind::Number));
    columns
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remainder_goes_to_first_slots() {
        assert_eq!(redistribute_total(10, 3), Ok(vec![4, 3, 3]));
        assert_eq!(redistribute_total(11, 3), Ok(vec![4, 4, 3]));
        assert_eq!(redistribute_total(2, 4), Ok(vec![1, 1, 0, 0]));
        assert_eq!(redistribute_total(0, 2), Ok(vec![0, 0]));
    }

    #[test]
    fn test_rejects_negative_and_empty() {
        assert_eq!(redistribute_total(-1, 3), Err(PlanError::NegativeTotal(-1)));
        assert_eq!(redistribute_total(5, 0), Err(PlanError::NoPeriods));
    }

    #[test]
    fn test_set_total_keeps_period_count() {
        let mut line = ProductionPlanLine {
            key: Some(RecordKey::Number(1)),
            product: "齿轮箱".into(),
            workshop: "一车间".into(),
            periods: vec![10, 10, 10, 10],
        };
        line.set_total(42).unwrap();
        assert_eq!(line.periods, vec![11, 11, 10, 10]);
        assert_eq!(line.total(), 42);
        assert!(line.set_total(-5).is_err());
        assert_eq!(line.total(), 42);

        let record = line.to_record();
        assert_eq!(record.get("p1"), Some(&Value::from(11)));
        assert_eq!(record.get("total"), Some(&Value::from(42)));
        assert_eq!(columns(&["一月", "二月", "三月", "四月"]).len(), 7);
    }
}
