use crate::models::DashboardStats;
use crate::storage::{Collection, RecordStore};
use chrono::{NaiveDate, Utc};
use serde_json::Value;

/// Collection snapshots the dashboard summary is computed from.
#[derive(Debug, Default)]
pub struct Snapshot {
    pub visitors: Vec<Value>,
    pub loan_leads: Vec<Value>,
    pub debt_leads: Vec<Value>,
    pub contact_leads: Vec<Value>,
    pub events: Vec<Value>,
}

impl Snapshot {
    pub async fn load(store: &RecordStore) -> Self {
        Self {
            visitors: store.read_all(Collection::Visitors).await,
            loan_leads: store.read_all(Collection::LoanLeads).await,
            debt_leads: store.read_all(Collection::DebtLeads).await,
            contact_leads: store.read_all(Collection::ContactLeads).await,
            events: store.read_all(Collection::Events).await,
        }
    }
}

pub fn build_stats(snapshot: &Snapshot) -> DashboardStats {
    build_stats_at(Utc::now().date_naive(), snapshot)
}

/// "Today" is a calendar day in UTC, matched on the timestamp's date prefix.
pub fn build_stats_at(today: NaiveDate, snapshot: &Snapshot) -> DashboardStats {
    let prefix = date_key(today);

    DashboardStats {
        total_visitors: snapshot.visitors.len(),
        today_visitors: count_on(&snapshot.visitors, &prefix),
        total_loan_leads: snapshot.loan_leads.len(),
        today_loan_leads: count_on(&snapshot.loan_leads, &prefix),
        total_debt_leads: snapshot.debt_leads.len(),
        today_debt_leads: count_on(&snapshot.debt_leads, &prefix),
        total_contact_leads: snapshot.contact_leads.len(),
        total_events: snapshot.events.len(),
    }
}

fn count_on(records: &[Value], prefix: &str) -> usize {
    records
        .iter()
        .filter(|record| {
            record
                .get("timestamp")
                .and_then(Value::as_str)
                .is_some_and(|ts| ts.starts_with(prefix))
        })
        .count()
}

fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn today_counts_exclude_yesterday() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let snapshot = Snapshot {
            visitors: vec![
                json!({ "timestamp": "2026-01-04T23:59:59.999Z" }),
                json!({ "timestamp": "2026-01-05T00:00:00.000Z" }),
                json!({ "timestamp": "2026-01-05T12:30:00.000Z" }),
            ],
            loan_leads: vec![json!({ "timestamp": "2026-01-04T23:00:00.000Z" })],
            debt_leads: vec![json!({ "timestamp": "2026-01-05T08:00:00.000Z" })],
            contact_leads: vec![json!({ "timestamp": "2026-01-05T08:00:00.000Z" })],
            events: vec![json!({}), json!({})],
        };

        let stats = build_stats_at(today, &snapshot);
        assert_eq!(stats.total_visitors, 3);
        assert_eq!(stats.today_visitors, 2);
        assert_eq!(stats.total_loan_leads, 1);
        assert_eq!(stats.today_loan_leads, 0);
        assert_eq!(stats.today_debt_leads, 1);
        assert_eq!(stats.total_contact_leads, 1);
        assert_eq!(stats.total_events, 2);
    }

    #[test]
    fn records_without_timestamp_only_count_in_totals() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let snapshot = Snapshot {
            visitors: vec![json!({ "id": "x" }), json!({ "timestamp": 5 })],
            ..Snapshot::default()
        };

        let stats = build_stats_at(today, &snapshot);
        assert_eq!(stats.total_visitors, 2);
        assert_eq!(stats.today_visitors, 0);
    }
}
