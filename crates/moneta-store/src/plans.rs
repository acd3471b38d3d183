//! SQLite plan store.
//!
//! The recurrence rule is kept as a JSON TEXT column (same approach as the
//! ledger keys: readable, and the scheduler is the only consumer). Rows whose
//! recurrence JSON fails to parse are surfaced as plans without a rule — the
//! scheduler skips them — with a warning, so one corrupt row never aborts a
//! reminder cycle.

use std::sync::Mutex;

use chrono::Utc;
use rusqlite::Connection;
use tracing::{info, warn};
use uuid::Uuid;

use moneta_core::types::{Recurrence, RecurrencePlan};
use moneta_scheduler::repo::PlanStore;

use crate::error::Result;

pub struct SqlitePlanStore {
    db: Mutex<Connection>,
}

const PLAN_COLUMNS: &str = "id, owner, active, description, category, amount_minor,
                            currency, recurrence, created_at, updated_at";

impl SqlitePlanStore {
    pub fn new(conn: Connection) -> Self {
        Self {
            db: Mutex::new(conn),
        }
    }

    /// Insert a new plan, assigning id and timestamps. Returns the stored
    /// record. Rules violating the recurrence invariants (interval ≥ 1,
    /// end_date ≥ start_date) are rejected — this is the one creation
    /// boundary, so nothing downstream ever sees an invalid rule.
    pub fn insert(
        &self,
        owner: &str,
        description: &str,
        category: Option<&str>,
        amount_minor: i64,
        currency: &str,
        recurrence: Option<&Recurrence>,
    ) -> Result<RecurrencePlan> {
        if let Some(rule) = recurrence {
            rule.validate()
                .map_err(|e| crate::error::StoreError::InvalidRecurrence(e.to_string()))?;
        }

        let db = self.db.lock().unwrap();
        let now = Utc::now().to_rfc3339();
        let id = Uuid::new_v4().to_string();
        let recurrence_json = recurrence.map(serde_json::to_string).transpose()?;

        db.execute(
            "INSERT INTO plans
             (id, owner, active, description, category, amount_minor,
              currency, recurrence, created_at, updated_at)
             VALUES (?1,?2,1,?3,?4,?5,?6,?7,?8,?8)",
            rusqlite::params![
                id,
                owner,
                description,
                category,
                amount_minor,
                currency,
                recurrence_json,
                now
            ],
        )?;
        info!(plan_id = %id, %owner, "plan inserted");

        Ok(RecurrencePlan {
            id,
            owner: owner.to_string(),
            active: true,
            description: description.to_string(),
            category: category.map(String::from),
            amount_minor,
            currency: currency.to_string(),
            recurrence: recurrence.cloned(),
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// All plans belonging to one user, active or not.
    pub fn plans_for_user(&self, owner: &str) -> Result<Vec<RecurrencePlan>> {
        let db = self.db.lock().unwrap();
        let mut stmt = db.prepare(&format!(
            "SELECT {PLAN_COLUMNS} FROM plans WHERE owner = ?1 ORDER BY created_at"
        ))?;
        let rows = stmt
            .query_map([owner], row_to_plan)?
            .filter_map(|r| r.ok())
            .collect();
        Ok(rows)
    }

    /// Activate or deactivate a plan. Plans are deactivated rather than
    /// deleted when their recurrence ends.
    pub fn set_active(&self, id: &str, active: bool) -> Result<()> {
        let db = self.db.lock().unwrap();
        let now = Utc::now().to_rfc3339();
        db.execute(
            "UPDATE plans SET active = ?1, updated_at = ?2 WHERE id = ?3",
            rusqlite::params![active as i64, now, id],
        )?;
        Ok(())
    }

    pub fn count(&self) -> Result<u64> {
        let db = self.db.lock().unwrap();
        let n: u64 = db.query_row("SELECT COUNT(*) FROM plans", [], |row| row.get(0))?;
        Ok(n)
    }

    fn list_active_inner(&self) -> Result<Vec<RecurrencePlan>> {
        let db = self.db.lock().unwrap();
        let mut stmt = db.prepare(&format!(
            "SELECT {PLAN_COLUMNS} FROM plans WHERE active = 1 ORDER BY created_at"
        ))?;
        let rows = stmt
            .query_map([], row_to_plan)?
            .filter_map(|r| r.ok())
            .collect();
        Ok(rows)
    }
}

fn row_to_plan(row: &rusqlite::Row<'_>) -> rusqlite::Result<RecurrencePlan> {
    let id: String = row.get(0)?;
    let recurrence_json: Option<String> = row.get(7)?;
    let recurrence = recurrence_json.and_then(|json| match serde_json::from_str(&json) {
        Ok(r) => Some(r),
        Err(e) => {
            warn!(plan_id = %id, "bad recurrence JSON, treating plan as one-off: {e}");
            None
        }
    });

    Ok(RecurrencePlan {
        id,
        owner: row.get(1)?,
        active: row.get::<_, i64>(2)? != 0,
        description: row.get(3)?,
        category: row.get(4)?,
        amount_minor: row.get(5)?,
        currency: row.get(6)?,
        recurrence,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

impl PlanStore for SqlitePlanStore {
    fn list_active(&self) -> moneta_scheduler::Result<Vec<RecurrencePlan>> {
        Ok(self.list_active_inner()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use moneta_core::types::Frequency;

    fn store() -> SqlitePlanStore {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::init_db(&conn).unwrap();
        SqlitePlanStore::new(conn)
    }

    fn daily_rule() -> Recurrence {
        Recurrence {
            frequency: Frequency::Daily,
            interval: 1,
            by_day: vec![],
            by_month_day: vec![],
            start_date: Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap(),
            end_date: None,
        }
    }

    #[test]
    fn insert_and_list_active_roundtrips_recurrence() {
        let store = store();
        let rule = daily_rule();
        let plan = store
            .insert("alice", "Rent", Some("housing"), -120_000, "EUR", Some(&rule))
            .unwrap();

        let active = store.list_active_inner().unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, plan.id);
        let stored_rule = active[0].recurrence.as_ref().unwrap();
        assert_eq!(stored_rule.frequency, Frequency::Daily);
        assert_eq!(stored_rule.start_date, rule.start_date);
    }

    #[test]
    fn insert_rejects_rules_violating_invariants() {
        let store = store();

        let mut zero_interval = daily_rule();
        zero_interval.interval = 0;
        assert!(matches!(
            store.insert("alice", "Rent", None, -1, "EUR", Some(&zero_interval)),
            Err(crate::error::StoreError::InvalidRecurrence(_))
        ));

        let mut inverted = daily_rule();
        inverted.end_date = Some(inverted.start_date - chrono::Duration::days(1));
        assert!(store
            .insert("alice", "Rent", None, -1, "EUR", Some(&inverted))
            .is_err());

        // Nothing was persisted by either rejected insert.
        assert!(store.plans_for_user("alice").unwrap().is_empty());
        assert!(store.list_active_inner().unwrap().is_empty());
    }

    #[test]
    fn deactivated_plans_leave_list_active() {
        let store = store();
        let plan = store
            .insert("alice", "Netflix", None, -1499, "USD", Some(&daily_rule()))
            .unwrap();
        store.set_active(&plan.id, false).unwrap();

        assert!(store.list_active_inner().unwrap().is_empty());
        // Still visible to the owner's own listing.
        assert_eq!(store.plans_for_user("alice").unwrap().len(), 1);
    }

    #[test]
    fn corrupt_recurrence_json_degrades_to_one_off() {
        let store = store();
        {
            let db = store.db.lock().unwrap();
            db.execute(
                "INSERT INTO plans (id, owner, active, description, category,
                 amount_minor, currency, recurrence, created_at, updated_at)
                 VALUES ('p-bad','alice',1,'x',NULL,0,'USD','not json','t','t')",
                [],
            )
            .unwrap();
        }
        let active = store.list_active_inner().unwrap();
        assert_eq!(active.len(), 1);
        assert!(active[0].recurrence.is_none());
    }
}
