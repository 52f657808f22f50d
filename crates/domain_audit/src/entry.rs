//! Activity log entries
//!
//! Every successful mutating operation in the system appends exactly one
//! [`ActivityEntry`]. Entries are immutable: there is no update or delete
//! path anywhere in the crate, and the store port does not expose one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use core_kernel::{ActivityId, UserId};

/// The kind of action an activity entry records
///
/// One variant per mutating operation. Kinds are matched exactly by the
/// read-side filter, so the set is closed rather than free-form strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    UserCreated,
    UserUpdated,
    UserPasswordReset,
    UserDeleted,
    PasswordChanged,
    ProductCreated,
    ProductUpdated,
    ProductDeactivated,
    ClientCreated,
    ClientUpdated,
    BillCreated,
    BillCancelled,
    InstallmentPaid,
    InstallmentsPaidAll,
    InstallmentPaymentCancelled,
    ClientPaymentAllocated,
    TransactionRecorded,
    TransactionCancelled,
    SaleRecorded,
}

impl ActivityKind {
    /// Returns the stable snake_case name used on the wire and in storage
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::UserCreated => "user_created",
            ActivityKind::UserUpdated => "user_updated",
            ActivityKind::UserPasswordReset => "user_password_reset",
            ActivityKind::UserDeleted => "user_deleted",
            ActivityKind::PasswordChanged => "password_changed",
            ActivityKind::ProductCreated => "product_created",
            ActivityKind::ProductUpdated => "product_updated",
            ActivityKind::ProductDeactivated => "product_deactivated",
            ActivityKind::ClientCreated => "client_created",
            ActivityKind::ClientUpdated => "client_updated",
            ActivityKind::BillCreated => "bill_created",
            ActivityKind::BillCancelled => "bill_cancelled",
            ActivityKind::InstallmentPaid => "installment_paid",
            ActivityKind::InstallmentsPaidAll => "installments_paid_all",
            ActivityKind::InstallmentPaymentCancelled => "installment_payment_cancelled",
            ActivityKind::ClientPaymentAllocated => "client_payment_allocated",
            ActivityKind::TransactionRecorded => "transaction_recorded",
            ActivityKind::TransactionCancelled => "transaction_cancelled",
            ActivityKind::SaleRecorded => "sale_recorded",
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ActivityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user_created" => Ok(ActivityKind::UserCreated),
            "user_updated" => Ok(ActivityKind::UserUpdated),
            "user_password_reset" => Ok(ActivityKind::UserPasswordReset),
            "user_deleted" => Ok(ActivityKind::UserDeleted),
            "password_changed" => Ok(ActivityKind::PasswordChanged),
            "product_created" => Ok(ActivityKind::ProductCreated),
            "product_updated" => Ok(ActivityKind::ProductUpdated),
            "product_deactivated" => Ok(ActivityKind::ProductDeactivated),
            "client_created" => Ok(ActivityKind::ClientCreated),
            "client_updated" => Ok(ActivityKind::ClientUpdated),
            "bill_created" => Ok(ActivityKind::BillCreated),
            "bill_cancelled" => Ok(ActivityKind::BillCancelled),
            "installment_paid" => Ok(ActivityKind::InstallmentPaid),
            "installments_paid_all" => Ok(ActivityKind::InstallmentsPaidAll),
            "installment_payment_cancelled" => Ok(ActivityKind::InstallmentPaymentCancelled),
            "client_payment_allocated" => Ok(ActivityKind::ClientPaymentAllocated),
            "transaction_recorded" => Ok(ActivityKind::TransactionRecorded),
            "transaction_cancelled" => Ok(ActivityKind::TransactionCancelled),
            "sale_recorded" => Ok(ActivityKind::SaleRecorded),
            other => Err(format!("unknown activity kind: {other}")),
        }
    }
}

/// An immutable activity log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEntry {
    /// Unique identifier
    pub id: ActivityId,
    /// Acting user
    pub actor_id: UserId,
    /// Acting user's name at the time of the action
    pub actor_name: String,
    /// Action kind
    pub kind: ActivityKind,
    /// Human-readable description
    pub description: String,
    /// Structured detail payload (entity ids, amounts, counts)
    pub details: Value,
    /// When the action happened
    pub recorded_at: DateTime<Utc>,
}

impl ActivityEntry {
    /// Creates a new entry stamped with the current time
    pub fn new(
        actor_id: UserId,
        actor_name: impl Into<String>,
        kind: ActivityKind,
        description: impl Into<String>,
        details: Value,
    ) -> Self {
        Self {
            id: ActivityId::new_v7(),
            actor_id,
            actor_name: actor_name.into(),
            kind,
            description: description.into(),
            details,
            recorded_at: Utc::now(),
        }
    }
}

/// Read-side filter over the activity log
///
/// All fields combine with AND; a `None` field matches everything.
#[derive(Debug, Clone, Default)]
pub struct ActivityQuery {
    /// Inclusive lower bound on `recorded_at`
    pub start_date: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `recorded_at`
    pub end_date: Option<DateTime<Utc>>,
    /// Case-insensitive substring match on the actor name
    pub actor_name: Option<String>,
    /// Exact kind match
    pub kind: Option<ActivityKind>,
}

impl ActivityQuery {
    /// Returns true when the entry satisfies every set filter.
    ///
    /// Shared by the in-memory adapter and by tests; the SQL adapter mirrors
    /// the same semantics in its WHERE clause.
    pub fn matches(&self, entry: &ActivityEntry) -> bool {
        if let Some(start) = self.start_date {
            if entry.recorded_at < start {
                return false;
            }
        }
        if let Some(end) = self.end_date {
            if entry.recorded_at > end {
                return false;
            }
        }
        if let Some(ref needle) = self.actor_name {
            let haystack = entry.actor_name.to_lowercase();
            if !haystack.contains(&needle.to_lowercase()) {
                return false;
            }
        }
        if let Some(kind) = self.kind {
            if entry.kind != kind {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(actor_name: &str, kind: ActivityKind) -> ActivityEntry {
        ActivityEntry::new(
            UserId::new(),
            actor_name,
            kind,
            "test entry",
            json!({}),
        )
    }

    #[test]
    fn empty_query_matches_everything() {
        let e = entry("MARIA", ActivityKind::BillCreated);
        assert!(ActivityQuery::default().matches(&e));
    }

    #[test]
    fn actor_name_filter_is_case_insensitive_substring() {
        let e = entry("MARIA SILVA", ActivityKind::BillCreated);

        let query = ActivityQuery {
            actor_name: Some("maria".to_string()),
            ..Default::default()
        };
        assert!(query.matches(&e));

        let query = ActivityQuery {
            actor_name: Some("joão".to_string()),
            ..Default::default()
        };
        assert!(!query.matches(&e));
    }

    #[test]
    fn kind_filter_is_exact() {
        let e = entry("MARIA", ActivityKind::BillCreated);

        let hit = ActivityQuery {
            kind: Some(ActivityKind::BillCreated),
            ..Default::default()
        };
        let miss = ActivityQuery {
            kind: Some(ActivityKind::BillCancelled),
            ..Default::default()
        };
        assert!(hit.matches(&e));
        assert!(!miss.matches(&e));
    }

    #[test]
    fn date_bounds_are_inclusive() {
        let e = entry("MARIA", ActivityKind::UserCreated);

        let query = ActivityQuery {
            start_date: Some(e.recorded_at),
            end_date: Some(e.recorded_at),
            ..Default::default()
        };
        assert!(query.matches(&e));
    }

    #[test]
    fn kind_round_trips_through_str() {
        let kind: ActivityKind = "client_payment_allocated".parse().unwrap();
        assert_eq!(kind, ActivityKind::ClientPaymentAllocated);
        assert_eq!(kind.as_str(), "client_payment_allocated");
        assert!("no_such_kind".parse::<ActivityKind>().is_err());
    }
}
