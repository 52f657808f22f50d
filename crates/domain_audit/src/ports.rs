//! Audit log port
//!
//! The port is deliberately append-only: implementations expose `record` and
//! `find`, nothing else. Deleting or rewriting history is not a capability
//! any adapter can offer through this seam.

use async_trait::async_trait;

use core_kernel::{DomainPort, PortError};

use crate::entry::{ActivityEntry, ActivityQuery};

/// Store for activity log entries
#[async_trait]
pub trait AuditLog: DomainPort {
    /// Appends one entry to the log
    async fn record(&self, entry: ActivityEntry) -> Result<(), PortError>;

    /// Returns entries matching the query, newest first
    async fn find(&self, query: &ActivityQuery) -> Result<Vec<ActivityEntry>, PortError>;
}
