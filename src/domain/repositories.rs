//! Repository trait definitions
//!
//! These traits define the contract for data access.
//! Implementations live in the infrastructure layer.

use async_trait::async_trait;
use serde::Serialize;

use super::DomainError;
use super::catalog::Event;

/// Largest page of events a single query returns
pub const MAX_EVENT_PAGE_SIZE: u64 = 100;

/// Filter criteria for event queries
#[derive(Debug, Clone)]
pub struct EventFilter {
    /// Case-insensitive title substring; empty matches everything
    pub query: String,
    /// 1-based page number
    pub page: u64,
    pub limit: u64,
}

impl Default for EventFilter {
    fn default() -> Self {
        Self {
            query: String::new(),
            page: 1,
            limit: MAX_EVENT_PAGE_SIZE,
        }
    }
}

/// Repository trait for Event entity
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Events matching the filter, newest first
    async fn find_all(&self, filter: EventFilter) -> Result<Vec<Event>, DomainError>;
}

/// User data needed to attribute orders
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i32,
    pub external_id: String,
    pub first_name: String,
    pub last_name: String,
}

/// Repository trait for User entity
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by the identity provider's id
    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<User>, DomainError>;
}

/// Order to persist after a completed payment
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub external_session_id: String,
    pub event_id: String,
    pub buyer_id: i32,
    pub total_amount: String,
}

/// Persisted order, as returned to the payment webhook
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i32,
    pub external_session_id: String,
    pub event_id: String,
    pub buyer_id: i32,
    pub total_amount: String,
    pub created_at: String,
}

/// Repository trait for Order entity
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn create(&self, order: NewOrder) -> Result<Order, DomainError>;

    /// Orders placed for an event
    async fn find_by_event(&self, event_id: &str) -> Result<Vec<Order>, DomainError>;
}
