//! SeaORM implementation of OrderRepository

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::domain::{DomainError, NewOrder, Order, OrderRepository};
use crate::models::order::{self, ActiveModel, Column, Entity as OrderEntity};

/// SeaORM-based implementation of OrderRepository
pub struct SeaOrmOrderRepository {
    db: DatabaseConnection,
}

impl SeaOrmOrderRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl From<order::Model> for Order {
    fn from(m: order::Model) -> Self {
        Order {
            id: m.id,
            external_session_id: m.external_session_id,
            event_id: m.event_id,
            buyer_id: m.buyer_id,
            total_amount: m.total_amount,
            created_at: m.created_at,
        }
    }
}

#[async_trait]
impl OrderRepository for SeaOrmOrderRepository {
    async fn create(&self, order: NewOrder) -> Result<Order, DomainError> {
        let active = ActiveModel {
            external_session_id: Set(order.external_session_id),
            event_id: Set(order.event_id),
            buyer_id: Set(order.buyer_id),
            total_amount: Set(order.total_amount),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        let model = active.insert(&self.db).await?;
        Ok(Order::from(model))
    }

    async fn find_by_event(&self, event_id: &str) -> Result<Vec<Order>, DomainError> {
        let orders = OrderEntity::find()
            .filter(Column::EventId.eq(event_id))
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await?;

        Ok(orders.into_iter().map(Order::from).collect())
    }
}
