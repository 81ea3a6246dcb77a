//! SeaORM implementation of UserRepository

use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use crate::domain::{DomainError, User, UserRepository};
use crate::models::user::{Column, Entity as UserEntity};

/// SeaORM-based implementation of UserRepository
pub struct SeaOrmUserRepository {
    db: DatabaseConnection,
}

impl SeaOrmUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<User>, DomainError> {
        let user = UserEntity::find()
            .filter(Column::ExternalId.eq(external_id))
            .one(&self.db)
            .await?;

        Ok(user.map(|u| User {
            id: u.id,
            external_id: u.external_id,
            first_name: u.first_name,
            last_name: u.last_name,
        }))
    }
}
