//! SeaORM implementation of EventRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};
use std::collections::HashMap;

use crate::domain::{
    DomainError, Event, EventCategory, EventFilter, EventOrganizer, EventRepository,
    MAX_EVENT_PAGE_SIZE,
};
use crate::models::category::{self, Entity as CategoryEntity};
use crate::models::event::{self, Column, Entity as EventEntity};
use crate::models::user::{self, Entity as UserEntity};

/// SeaORM-based implementation of EventRepository
pub struct SeaOrmEventRepository {
    db: DatabaseConnection,
}

impl SeaOrmEventRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EventRepository for SeaOrmEventRepository {
    async fn find_all(&self, filter: EventFilter) -> Result<Vec<Event>, DomainError> {
        let mut query = EventEntity::find();

        let needle = filter.query.trim();
        if !needle.is_empty() {
            // LIKE is case-insensitive for ASCII in SQLite
            query = query.filter(Column::Title.contains(needle));
        }

        let limit = filter.limit.clamp(1, MAX_EVENT_PAGE_SIZE);
        // Pages past what SQLite can address are simply empty
        let Some(offset) = filter
            .page
            .saturating_sub(1)
            .checked_mul(limit)
            .filter(|offset| *offset <= i64::MAX as u64)
        else {
            return Ok(Vec::new());
        };

        let rows = query
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .offset(offset)
            .limit(limit)
            .find_also_related(CategoryEntity)
            .all(&self.db)
            .await?;

        // Organizers are a second belongs_to on the same table, fetch them in one go
        let organizer_ids: Vec<i32> = rows.iter().filter_map(|(e, _)| e.organizer_id).collect();
        let mut organizers: HashMap<i32, user::Model> = HashMap::new();
        if !organizer_ids.is_empty() {
            for u in UserEntity::find()
                .filter(user::Column::Id.is_in(organizer_ids))
                .all(&self.db)
                .await?
            {
                organizers.insert(u.id, u);
            }
        }

        rows.into_iter()
            .map(|(model, category)| {
                let organizer = model.organizer_id.and_then(|id| organizers.get(&id));
                to_event(model, category, organizer)
            })
            .collect()
    }
}

fn parse_timestamp(raw: &str, event_id: i32) -> Result<DateTime<Utc>, DomainError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| DomainError::Database(format!("Invalid timestamp on event {}: {}", event_id, e)))
}

fn to_event(
    model: event::Model,
    category: Option<category::Model>,
    organizer: Option<&user::Model>,
) -> Result<Event, DomainError> {
    Ok(Event {
        id: model.id.to_string(),
        start_date_time: parse_timestamp(&model.start_date_time, model.id)?,
        end_date_time: parse_timestamp(&model.end_date_time, model.id)?,
        title: model.title,
        description: model.description,
        location: model.location,
        price: model.price,
        is_free: model.is_free,
        image_url: model.image_url,
        url: model.url,
        category: category.map(|c| EventCategory { name: c.name }),
        organizer: organizer.map(|o| EventOrganizer {
            first_name: o.first_name.clone(),
            last_name: o.last_name.clone(),
        }),
    })
}
