use crate::models::{category, event, user};
use chrono::{Duration, Utc};
use sea_orm::*;

/// Demo organizer, categories and a handful of events.
///
/// Safe to run repeatedly: users and categories are only created when missing
/// and events are only inserted into an empty catalog.
pub async fn seed_demo_data(db: &DatabaseConnection) -> Result<(), DbErr> {
    let now = Utc::now();

    // 1. Users
    let users = [
        ("user_demo_organizer", "organizer@example.com", "Grace", "Hopper"),
        ("user_demo_buyer", "buyer@example.com", "Alan", "Turing"),
    ];

    for (external_id, email, first_name, last_name) in users {
        let model = user::ActiveModel {
            external_id: Set(external_id.to_owned()),
            email: Set(email.to_owned()),
            first_name: Set(first_name.to_owned()),
            last_name: Set(last_name.to_owned()),
            created_at: Set(now.to_rfc3339()),
            updated_at: Set(now.to_rfc3339()),
            ..Default::default()
        };

        let exists = user::Entity::find()
            .filter(user::Column::ExternalId.eq(external_id))
            .one(db)
            .await?
            .is_some();
        if !exists {
            model.insert(db).await?;
        }
    }

    // 2. Categories
    for name in ["Technology", "Music", "Community"] {
        let model = category::ActiveModel {
            name: Set(name.to_owned()),
            created_at: Set(now.to_rfc3339()),
            ..Default::default()
        };

        let exists = category::Entity::find()
            .filter(category::Column::Name.eq(name))
            .one(db)
            .await?
            .is_some();
        if !exists {
            model.insert(db).await?;
        }
    }

    if event::Entity::find().count(db).await? > 0 {
        tracing::info!("Event catalog already populated, skipping demo events");
        return Ok(());
    }

    let organizer = user::Entity::find()
        .filter(user::Column::ExternalId.eq("user_demo_organizer"))
        .one(db)
        .await?;
    let categories = category::Entity::find().all(db).await?;
    let category_id = |name: &str| categories.iter().find(|c| c.name == name).map(|c| c.id);

    // 3. Events
    let events = [
        (
            "Test",
            "A free sample event to try the assistant with.",
            "Online",
            None,
            true,
            "Community",
            7,
        ),
        (
            "Rust Systems Summit",
            "Two days of talks on async runtimes, embedded Rust and compiler internals.",
            "Berlin, Germany",
            Some("149"),
            false,
            "Technology",
            30,
        ),
        (
            "Open Air Jazz Night",
            "Local quartets play under the stars. Bring a blanket.",
            "Riverside Park",
            Some("20"),
            false,
            "Music",
            14,
        ),
    ];

    for (title, description, location, price, is_free, category, days_ahead) in events {
        let start = now + Duration::days(days_ahead);
        let model = event::ActiveModel {
            title: Set(title.to_owned()),
            description: Set(Some(description.to_owned())),
            location: Set(Some(location.to_owned())),
            start_date_time: Set(start.to_rfc3339()),
            end_date_time: Set((start + Duration::hours(3)).to_rfc3339()),
            price: Set(price.map(str::to_owned)),
            is_free: Set(is_free),
            image_url: Set(None),
            url: Set(None),
            category_id: Set(category_id(category)),
            organizer_id: Set(organizer.as_ref().map(|o| o.id)),
            created_at: Set(now.to_rfc3339()),
            updated_at: Set(now.to_rfc3339()),
            ..Default::default()
        };
        model.insert(db).await?;
    }

    tracing::info!("Seeded {} demo events", events.len());

    Ok(())
}
