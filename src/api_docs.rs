use crate::api;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::health::health_check,
        api::events::list_events,
        api::generate::generate,
        api::checkout::create_checkout,
        api::webhooks::payment_webhook,
        api::chat::open_session,
        api::chat::get_session,
        api::chat::get_activity,
        api::chat::send_message,
        api::chat::checkout,
        api::chat::reset_session,
        api::chat::close_session,
    ),
    tags(
        (name = "event-assistant", description = "Event discovery assistant API")
    )
)]
pub struct ApiDoc;
