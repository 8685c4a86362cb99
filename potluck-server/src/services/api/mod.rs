use actix_web::web::*;

use crate::env;
use crate::handlers::error::{json_error_handler, query_error_handler};

mod auth;
mod friend;
mod health;
mod recipe;
mod user;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.app_data(
        JsonConfig::default()
            .limit(env::CONF.max_json_payload_bytes)
            .error_handler(json_error_handler),
    )
    .app_data(QueryConfig::default().error_handler(query_error_handler))
    .service(
        scope("/api")
            .configure(auth::configure)
            .configure(friend::configure)
            .configure(health::configure)
            .configure(recipe::configure)
            .configure(user::configure),
    );
}
