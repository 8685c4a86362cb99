use actix_web::web::*;

use crate::handlers::user;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/user")
            .service(
                resource("")
                    .route(post().to(user::create))
                    .route(get().to(user::get_self)),
            )
            .service(resource("/search").route(get().to(user::search))),
    );
}
