use actix_web::web::*;

use crate::handlers::friend;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/friend")
            .service(
                resource("")
                    .route(get().to(friend::list))
                    .route(delete().to(friend::remove)),
            )
            .service(
                resource("/request")
                    .route(post().to(friend::send_request))
                    .route(delete().to(friend::cancel_request)),
            )
            .service(resource("/request/accept").route(post().to(friend::accept_request))),
    );
}
