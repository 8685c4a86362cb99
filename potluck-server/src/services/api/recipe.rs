use actix_web::web::*;

use crate::handlers::recipe;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/recipe")
            .service(
                resource("")
                    .route(post().to(recipe::create))
                    .route(get().to(recipe::get))
                    .route(put().to(recipe::edit))
                    .route(delete().to(recipe::delete)),
            )
            .service(resource("/search").route(get().to(recipe::search)))
            .service(resource("/latest").route(get().to(recipe::latest)))
            .service(resource("/liked").route(get().to(recipe::liked)))
            .service(resource("/comment").route(post().to(recipe::comment)))
            .service(
                resource("/like")
                    .route(put().to(recipe::like))
                    .route(delete().to(recipe::unlike))
                    .route(get().to(recipe::is_liked)),
            ),
    );
}
