use actix_web::web::*;

use crate::handlers::auth;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/auth")
            .route("/login", post().to(auth::login))
            .route("/logout", post().to(auth::logout))
            .route("/check", get().to(auth::check)),
    );
}
