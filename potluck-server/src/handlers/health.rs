use actix_web::{HttpResponse, Responder};

pub async fn heartbeat() -> impl Responder {
    HttpResponse::Ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    use potluck_common::db::test_utils::TestDb;

    use actix_web::test::{self, TestRequest};
    use actix_web::web::Data;
    use actix_web::App;

    use crate::services;

    #[actix_web::test]
    async fn test_heartbeat() {
        let db = TestDb::new();

        let app = test::init_service(
            App::new()
                .app_data(Data::new(db.pool.clone()))
                .configure(services::api::configure),
        )
        .await;

        let req = TestRequest::get().uri("/api/health/heartbeat").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), actix_web::http::StatusCode::OK);
    }
}
