use potluck_common::db::{self, DbThreadPool};
use potluck_common::token::auth_token::{AuthToken, AuthTokenClaims};
use potluck_common::token::{Token, TokenError};

use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpRequest};
use futures::future::{self, FutureExt, LocalBoxFuture};

use crate::env;
use crate::handlers::error::HttpErrorResponse;
use crate::middleware::get_bearer_token;

/// Claims of a bearer token that is correctly signed, unexpired and not on
/// the revocation list.
#[derive(Debug)]
pub struct VerifiedToken {
    pub claims: AuthTokenClaims,
}

fn decode_and_verify(req: &HttpRequest) -> Result<AuthTokenClaims, TokenError> {
    let token = get_bearer_token(req)?;
    let decoded_token = AuthToken::decode(token)?;
    let claims = decoded_token.verify(&env::CONF.token_signing_key)?;

    Ok(claims.clone())
}

impl FromRequest for VerifiedToken {
    type Error = HttpErrorResponse;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let claims = match decode_and_verify(req) {
            Ok(c) => c,
            Err(e) => return future::err(HttpErrorResponse::from(e)).boxed_local(),
        };

        let Some(db_thread_pool) = req.app_data::<web::Data<DbThreadPool>>() else {
            log::error!("Database pool is missing from app data");
            return future::err(HttpErrorResponse::InternalError(String::from(
                "Failed to check token",
            )))
            .boxed_local();
        };

        let auth_dao = db::auth::Dao::new(db_thread_pool);
        reject_if_revoked(auth_dao, claims).boxed_local()
    }
}

async fn reject_if_revoked(
    auth_dao: db::auth::Dao,
    claims: AuthTokenClaims,
) -> Result<VerifiedToken, HttpErrorResponse> {
    let token_id = claims.token_id.clone();

    match web::block(move || auth_dao.is_token_revoked(&token_id)).await? {
        Ok(false) => Ok(VerifiedToken { claims }),
        Ok(true) => Err(TokenError::TokenRevoked.into()),
        Err(e) => {
            log::error!("{e}");
            Err(HttpErrorResponse::InternalError(String::from(
                "Failed to check token",
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use potluck_common::db::test_utils::TestDb;
    use potluck_common::request_io::{ErrorType, ServerErrorResponse};

    use actix_web::http::StatusCode;
    use actix_web::test::{self, TestRequest};
    use actix_web::web::Data;
    use actix_web::{App, HttpResponse};
    use std::time::Duration;

    use crate::handlers::test_utils;

    async fn protected(token: VerifiedToken) -> HttpResponse {
        HttpResponse::Ok().body(token.claims.user_id.to_string())
    }

    #[actix_web::test]
    async fn test_valid_token_is_accepted() {
        let db = TestDb::new();
        let (user, token) = test_utils::create_user(&db.pool, "user1").await;

        let app = test::init_service(
            App::new()
                .app_data(Data::new(db.pool.clone()))
                .route("/protected", web::get().to(protected)),
        )
        .await;

        let req = TestRequest::get()
            .uri("/protected")
            .insert_header(test_utils::bearer(&token))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body = test::read_body(resp).await;
        assert_eq!(body, user.id.to_string());
    }

    #[actix_web::test]
    async fn test_bad_tokens_are_rejected() {
        let db = TestDb::new();

        let app = test::init_service(
            App::new()
                .app_data(Data::new(db.pool.clone()))
                .route("/protected", web::get().to(protected)),
        )
        .await;

        let req = TestRequest::get().uri("/protected").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: ServerErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.err_type, ErrorType::TokenMissing);
        assert_eq!(body.err_message, "Missing Authorization Header");

        let req = TestRequest::get()
            .uri("/protected")
            .insert_header(test_utils::bearer("garbage"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: ServerErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.err_type, ErrorType::BadToken);

        let wrong_key_token = AuthToken::sign_new(
            &AuthTokenClaims::new(1, Duration::from_secs(60)),
            &[0; 64],
        );
        let req = TestRequest::get()
            .uri("/protected")
            .insert_header(test_utils::bearer(&wrong_key_token))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: ServerErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.err_type, ErrorType::BadToken);

        let mut expired_claims = AuthTokenClaims::new(1, Duration::from_secs(60));
        expired_claims.expiration -= 120;
        let expired_token = AuthToken::sign_new(&expired_claims, &env::CONF.token_signing_key);
        let req = TestRequest::get()
            .uri("/protected")
            .insert_header(test_utils::bearer(&expired_token))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: ServerErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.err_type, ErrorType::TokenExpired);
    }

    #[actix_web::test]
    async fn test_revoked_token_is_rejected() {
        let db = TestDb::new();
        let (user, token) = test_utils::create_user(&db.pool, "user1").await;
        let other_token = test_utils::gen_token(&user);

        let decoded = AuthToken::decode(&token).unwrap();
        db::auth::Dao::new(&db.pool)
            .revoke_token(&decoded.claims.token_id)
            .unwrap();

        let app = test::init_service(
            App::new()
                .app_data(Data::new(db.pool.clone()))
                .route("/protected", web::get().to(protected)),
        )
        .await;

        let req = TestRequest::get()
            .uri("/protected")
            .insert_header(test_utils::bearer(&token))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: ServerErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.err_type, ErrorType::TokenRevoked);
        assert_eq!(body.err_message, "Token has been revoked");

        // Other tokens for the same user are unaffected
        let req = TestRequest::get()
            .uri("/protected")
            .insert_header(test_utils::bearer(&other_token))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
