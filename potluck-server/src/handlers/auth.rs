use potluck_common::db::{self, DbThreadPool};
use potluck_common::request_io::{CredentialPair, OutputMessage, OutputToken};
use potluck_common::token::auth_token::{AuthToken, AuthTokenClaims};
use potluck_common::validators::MAX_PASSWORD_LENGTH;

use actix_web::{web, HttpResponse};

use crate::env;
use crate::handlers::credentials::verify_password;
use crate::handlers::error::HttpErrorResponse;
use crate::middleware::auth::VerifiedToken;

const WRONG_CREDENTIALS_MSG: &str = "Wrong email or password";

pub async fn login(
    db_thread_pool: web::Data<DbThreadPool>,
    credentials: web::Json<CredentialPair>,
) -> Result<HttpResponse, HttpErrorResponse> {
    if credentials.email.len() > 320 || credentials.password.len() > MAX_PASSWORD_LENGTH {
        return Err(HttpErrorResponse::IncorrectCredential(String::from(
            WRONG_CREDENTIALS_MSG,
        )));
    }

    let email = credentials.email.clone();
    let user_dao = db::user::Dao::new(&db_thread_pool);

    let user = match web::block(move || user_dao.get_user_by_email(&email)).await? {
        Ok(Some(u)) => u,
        // Same response as a wrong password so emails can't be enumerated
        Ok(None) => {
            return Err(HttpErrorResponse::IncorrectCredential(String::from(
                WRONG_CREDENTIALS_MSG,
            )));
        }
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError(String::from(
                "Failed to get user",
            )));
        }
    };

    if !verify_password(&credentials.password, &user.password_hash).await? {
        return Err(HttpErrorResponse::IncorrectCredential(String::from(
            WRONG_CREDENTIALS_MSG,
        )));
    }

    let claims = AuthTokenClaims::new(user.id, env::CONF.access_token_lifetime);
    let token = AuthToken::sign_new(&claims, &env::CONF.token_signing_key);

    log::debug!("User {} signed in with token {}", user.id, claims.token_id);

    Ok(HttpResponse::Ok().json(OutputToken { token }))
}

pub async fn logout(
    db_thread_pool: web::Data<DbThreadPool>,
    token: VerifiedToken,
) -> Result<HttpResponse, HttpErrorResponse> {
    let token_id = token.claims.token_id;
    let auth_dao = db::auth::Dao::new(&db_thread_pool);

    match web::block(move || auth_dao.revoke_token(&token_id)).await? {
        Ok(_) => (),
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError(String::from(
                "Failed to revoke token",
            )));
        }
    };

    Ok(HttpResponse::Ok().json(OutputMessage {
        msg: String::from("Access token revoked"),
    }))
}

pub async fn check(_token: VerifiedToken) -> HttpResponse {
    HttpResponse::Ok().json(OutputMessage {
        msg: String::from("Access"),
    })
}
