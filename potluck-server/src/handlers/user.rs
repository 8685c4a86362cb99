use potluck_common::db::{self, DaoError, DbThreadPool};
use potluck_common::models::user::PublicUser;
use potluck_common::request_io::{InputSearch, InputUser, OutputUser};
use potluck_common::validators::{self, Validity};

use actix_web::{web, HttpResponse};

use crate::handlers::credentials::hash_password;
use crate::handlers::error::HttpErrorResponse;
use crate::handlers::lookup;
use crate::middleware::auth::VerifiedToken;

pub async fn create(
    db_thread_pool: web::Data<DbThreadPool>,
    user_data: web::Json<InputUser>,
) -> Result<HttpResponse, HttpErrorResponse> {
    if let Validity::Invalid(msg) = validators::validate_user_name(&user_data.user_name) {
        return Err(HttpErrorResponse::IncorrectlyFormed(String::from(msg)));
    }

    if let Validity::Invalid(msg) = validators::validate_email_address(&user_data.email) {
        return Err(HttpErrorResponse::IncorrectlyFormed(String::from(msg)));
    }

    if let Validity::Invalid(msg) = validators::validate_password(&user_data.password) {
        return Err(HttpErrorResponse::IncorrectlyFormed(String::from(msg)));
    }

    let password_hash = hash_password(&user_data.password).await?;

    let user_name = user_data.user_name.clone();
    let email = user_data.email.clone();
    let user_dao = db::user::Dao::new(&db_thread_pool);

    let user = match web::block(move || user_dao.create_user(&user_name, &email, &password_hash))
        .await?
    {
        Ok(u) => u,
        Err(DaoError::AlreadyExists(field)) => {
            return Err(HttpErrorResponse::ConflictWithExisting(format!(
                "A user with that {field} already exists"
            )));
        }
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError(String::from(
                "Failed to create user",
            )));
        }
    };

    log::info!("Created user {}", user.id);

    Ok(HttpResponse::Created().json(PublicUser::from(&user)))
}

pub async fn get_self(
    db_thread_pool: web::Data<DbThreadPool>,
    token: VerifiedToken,
) -> Result<HttpResponse, HttpErrorResponse> {
    let user = lookup::user_by_id(&db_thread_pool, token.claims.user_id).await?;

    Ok(HttpResponse::Ok().json(OutputUser {
        id: user.id,
        name: user.name,
        email: user.email,
    }))
}

/// Users whose name contains the search term, never including the caller.
pub async fn search(
    db_thread_pool: web::Data<DbThreadPool>,
    token: VerifiedToken,
    query: web::Query<InputSearch>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let caller_id = token.claims.user_id;
    let search_term = query.into_inner().search_term;
    let user_dao = db::user::Dao::new(&db_thread_pool);

    let users = match web::block(move || user_dao.search_users(&search_term)).await? {
        Ok(u) => u,
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError(String::from(
                "Failed to search users",
            )));
        }
    };

    let result: Vec<PublicUser> = users
        .iter()
        .filter(|u| u.id != caller_id)
        .map(PublicUser::from)
        .collect();

    Ok(HttpResponse::Ok().json(result))
}
