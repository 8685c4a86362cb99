use potluck_common::db::friend::Relationship;
use potluck_common::db::{self, DaoError, DbThreadPool};
use potluck_common::models::user::User;
use potluck_common::request_io::{InputUserId, OutputFriendLists};

use actix_web::{web, HttpResponse};

use crate::handlers::error::{DoesNotExistType, HttpErrorResponse};
use crate::handlers::lookup;
use crate::middleware::auth::VerifiedToken;

async fn caller_and_target(
    db_thread_pool: &DbThreadPool,
    token: &VerifiedToken,
    target_id: i32,
) -> Result<(User, User), HttpErrorResponse> {
    if token.claims.user_id == target_id {
        return Err(HttpErrorResponse::InvalidState(String::from(
            "Users cannot befriend themselves",
        )));
    }

    let caller = lookup::user_by_id(db_thread_pool, token.claims.user_id).await?;
    let target = lookup::user_by_id(db_thread_pool, target_id).await?;

    Ok((caller, target))
}

pub async fn list(
    db_thread_pool: web::Data<DbThreadPool>,
    token: VerifiedToken,
) -> Result<HttpResponse, HttpErrorResponse> {
    let user = lookup::user_by_id(&db_thread_pool, token.claims.user_id).await?;
    let friend_dao = db::friend::Dao::new(&db_thread_pool);

    let lists = match web::block(move || friend_dao.get_friend_lists(&user)).await? {
        Ok(l) => l,
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError(String::from(
                "Failed to get friends",
            )));
        }
    };

    Ok(HttpResponse::Ok().json(OutputFriendLists {
        friends: lists.friends,
        requests_sent: lists.requests_sent,
        requests_received: lists.requests_received,
    }))
}

pub async fn send_request(
    db_thread_pool: web::Data<DbThreadPool>,
    token: VerifiedToken,
    recipient: web::Json<InputUserId>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let (sender, recipient) = caller_and_target(&db_thread_pool, &token, recipient.id).await?;
    let friend_dao = db::friend::Dao::new(&db_thread_pool);

    let relationship = match web::block(move || {
        let relationship = friend_dao.get_relationship(&sender, &recipient)?;

        if relationship != Relationship::Friends {
            friend_dao.create_friend_request(&sender, &recipient)?;
        }

        Ok::<_, DaoError>(relationship)
    })
    .await?
    {
        Ok(r) => r,
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError(String::from(
                "Failed to send friend request",
            )));
        }
    };

    if relationship == Relationship::Friends {
        return Err(HttpErrorResponse::InvalidState(String::from(
            "Users are already friends",
        )));
    }

    Ok(HttpResponse::Ok().finish())
}

pub async fn cancel_request(
    db_thread_pool: web::Data<DbThreadPool>,
    token: VerifiedToken,
    other_user: web::Query<InputUserId>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let (user, other_user) = caller_and_target(&db_thread_pool, &token, other_user.id).await?;
    let friend_dao = db::friend::Dao::new(&db_thread_pool);

    match web::block(move || friend_dao.cancel_friend_request(&user, &other_user)).await? {
        Ok(_) => (),
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError(String::from(
                "Failed to cancel friend request",
            )));
        }
    };

    Ok(HttpResponse::Ok().finish())
}

/// Accepts a pending request between the caller and the other user, sent in
/// either direction. Already being friends is not an error.
pub async fn accept_request(
    db_thread_pool: web::Data<DbThreadPool>,
    token: VerifiedToken,
    other_user: web::Json<InputUserId>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let (user, other_user) = caller_and_target(&db_thread_pool, &token, other_user.id).await?;
    let friend_dao = db::friend::Dao::new(&db_thread_pool);

    let relationship = match web::block(move || {
        let relationship = friend_dao.get_relationship(&user, &other_user)?;

        if matches!(
            relationship,
            Relationship::RequestSent | Relationship::RequestReceived
        ) {
            friend_dao.accept_friend_request(&user, &other_user)?;
        }

        Ok::<_, DaoError>(relationship)
    })
    .await?
    {
        Ok(r) => r,
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError(String::from(
                "Failed to accept friend request",
            )));
        }
    };

    if relationship == Relationship::NotConnected {
        return Err(HttpErrorResponse::DoesNotExist(
            String::from("No pending friend request between these users"),
            DoesNotExistType::FriendRequest,
        ));
    }

    Ok(HttpResponse::Ok().finish())
}

pub async fn remove(
    db_thread_pool: web::Data<DbThreadPool>,
    token: VerifiedToken,
    friend: web::Query<InputUserId>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let (user, friend) = caller_and_target(&db_thread_pool, &token, friend.id).await?;
    let friend_dao = db::friend::Dao::new(&db_thread_pool);

    match web::block(move || friend_dao.remove_friendship(&user, &friend)).await? {
        Ok(_) => (),
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError(String::from(
                "Failed to remove friend",
            )));
        }
    };

    Ok(HttpResponse::Ok().finish())
}
