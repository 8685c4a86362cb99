pub mod auth;
pub mod friend;
pub mod health;
pub mod recipe;
pub mod user;

pub mod credentials {
    use std::str::FromStr;
    use tokio::sync::oneshot;
    use zeroize::Zeroizing;

    use super::error::HttpErrorResponse;
    use crate::env;

    /// Hashes `password` with argon2id on the rayon pool, keyed with the
    /// server's hashing key. Returns the encoded hash string.
    pub async fn hash_password(password: &str) -> Result<String, HttpErrorResponse> {
        let password = Zeroizing::new(String::from(password));
        let (sender, receiver) = oneshot::channel();

        rayon::spawn(move || {
            let hash_result = argon2_kdf::Hasher::default()
                .algorithm(argon2_kdf::Algorithm::Argon2id)
                .salt_length(env::CONF.hash_salt_length)
                .hash_length(env::CONF.hash_length)
                .iterations(env::CONF.hash_iterations)
                .memory_cost_kib(env::CONF.hash_mem_cost_kib)
                .threads(env::CONF.hash_threads)
                .secret(argon2_kdf::Secret::using(&env::CONF.hashing_key))
                .hash(password.as_bytes());

            // The receiver is gone only if the request was dropped
            let _ = sender.send(hash_result.map(|hash| hash.to_string()));
        });

        match receiver.await? {
            Ok(hash) => Ok(hash),
            Err(e) => {
                log::error!("{e}");
                Err(HttpErrorResponse::InternalError(String::from(
                    "Failed to hash password",
                )))
            }
        }
    }

    pub async fn verify_password(
        password: &str,
        password_hash: &str,
    ) -> Result<bool, HttpErrorResponse> {
        let password = Zeroizing::new(String::from(password));
        let password_hash = String::from(password_hash);
        let (sender, receiver) = oneshot::channel();

        rayon::spawn(move || {
            let hash = match argon2_kdf::Hash::from_str(&password_hash) {
                Ok(h) => h,
                Err(e) => {
                    let _ = sender.send(Err(e));
                    return;
                }
            };

            let does_password_match_hash = hash.verify_with_secret(
                password.as_bytes(),
                argon2_kdf::Secret::using(&env::CONF.hashing_key),
            );

            let _ = sender.send(Ok(does_password_match_hash));
        });

        match receiver.await? {
            Ok(matches) => Ok(matches),
            Err(e) => {
                log::error!("{e}");
                Err(HttpErrorResponse::InternalError(String::from(
                    "Failed to validate password",
                )))
            }
        }
    }

}

pub mod lookup {
    use actix_web::web;
    use potluck_common::db::{self, DbThreadPool};
    use potluck_common::models::recipe::Recipe;
    use potluck_common::models::user::User;

    use super::error::{DoesNotExistType, HttpErrorResponse};

    pub async fn user_by_id(
        db_thread_pool: &DbThreadPool,
        user_id: i32,
    ) -> Result<User, HttpErrorResponse> {
        let user_dao = db::user::Dao::new(db_thread_pool);

        match web::block(move || user_dao.get_user_by_id(user_id)).await? {
            Ok(Some(user)) => Ok(user),
            Ok(None) => Err(HttpErrorResponse::DoesNotExist(
                String::from("User not found"),
                DoesNotExistType::User,
            )),
            Err(e) => {
                log::error!("{e}");
                Err(HttpErrorResponse::InternalError(String::from(
                    "Failed to get user",
                )))
            }
        }
    }

    pub async fn recipe_by_id(
        db_thread_pool: &DbThreadPool,
        recipe_id: i32,
    ) -> Result<Recipe, HttpErrorResponse> {
        let recipe_dao = db::recipe::Dao::new(db_thread_pool);

        match web::block(move || recipe_dao.get_recipe_by_id(recipe_id)).await? {
            Ok(Some(recipe)) => Ok(recipe),
            Ok(None) => Err(HttpErrorResponse::DoesNotExist(
                String::from("Recipe not found"),
                DoesNotExistType::Recipe,
            )),
            Err(e) => {
                log::error!("{e}");
                Err(HttpErrorResponse::InternalError(String::from(
                    "Failed to get recipe",
                )))
            }
        }
    }
}

pub mod error {
    use potluck_common::request_io::{ErrorType, ServerErrorResponse};
    use potluck_common::token::TokenError;

    use actix_web::error::{JsonPayloadError, QueryPayloadError};
    use actix_web::http::StatusCode;
    use actix_web::{HttpRequest, HttpResponse};
    use std::fmt;
    use tokio::sync::oneshot;

    #[derive(Debug)]
    pub enum DoesNotExistType {
        User,
        Recipe,
        FriendRequest,
    }

    #[derive(Debug)]
    pub enum HttpErrorResponse {
        // 400
        IncorrectlyFormed(String),
        InvalidState(String),

        // 401
        IncorrectCredential(String),
        BadToken(String),
        TokenExpired(String),
        TokenMissing(String),
        TokenRevoked(String),

        // 403
        UserDisallowed(String),

        // 404
        DoesNotExist(String, DoesNotExistType),

        // 409
        ConflictWithExisting(String),

        // 413
        InputTooLarge(String),

        // 500
        InternalError(String),
    }

    impl std::error::Error for HttpErrorResponse {}

    impl fmt::Display for HttpErrorResponse {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            let server_error: ServerErrorResponse = self.into();
            write!(f, "{:?}", server_error)
        }
    }

    impl From<HttpErrorResponse> for ServerErrorResponse {
        fn from(resp: HttpErrorResponse) -> Self {
            (&resp).into()
        }
    }

    impl From<&HttpErrorResponse> for ServerErrorResponse {
        fn from(resp: &HttpErrorResponse) -> Self {
            match resp {
                // 400
                HttpErrorResponse::IncorrectlyFormed(msg) => ServerErrorResponse {
                    err_type: ErrorType::IncorrectlyFormed,
                    err_message: format!("Incorrectly formed request: {msg}"),
                },
                HttpErrorResponse::InvalidState(msg) => ServerErrorResponse {
                    err_type: ErrorType::InvalidState,
                    err_message: format!("Invalid state: {msg}"),
                },

                // 401
                HttpErrorResponse::IncorrectCredential(msg) => ServerErrorResponse {
                    err_type: ErrorType::IncorrectCredential,
                    err_message: msg.clone(),
                },
                HttpErrorResponse::BadToken(msg) => ServerErrorResponse {
                    err_type: ErrorType::BadToken,
                    err_message: format!("Bad token: {msg}"),
                },
                HttpErrorResponse::TokenExpired(msg) => ServerErrorResponse {
                    err_type: ErrorType::TokenExpired,
                    err_message: msg.clone(),
                },
                HttpErrorResponse::TokenMissing(msg) => ServerErrorResponse {
                    err_type: ErrorType::TokenMissing,
                    err_message: msg.clone(),
                },
                HttpErrorResponse::TokenRevoked(msg) => ServerErrorResponse {
                    err_type: ErrorType::TokenRevoked,
                    err_message: msg.clone(),
                },

                // 403
                HttpErrorResponse::UserDisallowed(msg) => ServerErrorResponse {
                    err_type: ErrorType::UserDisallowed,
                    err_message: format!("User disallowed: {msg}"),
                },

                // 404
                HttpErrorResponse::DoesNotExist(msg, dne_type) => ServerErrorResponse {
                    err_type: match dne_type {
                        DoesNotExistType::User => ErrorType::UserDoesNotExist,
                        DoesNotExistType::Recipe => ErrorType::RecipeDoesNotExist,
                        DoesNotExistType::FriendRequest => ErrorType::FriendRequestDoesNotExist,
                    },
                    err_message: format!("Does not exist: {msg}"),
                },

                // 409
                HttpErrorResponse::ConflictWithExisting(msg) => ServerErrorResponse {
                    err_type: ErrorType::ConflictWithExisting,
                    err_message: format!("Conflict with existing data: {msg}"),
                },

                // 413
                HttpErrorResponse::InputTooLarge(msg) => ServerErrorResponse {
                    err_type: ErrorType::InputTooLarge,
                    err_message: format!("Input too large: {msg}"),
                },

                // 500
                HttpErrorResponse::InternalError(msg) => ServerErrorResponse {
                    err_type: ErrorType::InternalError,
                    err_message: format!("Internal error: {msg}"),
                },
            }
        }
    }

    impl actix_web::error::ResponseError for HttpErrorResponse {
        fn error_response(&self) -> HttpResponse {
            HttpResponse::build(self.status_code()).json(ServerErrorResponse::from(self))
        }

        fn status_code(&self) -> StatusCode {
            match *self {
                HttpErrorResponse::IncorrectlyFormed(_) | HttpErrorResponse::InvalidState(_) => {
                    StatusCode::BAD_REQUEST
                }
                HttpErrorResponse::IncorrectCredential(_)
                | HttpErrorResponse::BadToken(_)
                | HttpErrorResponse::TokenExpired(_)
                | HttpErrorResponse::TokenMissing(_)
                | HttpErrorResponse::TokenRevoked(_) => StatusCode::UNAUTHORIZED,
                HttpErrorResponse::UserDisallowed(_) => StatusCode::FORBIDDEN,
                HttpErrorResponse::DoesNotExist(_, _) => StatusCode::NOT_FOUND,
                HttpErrorResponse::ConflictWithExisting(_) => StatusCode::CONFLICT,
                HttpErrorResponse::InputTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
                HttpErrorResponse::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            }
        }
    }

    impl From<actix_web::error::BlockingError> for HttpErrorResponse {
        fn from(_err: actix_web::error::BlockingError) -> Self {
            HttpErrorResponse::InternalError(String::from("Actix thread pool failure"))
        }
    }

    impl From<oneshot::error::RecvError> for HttpErrorResponse {
        fn from(_err: oneshot::error::RecvError) -> Self {
            HttpErrorResponse::InternalError(String::from("Rayon thread pool failure"))
        }
    }

    impl From<TokenError> for HttpErrorResponse {
        fn from(err: TokenError) -> Self {
            match err {
                TokenError::TokenInvalid => {
                    HttpErrorResponse::BadToken(String::from("Invalid token"))
                }
                TokenError::TokenExpired => {
                    HttpErrorResponse::TokenExpired(String::from("Token has expired"))
                }
                TokenError::TokenMissing => HttpErrorResponse::TokenMissing(String::from(
                    "Missing Authorization Header",
                )),
                TokenError::TokenRevoked => {
                    HttpErrorResponse::TokenRevoked(String::from("Token has been revoked"))
                }
            }
        }
    }

    pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
        match err {
            JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
                HttpErrorResponse::InputTooLarge(err.to_string()).into()
            }
            _ => HttpErrorResponse::IncorrectlyFormed(err.to_string()).into(),
        }
    }

    pub fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
        HttpErrorResponse::IncorrectlyFormed(err.to_string()).into()
    }

}
