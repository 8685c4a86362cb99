use diesel::{dsl, ExpressionMethods, QueryDsl, RunQueryDsl};

use crate::db::{DaoError, DbThreadPool};
use crate::models::revoked_token::NewRevokedToken;
use crate::schema::revoked_tokens as revoked_token_fields;
use crate::schema::revoked_tokens::dsl::revoked_tokens;

pub struct Dao {
    db_thread_pool: DbThreadPool,
}

impl Dao {
    pub fn new(db_thread_pool: &DbThreadPool) -> Self {
        Self {
            db_thread_pool: db_thread_pool.clone(),
        }
    }

    /// Adds `token_id` to the denylist. Revoking a token twice is a no-op.
    pub fn revoke_token(&self, token_id: &str) -> Result<(), DaoError> {
        let revoked_token = NewRevokedToken {
            token_id,
            revoked_timestamp: chrono::Utc::now().naive_utc(),
        };

        diesel::insert_or_ignore_into(revoked_tokens)
            .values(&revoked_token)
            .execute(&mut self.db_thread_pool.get()?)?;

        Ok(())
    }

    pub fn is_token_revoked(&self, token_id: &str) -> Result<bool, DaoError> {
        Ok(dsl::select(dsl::exists(
            revoked_tokens.filter(revoked_token_fields::token_id.eq(token_id)),
        ))
        .get_result(&mut self.db_thread_pool.get()?)?)
    }
}
