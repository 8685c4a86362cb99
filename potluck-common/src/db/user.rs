use diesel::{
    dsl, EscapeExpressionMethods, ExpressionMethods, OptionalExtension, QueryDsl,
    RunQueryDsl, SelectableHelper, SqliteConnection, TextExpressionMethods,
};
use std::collections::HashMap;

use crate::db::{lower, substring_pattern, DaoError, DbThreadPool};
use crate::models::user::{NewUser, PublicUser, User};
use crate::schema::users as user_fields;
use crate::schema::users::dsl::users;

pub struct Dao {
    db_thread_pool: DbThreadPool,
}

impl Dao {
    pub fn new(db_thread_pool: &DbThreadPool) -> Self {
        Self {
            db_thread_pool: db_thread_pool.clone(),
        }
    }

    /// Emails are compared and stored in lower case. Fails with
    /// `DaoError::AlreadyExists` naming the field that collided.
    pub fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, DaoError> {
        let email = email.to_lowercase();

        let new_user = NewUser {
            name,
            email: &email,
            password_hash,
            created_timestamp: chrono::Utc::now().naive_utc(),
        };

        let mut db_connection = self.db_thread_pool.get()?;

        db_connection.immediate_transaction::<_, DaoError, _>(|conn| {
            let email_taken: bool = dsl::select(dsl::exists(
                users.filter(user_fields::email.eq(new_user.email)),
            ))
            .get_result(conn)?;

            if email_taken {
                return Err(DaoError::AlreadyExists("email"));
            }

            let name_taken: bool = dsl::select(dsl::exists(
                users.filter(user_fields::name.eq(new_user.name)),
            ))
            .get_result(conn)?;

            if name_taken {
                return Err(DaoError::AlreadyExists("name"));
            }

            let user = dsl::insert_into(users)
                .values(&new_user)
                .returning(User::as_returning())
                .get_result::<User>(conn)
                .map_err(|e| match e {
                    diesel::result::Error::DatabaseError(
                        diesel::result::DatabaseErrorKind::UniqueViolation,
                        _,
                    ) => DaoError::AlreadyExists("name or email"),
                    e => DaoError::QueryFailure(e),
                })?;

            Ok(user)
        })
    }

    pub fn get_user_by_id(&self, user_id: i32) -> Result<Option<User>, DaoError> {
        Ok(users
            .find(user_id)
            .select(User::as_select())
            .first(&mut self.db_thread_pool.get()?)
            .optional()?)
    }

    pub fn get_user_by_name(&self, name: &str) -> Result<Option<User>, DaoError> {
        Ok(users
            .filter(user_fields::name.eq(name))
            .select(User::as_select())
            .first(&mut self.db_thread_pool.get()?)
            .optional()?)
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>, DaoError> {
        Ok(users
            .filter(user_fields::email.eq(email.to_lowercase()))
            .select(User::as_select())
            .first(&mut self.db_thread_pool.get()?)
            .optional()?)
    }

    /// Case-insensitive substring search on user names, oldest user first.
    /// An empty `name_match` returns every user.
    pub fn search_users(&self, name_match: &str) -> Result<Vec<User>, DaoError> {
        Ok(users
            .filter(lower(user_fields::name).like(substring_pattern(name_match)).escape('\\'))
            .order(user_fields::id.asc())
            .select(User::as_select())
            .load(&mut self.db_thread_pool.get()?)?)
    }

    /// Public projections of the given users, in the order of `user_ids`.
    /// IDs with no matching user are skipped.
    pub fn get_public_users(&self, user_ids: &[i32]) -> Result<Vec<PublicUser>, DaoError> {
        let mut db_connection = self.db_thread_pool.get()?;
        Ok(load_public_users(&mut db_connection, user_ids)?)
    }

    /// Users with the given IDs, oldest first.
    pub fn get_users(&self, user_ids: &[i32]) -> Result<Vec<User>, DaoError> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        Ok(users
            .filter(user_fields::id.eq_any(user_ids))
            .order(user_fields::id.asc())
            .select(User::as_select())
            .load(&mut self.db_thread_pool.get()?)?)
    }
}

pub(crate) fn load_public_users(
    conn: &mut SqliteConnection,
    user_ids: &[i32],
) -> diesel::QueryResult<Vec<PublicUser>> {
    if user_ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut found: HashMap<i32, PublicUser> = users
        .filter(user_fields::id.eq_any(user_ids))
        .select(PublicUser::as_select())
        .load::<PublicUser>(conn)?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    Ok(user_ids.iter().filter_map(|id| found.remove(id)).collect())
}
