use chrono::NaiveDateTime;
use diesel::Insertable;

use crate::schema::revoked_tokens;

#[derive(Debug, Insertable)]
#[diesel(table_name = revoked_tokens)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct NewRevokedToken<'a> {
    pub token_id: &'a str,
    pub revoked_timestamp: NaiveDateTime,
}
