use chrono::NaiveDateTime;
use diesel::Insertable;

use crate::schema::friend_requests;

#[derive(Debug, Insertable)]
#[diesel(table_name = friend_requests)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct NewFriendRequest {
    pub sender_user_id: i32,
    pub recipient_user_id: i32,
    pub created_timestamp: NaiveDateTime,
}
