use chrono::NaiveDateTime;
use diesel::Insertable;

use crate::schema::friendships;

/// One direction of a friendship. A friendship between two users is stored
/// as two rows, one per direction.
#[derive(Debug, Insertable)]
#[diesel(table_name = friendships)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct NewFriendship {
    pub user_id: i32,
    pub friend_id: i32,
    pub created_timestamp: NaiveDateTime,
}
