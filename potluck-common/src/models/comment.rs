use chrono::NaiveDateTime;
use diesel::{Identifiable, Insertable, Queryable, Selectable};

use crate::schema::comments;

#[derive(Clone, Debug, PartialEq, Eq, Identifiable, Queryable, Selectable)]
#[diesel(table_name = comments)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Comment {
    pub id: i32,
    pub user_id: i32,
    pub recipe_id: i32,
    pub body: String,
    pub created_timestamp: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = comments)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct NewComment<'a> {
    pub user_id: i32,
    pub recipe_id: i32,
    pub body: &'a str,
    pub created_timestamp: NaiveDateTime,
}
