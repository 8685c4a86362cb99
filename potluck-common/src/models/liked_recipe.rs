use chrono::NaiveDateTime;
use diesel::Insertable;

use crate::schema::liked_recipes;

#[derive(Debug, Insertable)]
#[diesel(table_name = liked_recipes)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct NewLikedRecipe {
    pub user_id: i32,
    pub recipe_id: i32,
    pub created_timestamp: NaiveDateTime,
}
