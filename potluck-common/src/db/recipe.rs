use diesel::{
    dsl, Connection, EscapeExpressionMethods, ExpressionMethods, OptionalExtension, QueryDsl,
    RunQueryDsl, SelectableHelper, SqliteConnection, TextExpressionMethods,
};
use std::collections::HashMap;

use crate::db::edge::{EdgeSet, RecipeLikes};
use crate::db::{lower, substring_pattern, DaoError, DbThreadPool};
use crate::models::comment::{Comment, NewComment};
use crate::models::recipe::{NewRecipe, Recipe, RecipeChanges, RecipeChangeset};
use crate::models::user::User;
use crate::schema::comments as comment_fields;
use crate::schema::comments::dsl::comments;
use crate::schema::liked_recipes as liked_recipe_fields;
use crate::schema::liked_recipes::dsl::liked_recipes;
use crate::schema::recipes as recipe_fields;
use crate::schema::recipes::dsl::recipes;
use crate::schema::users as user_fields;
use crate::schema::users::dsl::users;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommentWithAuthor {
    pub comment: Comment,
    pub author_name: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecipeDetails {
    pub author_name: String,
    pub comments: Vec<CommentWithAuthor>,
    pub like_count: usize,
}

pub struct Dao {
    db_thread_pool: DbThreadPool,
}

impl Dao {
    pub fn new(db_thread_pool: &DbThreadPool) -> Self {
        Self {
            db_thread_pool: db_thread_pool.clone(),
        }
    }

    pub fn create_recipe(
        &self,
        author: &User,
        name: &str,
        ingredients: &str,
        instructions: &str,
        image: &str,
    ) -> Result<Recipe, DaoError> {
        let new_recipe = NewRecipe {
            user_id: author.id,
            name,
            ingredients,
            instructions,
            image,
            created_timestamp: chrono::Utc::now().naive_utc(),
        };

        Ok(dsl::insert_into(recipes)
            .values(&new_recipe)
            .returning(Recipe::as_returning())
            .get_result(&mut self.db_thread_pool.get()?)?)
    }

    pub fn get_recipe_by_id(&self, recipe_id: i32) -> Result<Option<Recipe>, DaoError> {
        Ok(recipes
            .find(recipe_id)
            .select(Recipe::as_select())
            .first(&mut self.db_thread_pool.get()?)
            .optional()?)
    }

    /// The author's name, the comments (oldest first) and the number of
    /// likes for `recipe`.
    pub fn get_recipe_details(&self, recipe: &Recipe) -> Result<RecipeDetails, DaoError> {
        let mut db_connection = self.db_thread_pool.get()?;

        db_connection.transaction::<_, DaoError, _>(|conn| {
            let author_name = users
                .find(recipe.user_id)
                .select(user_fields::name)
                .first::<String>(conn)?;

            let recipe_comments = comments
                .inner_join(users)
                .filter(comment_fields::recipe_id.eq(recipe.id))
                .order(comment_fields::id.asc())
                .select((Comment::as_select(), user_fields::name))
                .load::<(Comment, String)>(conn)?
                .into_iter()
                .map(|(comment, author_name)| CommentWithAuthor {
                    comment,
                    author_name,
                })
                .collect();

            let like_count = RecipeLikes::sources(conn, recipe.id)?.len();

            Ok(RecipeDetails {
                author_name,
                comments: recipe_comments,
                like_count,
            })
        })
    }

    /// Applies the non-empty fields of `changes` and returns the recipe as
    /// stored afterward.
    pub fn change_recipe(
        &self,
        recipe: &Recipe,
        changes: &RecipeChanges,
    ) -> Result<Recipe, DaoError> {
        let changeset = RecipeChangeset::from_changes(changes);
        let mut db_connection = self.db_thread_pool.get()?;

        if changeset.is_empty() {
            return Ok(recipes
                .find(recipe.id)
                .select(Recipe::as_select())
                .first(&mut db_connection)?);
        }

        Ok(diesel::update(recipes.find(recipe.id))
            .set(&changeset)
            .returning(Recipe::as_returning())
            .get_result(&mut db_connection)?)
    }

    /// Deletes the recipe together with its comments and likes.
    pub fn delete_recipe(&self, recipe: &Recipe) -> Result<(), DaoError> {
        let mut db_connection = self.db_thread_pool.get()?;

        db_connection.immediate_transaction::<_, DaoError, _>(|conn| {
            diesel::delete(comments.filter(comment_fields::recipe_id.eq(recipe.id)))
                .execute(conn)?;
            diesel::delete(liked_recipes.filter(liked_recipe_fields::recipe_id.eq(recipe.id)))
                .execute(conn)?;
            diesel::delete(recipes.find(recipe.id)).execute(conn)?;

            Ok(())
        })
    }

    pub fn get_recipes_by_user(&self, user: &User) -> Result<Vec<Recipe>, DaoError> {
        Ok(recipes
            .filter(recipe_fields::user_id.eq(user.id))
            .order(recipe_fields::id.asc())
            .select(Recipe::as_select())
            .load(&mut self.db_thread_pool.get()?)?)
    }

    /// Case-insensitive substring search on recipe names, oldest recipe
    /// first. An empty `name_match` returns every recipe.
    pub fn search_recipes(&self, name_match: &str) -> Result<Vec<Recipe>, DaoError> {
        Ok(recipes
            .filter(lower(recipe_fields::name).like(substring_pattern(name_match)).escape('\\'))
            .order(recipe_fields::id.asc())
            .select(Recipe::as_select())
            .load(&mut self.db_thread_pool.get()?)?)
    }

    /// Recipes written by any of `authors` whose name contains `name_match`,
    /// newest first.
    pub fn latest_recipes(
        &self,
        authors: &[User],
        name_match: &str,
    ) -> Result<Vec<Recipe>, DaoError> {
        if authors.is_empty() {
            return Ok(Vec::new());
        }

        let author_ids: Vec<i32> = authors.iter().map(|u| u.id).collect();

        Ok(recipes
            .filter(recipe_fields::user_id.eq_any(author_ids))
            .filter(lower(recipe_fields::name).like(substring_pattern(name_match)).escape('\\'))
            .order(recipe_fields::id.desc())
            .select(Recipe::as_select())
            .load(&mut self.db_thread_pool.get()?)?)
    }

    pub fn create_comment(
        &self,
        author: &User,
        recipe: &Recipe,
        text: &str,
    ) -> Result<Comment, DaoError> {
        let new_comment = NewComment {
            user_id: author.id,
            recipe_id: recipe.id,
            body: text,
            created_timestamp: chrono::Utc::now().naive_utc(),
        };

        Ok(dsl::insert_into(comments)
            .values(&new_comment)
            .returning(Comment::as_returning())
            .get_result(&mut self.db_thread_pool.get()?)?)
    }

    pub fn like_recipe(&self, user: &User, recipe: &Recipe) -> Result<(), DaoError> {
        let mut db_connection = self.db_thread_pool.get()?;

        db_connection.immediate_transaction::<_, DaoError, _>(|conn| {
            RecipeLikes::add_edge(conn, user.id, recipe.id)?;
            Ok(())
        })
    }

    pub fn stop_like_recipe(&self, user: &User, recipe: &Recipe) -> Result<(), DaoError> {
        let mut db_connection = self.db_thread_pool.get()?;

        db_connection.immediate_transaction::<_, DaoError, _>(|conn| {
            RecipeLikes::remove_edge(conn, user.id, recipe.id)?;
            Ok(())
        })
    }

    pub fn is_liked(&self, user: &User, recipe: &Recipe) -> Result<bool, DaoError> {
        let mut db_connection = self.db_thread_pool.get()?;
        Ok(RecipeLikes::has_edge(&mut db_connection, user.id, recipe.id)?)
    }

    /// Recipes `user` has liked, in the order they were liked.
    pub fn get_liked_recipes(&self, user: &User) -> Result<Vec<Recipe>, DaoError> {
        let mut db_connection = self.db_thread_pool.get()?;

        db_connection.transaction::<_, DaoError, _>(|conn| {
            let recipe_ids = RecipeLikes::targets(conn, user.id)?;
            Ok(load_recipes(conn, &recipe_ids)?)
        })
    }
}

fn load_recipes(
    conn: &mut SqliteConnection,
    recipe_ids: &[i32],
) -> diesel::QueryResult<Vec<Recipe>> {
    if recipe_ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut found: HashMap<i32, Recipe> = recipes
        .filter(recipe_fields::id.eq_any(recipe_ids))
        .select(Recipe::as_select())
        .load::<Recipe>(conn)?
        .into_iter()
        .map(|r| (r.id, r))
        .collect();

    Ok(recipe_ids.iter().filter_map(|id| found.remove(id)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::db::test_utils::TestDb;

    #[test]
    fn test_create_and_get_recipe() {
        let db = TestDb::new();
        let recipe_dao = Dao::new(&db.pool);

        let user1 = db.create_user("user1");

        let recipe = recipe_dao
            .create_recipe(
                &user1,
                "Pancakes",
                "[\"flour\",\"milk\"]",
                "[\"mix\",\"fry\"]",
                "pancakes.png",
            )
            .unwrap();

        assert_eq!(recipe.user_id, user1.id);
        assert_eq!(recipe.name, "Pancakes");
        assert_eq!(recipe.ingredients, "[\"flour\",\"milk\"]");
        assert_eq!(recipe.instructions, "[\"mix\",\"fry\"]");
        assert_eq!(recipe.image, "pancakes.png");

        let fetched = recipe_dao.get_recipe_by_id(recipe.id).unwrap().unwrap();
        assert_eq!(fetched, recipe);

        assert!(recipe_dao.get_recipe_by_id(recipe.id + 1).unwrap().is_none());
        assert_eq!(recipe_dao.get_recipes_by_user(&user1).unwrap(), vec![recipe]);
    }

    #[test]
    fn test_large_fields_are_stored_intact() {
        let db = TestDb::new();
        let recipe_dao = Dao::new(&db.pool);

        let user1 = db.create_user("user1");

        let name = "name".repeat(10_000);
        let image = "image as a string".repeat(10_000);

        let recipe = recipe_dao
            .create_recipe(&user1, &name, "[]", "[]", &image)
            .unwrap();

        let fetched = recipe_dao.get_recipe_by_id(recipe.id).unwrap().unwrap();
        assert_eq!(fetched.name, name);
        assert_eq!(fetched.image, image);
    }

    #[test]
    fn test_change_recipe() {
        let db = TestDb::new();
        let recipe_dao = Dao::new(&db.pool);

        let user1 = db.create_user("user1");
        let recipe = recipe_dao
            .create_recipe(&user1, "Soup", "[\"water\"]", "[\"boil\"]", "soup.png")
            .unwrap();

        let changes = RecipeChanges {
            name: Some(String::from("Tomato soup")),
            ingredients: Some(String::new()),
            instructions: None,
            image: Some(String::from("tomato.png")),
        };

        let changed = recipe_dao.change_recipe(&recipe, &changes).unwrap();

        assert_eq!(changed.id, recipe.id);
        assert_eq!(changed.name, "Tomato soup");
        assert_eq!(changed.ingredients, "[\"water\"]");
        assert_eq!(changed.instructions, "[\"boil\"]");
        assert_eq!(changed.image, "tomato.png");

        let fetched = recipe_dao.get_recipe_by_id(recipe.id).unwrap().unwrap();
        assert_eq!(fetched, changed);

        let unchanged = recipe_dao
            .change_recipe(&fetched, &RecipeChanges::default())
            .unwrap();
        assert_eq!(unchanged, fetched);
    }

    #[test]
    fn test_delete_recipe() {
        let db = TestDb::new();
        let recipe_dao = Dao::new(&db.pool);

        let user1 = db.create_user("user1");
        let user2 = db.create_user("user2");

        let recipe = db.create_recipe(&user1, "recipe1");
        let other = db.create_recipe(&user1, "recipe2");

        recipe_dao.create_comment(&user2, &recipe, "Tasty").unwrap();
        recipe_dao.like_recipe(&user2, &recipe).unwrap();
        recipe_dao.like_recipe(&user2, &other).unwrap();

        recipe_dao.delete_recipe(&recipe).unwrap();

        assert!(recipe_dao.get_recipe_by_id(recipe.id).unwrap().is_none());
        assert_eq!(
            recipe_dao.get_recipes_by_user(&user1).unwrap(),
            vec![other.clone()]
        );
        assert_eq!(
            recipe_dao.get_liked_recipes(&user2).unwrap(),
            vec![other.clone()]
        );

        let mut conn = db.pool.get().unwrap();
        let comment_count = comments
            .filter(comment_fields::recipe_id.eq(recipe.id))
            .count()
            .get_result::<i64>(&mut conn)
            .unwrap();
        assert_eq!(comment_count, 0);

        drop(conn);

        recipe_dao.delete_recipe(&other).unwrap();
        assert!(recipe_dao.get_recipes_by_user(&user1).unwrap().is_empty());
    }

    #[test]
    fn test_search_recipes() {
        let db = TestDb::new();
        let recipe_dao = Dao::new(&db.pool);

        let user1 = db.create_user("user1");
        let user2 = db.create_user("user2");

        let recipe1 = db.create_recipe(&user1, "Apple pie");
        let recipe2 = db.create_recipe(&user2, "Pineapple cake");
        let recipe3 = db.create_recipe(&user1, "Bread");

        assert_eq!(
            recipe_dao.search_recipes("").unwrap(),
            vec![recipe1.clone(), recipe2.clone(), recipe3.clone()]
        );
        assert_eq!(
            recipe_dao.search_recipes("APPLE").unwrap(),
            vec![recipe1.clone(), recipe2.clone()]
        );
        assert_eq!(recipe_dao.search_recipes("rEaD").unwrap(), vec![recipe3]);
        assert!(recipe_dao.search_recipes("soup").unwrap().is_empty());
    }

    #[test]
    fn test_latest_recipes() {
        let db = TestDb::new();
        let recipe_dao = Dao::new(&db.pool);

        let user1 = db.create_user("user1");
        let user2 = db.create_user("user2");
        let user3 = db.create_user("user3");

        let r1 = db.create_recipe(&user1, "recipe1");
        let r2 = db.create_recipe(&user2, "recipe2");
        let r3 = db.create_recipe(&user3, "recipe3");
        let r4 = db.create_recipe(&user1, "other4");
        let r5 = db.create_recipe(&user2, "recipe5");

        assert_eq!(
            recipe_dao
                .latest_recipes(&[user1.clone(), user2.clone()], "")
                .unwrap(),
            vec![r5.clone(), r4.clone(), r2.clone(), r1.clone()]
        );
        assert_eq!(
            recipe_dao.latest_recipes(&[user2.clone()], "").unwrap(),
            vec![r5.clone(), r2.clone()]
        );
        assert_eq!(
            recipe_dao
                .latest_recipes(&[user1.clone(), user3.clone()], "RECIPE")
                .unwrap(),
            vec![r3, r1]
        );
        assert!(recipe_dao.latest_recipes(&[], "").unwrap().is_empty());
    }

    #[test]
    fn test_comments() {
        let db = TestDb::new();
        let recipe_dao = Dao::new(&db.pool);

        let user1 = db.create_user("user1");
        let user2 = db.create_user("user2");
        let recipe = db.create_recipe(&user1, "recipe1");

        let comment1 = recipe_dao.create_comment(&user2, &recipe, "Looks good").unwrap();
        let comment2 = recipe_dao.create_comment(&user1, &recipe, "Thanks!").unwrap();

        assert_eq!(comment1.user_id, user2.id);
        assert_eq!(comment1.recipe_id, recipe.id);
        assert_eq!(comment1.body, "Looks good");

        let details = recipe_dao.get_recipe_details(&recipe).unwrap();

        assert_eq!(details.author_name, "user1");
        assert_eq!(
            details.comments,
            vec![
                CommentWithAuthor {
                    comment: comment1,
                    author_name: String::from("user2"),
                },
                CommentWithAuthor {
                    comment: comment2,
                    author_name: String::from("user1"),
                },
            ]
        );
        assert_eq!(details.like_count, 0);
    }

    #[test]
    fn test_like_is_idempotent() {
        let db = TestDb::new();
        let recipe_dao = Dao::new(&db.pool);

        let user1 = db.create_user("user1");
        let user2 = db.create_user("user2");
        let recipe = db.create_recipe(&user1, "recipe1");

        assert!(!recipe_dao.is_liked(&user2, &recipe).unwrap());

        recipe_dao.like_recipe(&user2, &recipe).unwrap();
        recipe_dao.like_recipe(&user2, &recipe).unwrap();
        recipe_dao.like_recipe(&user2, &recipe).unwrap();

        assert!(recipe_dao.is_liked(&user2, &recipe).unwrap());
        assert!(!recipe_dao.is_liked(&user1, &recipe).unwrap());
        assert_eq!(
            recipe_dao.get_liked_recipes(&user2).unwrap(),
            vec![recipe.clone()]
        );
        assert_eq!(recipe_dao.get_recipe_details(&recipe).unwrap().like_count, 1);

        recipe_dao.like_recipe(&user1, &recipe).unwrap();
        assert_eq!(recipe_dao.get_recipe_details(&recipe).unwrap().like_count, 2);
    }

    #[test]
    fn test_stop_like_recipe() {
        let db = TestDb::new();
        let recipe_dao = Dao::new(&db.pool);

        let user1 = db.create_user("user1");
        let recipe1 = db.create_recipe(&user1, "recipe1");
        let recipe2 = db.create_recipe(&user1, "recipe2");

        // Never liked
        recipe_dao.stop_like_recipe(&user1, &recipe1).unwrap();
        assert!(recipe_dao.get_liked_recipes(&user1).unwrap().is_empty());

        recipe_dao.like_recipe(&user1, &recipe2).unwrap();
        recipe_dao.like_recipe(&user1, &recipe1).unwrap();
        assert_eq!(
            recipe_dao.get_liked_recipes(&user1).unwrap(),
            vec![recipe2.clone(), recipe1.clone()]
        );

        recipe_dao.stop_like_recipe(&user1, &recipe2).unwrap();
        recipe_dao.stop_like_recipe(&user1, &recipe2).unwrap();

        assert_eq!(
            recipe_dao.get_liked_recipes(&user1).unwrap(),
            vec![recipe1.clone()]
        );
        assert!(!recipe_dao.is_liked(&user1, &recipe2).unwrap());
    }
}
