use diesel::{dsl, ExpressionMethods, QueryDsl, QueryResult, RunQueryDsl, SqliteConnection};

use crate::models::friend_request::NewFriendRequest;
use crate::models::friendship::NewFriendship;
use crate::models::liked_recipe::NewLikedRecipe;
use crate::schema::friend_requests as friend_request_fields;
use crate::schema::friend_requests::dsl::friend_requests;
use crate::schema::friendships as friendship_fields;
use crate::schema::friendships::dsl::friendships;
use crate::schema::liked_recipes as liked_recipe_fields;
use crate::schema::liked_recipes::dsl::liked_recipes;

/// A set of directed edges stored in a junction table. Every method runs on
/// the caller's connection so several edge operations can share one
/// transaction.
pub trait EdgeSet {
    /// Inserts `from -> to`. Returns `false` if the edge was already present.
    fn add_edge(conn: &mut SqliteConnection, from: i32, to: i32) -> QueryResult<bool>;

    /// Deletes `from -> to`. Returns `false` if there was no such edge.
    fn remove_edge(conn: &mut SqliteConnection, from: i32, to: i32) -> QueryResult<bool>;

    fn has_edge(conn: &mut SqliteConnection, from: i32, to: i32) -> QueryResult<bool>;

    /// Ends of every edge leaving `from`, oldest edge first.
    fn targets(conn: &mut SqliteConnection, from: i32) -> QueryResult<Vec<i32>>;

    /// Starts of every edge entering `to`, oldest edge first.
    fn sources(conn: &mut SqliteConnection, to: i32) -> QueryResult<Vec<i32>>;
}

/// `user -> friend`. Each friendship is held as a pair of opposite edges.
pub struct Friendships;

/// `sender -> recipient` for pending friend requests.
pub struct FriendRequests;

/// `user -> recipe` for likes.
pub struct RecipeLikes;

impl EdgeSet for Friendships {
    fn add_edge(conn: &mut SqliteConnection, from: i32, to: i32) -> QueryResult<bool> {
        let new_friendship = NewFriendship {
            user_id: from,
            friend_id: to,
            created_timestamp: chrono::Utc::now().naive_utc(),
        };

        let inserted_count = diesel::insert_or_ignore_into(friendships)
            .values(&new_friendship)
            .execute(conn)?;

        Ok(inserted_count > 0)
    }

    fn remove_edge(conn: &mut SqliteConnection, from: i32, to: i32) -> QueryResult<bool> {
        let deleted_count = diesel::delete(
            friendships
                .filter(friendship_fields::user_id.eq(from))
                .filter(friendship_fields::friend_id.eq(to)),
        )
        .execute(conn)?;

        Ok(deleted_count > 0)
    }

    fn has_edge(conn: &mut SqliteConnection, from: i32, to: i32) -> QueryResult<bool> {
        dsl::select(dsl::exists(
            friendships
                .filter(friendship_fields::user_id.eq(from))
                .filter(friendship_fields::friend_id.eq(to)),
        ))
        .get_result(conn)
    }

    fn targets(conn: &mut SqliteConnection, from: i32) -> QueryResult<Vec<i32>> {
        friendships
            .select(friendship_fields::friend_id)
            .filter(friendship_fields::user_id.eq(from))
            .order(friendship_fields::id.asc())
            .load(conn)
    }

    fn sources(conn: &mut SqliteConnection, to: i32) -> QueryResult<Vec<i32>> {
        friendships
            .select(friendship_fields::user_id)
            .filter(friendship_fields::friend_id.eq(to))
            .order(friendship_fields::id.asc())
            .load(conn)
    }
}

impl EdgeSet for FriendRequests {
    fn add_edge(conn: &mut SqliteConnection, from: i32, to: i32) -> QueryResult<bool> {
        let new_request = NewFriendRequest {
            sender_user_id: from,
            recipient_user_id: to,
            created_timestamp: chrono::Utc::now().naive_utc(),
        };

        let inserted_count = diesel::insert_or_ignore_into(friend_requests)
            .values(&new_request)
            .execute(conn)?;

        Ok(inserted_count > 0)
    }

    fn remove_edge(conn: &mut SqliteConnection, from: i32, to: i32) -> QueryResult<bool> {
        let deleted_count = diesel::delete(
            friend_requests
                .filter(friend_request_fields::sender_user_id.eq(from))
                .filter(friend_request_fields::recipient_user_id.eq(to)),
        )
        .execute(conn)?;

        Ok(deleted_count > 0)
    }

    fn has_edge(conn: &mut SqliteConnection, from: i32, to: i32) -> QueryResult<bool> {
        dsl::select(dsl::exists(
            friend_requests
                .filter(friend_request_fields::sender_user_id.eq(from))
                .filter(friend_request_fields::recipient_user_id.eq(to)),
        ))
        .get_result(conn)
    }

    fn targets(conn: &mut SqliteConnection, from: i32) -> QueryResult<Vec<i32>> {
        friend_requests
            .select(friend_request_fields::recipient_user_id)
            .filter(friend_request_fields::sender_user_id.eq(from))
            .order(friend_request_fields::id.asc())
            .load(conn)
    }

    fn sources(conn: &mut SqliteConnection, to: i32) -> QueryResult<Vec<i32>> {
        friend_requests
            .select(friend_request_fields::sender_user_id)
            .filter(friend_request_fields::recipient_user_id.eq(to))
            .order(friend_request_fields::id.asc())
            .load(conn)
    }
}

impl EdgeSet for RecipeLikes {
    fn add_edge(conn: &mut SqliteConnection, from: i32, to: i32) -> QueryResult<bool> {
        let new_like = NewLikedRecipe {
            user_id: from,
            recipe_id: to,
            created_timestamp: chrono::Utc::now().naive_utc(),
        };

        let inserted_count = diesel::insert_or_ignore_into(liked_recipes)
            .values(&new_like)
            .execute(conn)?;

        Ok(inserted_count > 0)
    }

    fn remove_edge(conn: &mut SqliteConnection, from: i32, to: i32) -> QueryResult<bool> {
        let deleted_count = diesel::delete(
            liked_recipes
                .filter(liked_recipe_fields::user_id.eq(from))
                .filter(liked_recipe_fields::recipe_id.eq(to)),
        )
        .execute(conn)?;

        Ok(deleted_count > 0)
    }

    fn has_edge(conn: &mut SqliteConnection, from: i32, to: i32) -> QueryResult<bool> {
        dsl::select(dsl::exists(
            liked_recipes
                .filter(liked_recipe_fields::user_id.eq(from))
                .filter(liked_recipe_fields::recipe_id.eq(to)),
        ))
        .get_result(conn)
    }

    fn targets(conn: &mut SqliteConnection, from: i32) -> QueryResult<Vec<i32>> {
        liked_recipes
            .select(liked_recipe_fields::recipe_id)
            .filter(liked_recipe_fields::user_id.eq(from))
            .order(liked_recipe_fields::id.asc())
            .load(conn)
    }

    fn sources(conn: &mut SqliteConnection, to: i32) -> QueryResult<Vec<i32>> {
        liked_recipes
            .select(liked_recipe_fields::user_id)
            .filter(liked_recipe_fields::recipe_id.eq(to))
            .order(liked_recipe_fields::id.asc())
            .load(conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::db::test_utils::TestDb;

    #[test]
    fn test_add_edge_is_idempotent() {
        let db = TestDb::new();
        let user1 = db.create_user("user1");
        let user2 = db.create_user("user2");

        let mut conn = db.pool.get().unwrap();

        assert!(FriendRequests::add_edge(&mut conn, user1.id, user2.id).unwrap());
        assert!(!FriendRequests::add_edge(&mut conn, user1.id, user2.id).unwrap());

        assert_eq!(
            FriendRequests::targets(&mut conn, user1.id).unwrap(),
            vec![user2.id]
        );
        assert_eq!(
            FriendRequests::sources(&mut conn, user2.id).unwrap(),
            vec![user1.id]
        );
        assert!(FriendRequests::targets(&mut conn, user2.id)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_edges_are_directed() {
        let db = TestDb::new();
        let user1 = db.create_user("user1");
        let user2 = db.create_user("user2");

        let mut conn = db.pool.get().unwrap();

        Friendships::add_edge(&mut conn, user1.id, user2.id).unwrap();

        assert!(Friendships::has_edge(&mut conn, user1.id, user2.id).unwrap());
        assert!(!Friendships::has_edge(&mut conn, user2.id, user1.id).unwrap());

        assert!(!Friendships::remove_edge(&mut conn, user2.id, user1.id).unwrap());
        assert!(Friendships::remove_edge(&mut conn, user1.id, user2.id).unwrap());
        assert!(!Friendships::has_edge(&mut conn, user1.id, user2.id).unwrap());
    }

    #[test]
    fn test_self_friendship_edge_is_never_stored() {
        let db = TestDb::new();
        let user1 = db.create_user("user1");

        let mut conn = db.pool.get().unwrap();

        assert!(!Friendships::add_edge(&mut conn, user1.id, user1.id).unwrap());
        assert!(!Friendships::has_edge(&mut conn, user1.id, user1.id).unwrap());
    }

    #[test]
    fn test_targets_in_insertion_order() {
        let db = TestDb::new();
        let user1 = db.create_user("user1");
        let recipe1 = db.create_recipe(&user1, "recipe1");
        let recipe2 = db.create_recipe(&user1, "recipe2");
        let recipe3 = db.create_recipe(&user1, "recipe3");

        let mut conn = db.pool.get().unwrap();

        RecipeLikes::add_edge(&mut conn, user1.id, recipe3.id).unwrap();
        RecipeLikes::add_edge(&mut conn, user1.id, recipe1.id).unwrap();
        RecipeLikes::add_edge(&mut conn, user1.id, recipe2.id).unwrap();

        assert_eq!(
            RecipeLikes::targets(&mut conn, user1.id).unwrap(),
            vec![recipe3.id, recipe1.id, recipe2.id]
        );
        assert_eq!(
            RecipeLikes::sources(&mut conn, recipe1.id).unwrap(),
            vec![user1.id]
        );
    }
}
