use diesel::{Connection, SqliteConnection};

use crate::db::edge::{EdgeSet, FriendRequests, Friendships};
use crate::db::user::load_public_users;
use crate::db::{DaoError, DbThreadPool};
use crate::models::user::{PublicUser, User};

/// How one user stands with another, seen from the first user.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Relationship {
    NotConnected,
    Friends,
    RequestSent,
    RequestReceived,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FriendLists {
    pub friends: Vec<PublicUser>,
    pub requests_sent: Vec<PublicUser>,
    pub requests_received: Vec<PublicUser>,
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

    /// Adds the pending request `sender -> receiver`. Sending the same
    /// request twice leaves a single request behind.
    pub fn create_friend_request(&self, sender: &User, receiver: &User) -> Result<(), DaoError> {
        let mut db_connection = self.db_thread_pool.get()?;

        db_connection.immediate_transaction::<_, DaoError, _>(|conn| {
            FriendRequests::add_edge(conn, sender.id, receiver.id)?;
            Ok(())
        })
    }

    /// Removes the pending request between the two users, looking at
    /// `user1 -> user2` before `user2 -> user1`. Does nothing if neither
    /// exists.
    pub fn cancel_friend_request(&self, user1: &User, user2: &User) -> Result<(), DaoError> {
        let mut db_connection = self.db_thread_pool.get()?;

        db_connection.immediate_transaction::<_, DaoError, _>(|conn| {
            cancel_pending_request(conn, user1.id, user2.id)?;
            Ok(())
        })
    }

    /// Drops the pending requests between the users (in both directions)
    /// and makes them friends, all in one transaction.
    pub fn accept_friend_request(&self, user1: &User, user2: &User) -> Result<(), DaoError> {
        if user1.id == user2.id {
            return Err(DaoError::CannotRunQuery(
                "A user cannot become friends with themselves",
            ));
        }

        let mut db_connection = self.db_thread_pool.get()?;

        db_connection.immediate_transaction::<_, DaoError, _>(|conn| {
            FriendRequests::remove_edge(conn, user1.id, user2.id)?;
            FriendRequests::remove_edge(conn, user2.id, user1.id)?;

            Friendships::add_edge(conn, user1.id, user2.id)?;
            Friendships::add_edge(conn, user2.id, user1.id)?;

            Ok(())
        })
    }

    pub fn remove_friendship(&self, user1: &User, user2: &User) -> Result<(), DaoError> {
        let mut db_connection = self.db_thread_pool.get()?;

        db_connection.immediate_transaction::<_, DaoError, _>(|conn| {
            Friendships::remove_edge(conn, user1.id, user2.id)?;
            Friendships::remove_edge(conn, user2.id, user1.id)?;
            Ok(())
        })
    }

    pub fn get_relationship(&self, user: &User, other: &User) -> Result<Relationship, DaoError> {
        let mut db_connection = self.db_thread_pool.get()?;

        db_connection.transaction::<_, DaoError, _>(|conn| {
            if Friendships::has_edge(conn, user.id, other.id)? {
                return Ok(Relationship::Friends);
            }

            if FriendRequests::has_edge(conn, user.id, other.id)? {
                return Ok(Relationship::RequestSent);
            }

            if FriendRequests::has_edge(conn, other.id, user.id)? {
                return Ok(Relationship::RequestReceived);
            }

            Ok(Relationship::NotConnected)
        })
    }

    pub fn get_friends(&self, user: &User) -> Result<Vec<PublicUser>, DaoError> {
        let mut db_connection = self.db_thread_pool.get()?;
        let friend_ids = Friendships::targets(&mut db_connection, user.id)?;
        Ok(load_public_users(&mut db_connection, &friend_ids)?)
    }

    /// Friends, outgoing requests and incoming requests for `user`, each
    /// oldest first, read from a single snapshot.
    pub fn get_friend_lists(&self, user: &User) -> Result<FriendLists, DaoError> {
        let mut db_connection = self.db_thread_pool.get()?;

        db_connection.transaction::<_, DaoError, _>(|conn| {
            let friend_ids = Friendships::targets(conn, user.id)?;
            let sent_ids = FriendRequests::targets(conn, user.id)?;
            let received_ids = FriendRequests::sources(conn, user.id)?;

            Ok(FriendLists {
                friends: load_public_users(conn, &friend_ids)?,
                requests_sent: load_public_users(conn, &sent_ids)?,
                requests_received: load_public_users(conn, &received_ids)?,
            })
        })
    }
}

fn cancel_pending_request(
    conn: &mut SqliteConnection,
    user1_id: i32,
    user2_id: i32,
) -> diesel::QueryResult<bool> {
    if FriendRequests::remove_edge(conn, user1_id, user2_id)? {
        return Ok(true);
    }

    FriendRequests::remove_edge(conn, user2_id, user1_id)
}
