use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::user::PublicUser;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorType {
    IncorrectlyFormed,
    InvalidState,
    ConflictWithExisting,
    IncorrectCredential,
    BadToken,
    TokenExpired,
    TokenMissing,
    TokenRevoked,
    UserDisallowed,
    UserDoesNotExist,
    RecipeDoesNotExist,
    FriendRequestDoesNotExist,
    InputTooLarge,
    InternalError,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerErrorResponse {
    pub err_type: ErrorType,
    pub err_message: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OutputToken {
    pub token: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OutputMessage {
    pub msg: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputUser {
    pub id: i32,
    pub name: String,
    pub email: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputFriendLists {
    pub friends: Vec<PublicUser>,
    pub requests_sent: Vec<PublicUser>,
    pub requests_received: Vec<PublicUser>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct OutputRecipeId {
    pub id: i32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRecipeSummary {
    pub id: i32,
    pub name: String,
    pub user: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputComment {
    pub user: String,
    pub text: String,
    pub created_timestamp: NaiveDateTime,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OutputRecipe {
    pub id: i32,
    pub name: String,
    pub ingredients: serde_json::Value,
    pub instructions: serde_json::Value,
    pub user: String,
    pub comments: Vec<OutputComment>,
    pub likes: usize,
    pub image: String,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct OutputIsLiked {
    pub liked: bool,
}
