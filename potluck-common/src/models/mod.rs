pub mod comment;
pub mod friend_request;
pub mod friendship;
pub mod liked_recipe;
pub mod recipe;
pub mod revoked_token;
pub mod user;
