use serde::{Deserialize, Serialize};
use zeroize::ZeroizeOnDrop;

#[derive(Clone, Debug, Deserialize, Serialize, ZeroizeOnDrop)]
pub struct InputUser {
    pub user_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, ZeroizeOnDrop)]
pub struct CredentialPair {
    pub email: String,
    pub password: String,
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct InputUserId {
    pub id: i32,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct InputSearch {
    #[serde(default)]
    pub search_term: String,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct InputNameMatch {
    #[serde(default, rename = "match")]
    pub name_match: String,
}

/// `ingredients` and `instructions` are free-form JSON chosen by the client.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct InputRecipe {
    pub name: String,
    pub ingredients: serde_json::Value,
    pub instructions: serde_json::Value,
    #[serde(default)]
    pub image: String,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct InputEditRecipe {
    pub id: i32,
    pub name: Option<String>,
    pub ingredients: Option<serde_json::Value>,
    pub instructions: Option<serde_json::Value>,
    pub image: Option<String>,
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct InputRecipeId {
    pub id: i32,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct InputComment {
    pub id: i32,
    pub text: String,
}
