use potluck_common::db::{self, DaoError, DbThreadPool};
use potluck_common::models::recipe::{Recipe, RecipeChanges};
use potluck_common::request_io::{
    InputComment, InputEditRecipe, InputNameMatch, InputRecipe, InputRecipeId, InputSearch,
    OutputComment, OutputIsLiked, OutputRecipe, OutputRecipeId, OutputRecipeSummary,
};

use actix_web::{web, HttpResponse};
use std::collections::HashMap;

use crate::handlers::error::HttpErrorResponse;
use crate::handlers::lookup;
use crate::middleware::auth::VerifiedToken;

/// Ingredients and instructions are stored as serialized JSON.
fn parse_blob(raw: &str) -> serde_json::Value {
    serde_json::from_str(raw).unwrap_or_else(|_| serde_json::Value::String(String::from(raw)))
}

/// An edited blob counts as a change only if it isn't null or an empty
/// string.
fn blob_change(value: Option<serde_json::Value>) -> Option<String> {
    match value? {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) if s.is_empty() => None,
        v => Some(v.to_string()),
    }
}

fn summarize(
    user_dao: &db::user::Dao,
    recipes: Vec<Recipe>,
) -> Result<Vec<OutputRecipeSummary>, DaoError> {
    let mut author_ids: Vec<i32> = recipes.iter().map(|r| r.user_id).collect();
    author_ids.sort_unstable();
    author_ids.dedup();

    let author_names: HashMap<i32, String> = user_dao
        .get_public_users(&author_ids)?
        .into_iter()
        .map(|u| (u.id, u.name))
        .collect();

    Ok(recipes
        .into_iter()
        .map(|r| OutputRecipeSummary {
            id: r.id,
            user: author_names.get(&r.user_id).cloned().unwrap_or_default(),
            name: r.name,
        })
        .collect())
}

fn check_name(name: &str) -> Result<(), HttpErrorResponse> {
    if name.trim().is_empty() {
        return Err(HttpErrorResponse::IncorrectlyFormed(String::from(
            "Recipe name cannot be blank",
        )));
    }

    Ok(())
}

pub async fn create(
    db_thread_pool: web::Data<DbThreadPool>,
    token: VerifiedToken,
    recipe_data: web::Json<InputRecipe>,
) -> Result<HttpResponse, HttpErrorResponse> {
    check_name(&recipe_data.name)?;

    let author = lookup::user_by_id(&db_thread_pool, token.claims.user_id).await?;
    let recipe_data = recipe_data.into_inner();
    let recipe_dao = db::recipe::Dao::new(&db_thread_pool);

    let recipe = match web::block(move || {
        recipe_dao.create_recipe(
            &author,
            &recipe_data.name,
            &recipe_data.ingredients.to_string(),
            &recipe_data.instructions.to_string(),
            &recipe_data.image,
        )
    })
    .await?
    {
        Ok(r) => r,
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError(String::from(
                "Failed to create recipe",
            )));
        }
    };

    Ok(HttpResponse::Created().json(OutputRecipeId { id: recipe.id }))
}

pub async fn get(
    db_thread_pool: web::Data<DbThreadPool>,
    _token: VerifiedToken,
    recipe_id: web::Query<InputRecipeId>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let recipe = lookup::recipe_by_id(&db_thread_pool, recipe_id.id).await?;
    let recipe_dao = db::recipe::Dao::new(&db_thread_pool);

    let (recipe, details) = match web::block(move || {
        let details = recipe_dao.get_recipe_details(&recipe)?;
        Ok::<_, DaoError>((recipe, details))
    })
    .await?
    {
        Ok(r) => r,
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError(String::from(
                "Failed to get recipe",
            )));
        }
    };

    let comments = details
        .comments
        .into_iter()
        .map(|c| OutputComment {
            user: c.author_name,
            text: c.comment.body,
            created_timestamp: c.comment.created_timestamp,
        })
        .collect();

    Ok(HttpResponse::Ok().json(OutputRecipe {
        id: recipe.id,
        name: recipe.name,
        ingredients: parse_blob(&recipe.ingredients),
        instructions: parse_blob(&recipe.instructions),
        user: details.author_name,
        comments,
        likes: details.like_count,
        image: recipe.image,
    }))
}

/// Only fields that are present and non-empty are changed.
pub async fn edit(
    db_thread_pool: web::Data<DbThreadPool>,
    token: VerifiedToken,
    recipe_data: web::Json<InputEditRecipe>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let recipe = lookup::recipe_by_id(&db_thread_pool, recipe_data.id).await?;

    if recipe.user_id != token.claims.user_id {
        return Err(HttpErrorResponse::UserDisallowed(String::from(
            "Only the author of a recipe can edit it",
        )));
    }

    let recipe_data = recipe_data.into_inner();
    let changes = RecipeChanges {
        name: recipe_data.name,
        ingredients: blob_change(recipe_data.ingredients),
        instructions: blob_change(recipe_data.instructions),
        image: recipe_data.image,
    };

    let recipe_dao = db::recipe::Dao::new(&db_thread_pool);

    match web::block(move || recipe_dao.change_recipe(&recipe, &changes)).await? {
        Ok(_) => (),
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError(String::from(
                "Failed to edit recipe",
            )));
        }
    };

    Ok(HttpResponse::Ok().finish())
}

pub async fn delete(
    db_thread_pool: web::Data<DbThreadPool>,
    token: VerifiedToken,
    recipe_id: web::Query<InputRecipeId>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let recipe = lookup::recipe_by_id(&db_thread_pool, recipe_id.id).await?;

    if recipe.user_id != token.claims.user_id {
        return Err(HttpErrorResponse::UserDisallowed(String::from(
            "Only the author of a recipe can delete it",
        )));
    }

    let recipe_dao = db::recipe::Dao::new(&db_thread_pool);

    match web::block(move || recipe_dao.delete_recipe(&recipe)).await? {
        Ok(_) => (),
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError(String::from(
                "Failed to delete recipe",
            )));
        }
    };

    log::info!("User {} deleted recipe {}", token.claims.user_id, recipe_id.id);

    Ok(HttpResponse::Ok().finish())
}

pub async fn search(
    db_thread_pool: web::Data<DbThreadPool>,
    _token: VerifiedToken,
    query: web::Query<InputSearch>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let search_term = query.into_inner().search_term;
    let recipe_dao = db::recipe::Dao::new(&db_thread_pool);
    let user_dao = db::user::Dao::new(&db_thread_pool);

    let result = match web::block(move || {
        let recipes = recipe_dao.search_recipes(&search_term)?;
        summarize(&user_dao, recipes)
    })
    .await?
    {
        Ok(r) => r,
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError(String::from(
                "Failed to search recipes",
            )));
        }
    };

    Ok(HttpResponse::Ok().json(result))
}

/// Recipes by the caller and the caller's friends, newest first.
pub async fn latest(
    db_thread_pool: web::Data<DbThreadPool>,
    token: VerifiedToken,
    query: web::Query<InputNameMatch>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let user = lookup::user_by_id(&db_thread_pool, token.claims.user_id).await?;
    let name_match = query.into_inner().name_match;

    let friend_dao = db::friend::Dao::new(&db_thread_pool);
    let recipe_dao = db::recipe::Dao::new(&db_thread_pool);
    let user_dao = db::user::Dao::new(&db_thread_pool);

    let result = match web::block(move || {
        let friend_ids: Vec<i32> = friend_dao
            .get_friends(&user)?
            .into_iter()
            .map(|f| f.id)
            .collect();

        let mut authors = user_dao.get_users(&friend_ids)?;
        authors.push(user);

        let recipes = recipe_dao.latest_recipes(&authors, &name_match)?;
        summarize(&user_dao, recipes)
    })
    .await?
    {
        Ok(r) => r,
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError(String::from(
                "Failed to get latest recipes",
            )));
        }
    };

    Ok(HttpResponse::Ok().json(result))
}

pub async fn liked(
    db_thread_pool: web::Data<DbThreadPool>,
    token: VerifiedToken,
) -> Result<HttpResponse, HttpErrorResponse> {
    let user = lookup::user_by_id(&db_thread_pool, token.claims.user_id).await?;
    let recipe_dao = db::recipe::Dao::new(&db_thread_pool);
    let user_dao = db::user::Dao::new(&db_thread_pool);

    let result = match web::block(move || {
        let recipes = recipe_dao.get_liked_recipes(&user)?;
        summarize(&user_dao, recipes)
    })
    .await?
    {
        Ok(r) => r,
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError(String::from(
                "Failed to get liked recipes",
            )));
        }
    };

    Ok(HttpResponse::Ok().json(result))
}

pub async fn comment(
    db_thread_pool: web::Data<DbThreadPool>,
    token: VerifiedToken,
    comment_data: web::Json<InputComment>,
) -> Result<HttpResponse, HttpErrorResponse> {
    if comment_data.text.trim().is_empty() {
        return Err(HttpErrorResponse::IncorrectlyFormed(String::from(
            "Comment cannot be blank",
        )));
    }

    let recipe = lookup::recipe_by_id(&db_thread_pool, comment_data.id).await?;
    let author = lookup::user_by_id(&db_thread_pool, token.claims.user_id).await?;
    let text = comment_data.into_inner().text;
    let recipe_dao = db::recipe::Dao::new(&db_thread_pool);

    match web::block(move || recipe_dao.create_comment(&author, &recipe, &text)).await? {
        Ok(_) => (),
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError(String::from(
                "Failed to create comment",
            )));
        }
    };

    Ok(HttpResponse::Created().finish())
}

pub async fn like(
    db_thread_pool: web::Data<DbThreadPool>,
    token: VerifiedToken,
    recipe_id: web::Json<InputRecipeId>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let recipe = lookup::recipe_by_id(&db_thread_pool, recipe_id.id).await?;
    let user = lookup::user_by_id(&db_thread_pool, token.claims.user_id).await?;
    let recipe_dao = db::recipe::Dao::new(&db_thread_pool);

    match web::block(move || recipe_dao.like_recipe(&user, &recipe)).await? {
        Ok(_) => (),
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError(String::from(
                "Failed to like recipe",
            )));
        }
    };

    Ok(HttpResponse::Ok().finish())
}

pub async fn unlike(
    db_thread_pool: web::Data<DbThreadPool>,
    token: VerifiedToken,
    recipe_id: web::Query<InputRecipeId>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let recipe = lookup::recipe_by_id(&db_thread_pool, recipe_id.id).await?;
    let user = lookup::user_by_id(&db_thread_pool, token.claims.user_id).await?;
    let recipe_dao = db::recipe::Dao::new(&db_thread_pool);

    match web::block(move || recipe_dao.stop_like_recipe(&user, &recipe)).await? {
        Ok(_) => (),
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError(String::from(
                "Failed to unlike recipe",
            )));
        }
    };

    Ok(HttpResponse::Ok().finish())
}

pub async fn is_liked(
    db_thread_pool: web::Data<DbThreadPool>,
    token: VerifiedToken,
    recipe_id: web::Query<InputRecipeId>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let recipe = lookup::recipe_by_id(&db_thread_pool, recipe_id.id).await?;
    let user = lookup::user_by_id(&db_thread_pool, token.claims.user_id).await?;
    let recipe_dao = db::recipe::Dao::new(&db_thread_pool);

    let liked = match web::block(move || recipe_dao.is_liked(&user, &recipe)).await? {
        Ok(l) => l,
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError(String::from(
                "Failed to check like",
            )));
        }
    };

    Ok(HttpResponse::Ok().json(OutputIsLiked { liked }))
}
