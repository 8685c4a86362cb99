use chrono::NaiveDateTime;
use diesel::{AsChangeset, Identifiable, Insertable, Queryable, Selectable};

use crate::schema::recipes;

#[derive(Clone, Debug, PartialEq, Eq, Identifiable, Queryable, Selectable)]
#[diesel(table_name = recipes)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Recipe {
    pub id: i32,
    pub user_id: i32,
    pub name: String,
    pub ingredients: String,
    pub instructions: String,
    pub image: String,
    pub created_timestamp: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = recipes)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct NewRecipe<'a> {
    pub user_id: i32,
    pub name: &'a str,
    pub ingredients: &'a str,
    pub instructions: &'a str,
    pub image: &'a str,
    pub created_timestamp: NaiveDateTime,
}

/// A partial update to a recipe. `None` and empty strings both leave the
/// stored value as it is.
#[derive(Clone, Debug, Default)]
pub struct RecipeChanges {
    pub name: Option<String>,
    pub ingredients: Option<String>,
    pub instructions: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = recipes)]
pub struct RecipeChangeset<'a> {
    pub name: Option<&'a str>,
    pub ingredients: Option<&'a str>,
    pub instructions: Option<&'a str>,
    pub image: Option<&'a str>,
}

impl<'a> RecipeChangeset<'a> {
    pub fn from_changes(changes: &'a RecipeChanges) -> Self {
        fn non_empty(field: &Option<String>) -> Option<&str> {
            field.as_deref().filter(|s| !s.is_empty())
        }

        RecipeChangeset {
            name: non_empty(&changes.name),
            ingredients: non_empty(&changes.ingredients),
            instructions: non_empty(&changes.instructions),
            image: non_empty(&changes.image),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.ingredients.is_none()
            && self.instructions.is_none()
            && self.image.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_changeset_skips_empty_fields() {
        let changes = RecipeChanges {
            name: Some(String::from("Pancakes")),
            ingredients: Some(String::new()),
            instructions: None,
            image: Some(String::from("pancakes.png")),
        };

        let changeset = RecipeChangeset::from_changes(&changes);

        assert_eq!(changeset.name, Some("Pancakes"));
        assert_eq!(changeset.ingredients, None);
        assert_eq!(changeset.instructions, None);
        assert_eq!(changeset.image, Some("pancakes.png"));
        assert!(!changeset.is_empty());

        let changes = RecipeChanges {
            name: Some(String::new()),
            ..Default::default()
        };

        assert!(RecipeChangeset::from_changes(&changes).is_empty());
    }
}
