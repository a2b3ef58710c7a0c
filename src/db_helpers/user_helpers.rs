use sqlx::{Sqlite, SqlitePool};

use crate::{
    errors::{constraint_violation, RequestError},
    models::{NewUser, User},
};

use super::fold_case;

const USER_COLUMNS: &str = "id, full_name, email, phone, password, created_at";

pub async fn insert_user(pool: &SqlitePool, user: &NewUser) -> Result<User, RequestError> {
    let query = format!(
        "INSERT INTO users (full_name, full_name_folded, email, phone, password) VALUES (?, ?, ?, ?, ?) RETURNING {USER_COLUMNS}"
    );
    sqlx::query_as::<Sqlite, User>(&query)
        .bind(&user.full_name)
        .bind(fold_case(&user.full_name))
        .bind(&user.email)
        .bind(&user.phone)
        .bind(&user.password_hash)
        .fetch_one(pool)
        .await
        .map_err(|e| constraint_violation(e, "Email is already registered"))
}

pub async fn get_user_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>, RequestError> {
    let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?");
    let user = sqlx::query_as::<Sqlite, User>(&query)
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn get_user_by_id(pool: &SqlitePool, id: i64) -> Result<Option<User>, RequestError> {
    let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
    let user = sqlx::query_as::<Sqlite, User>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}
