//! Personal Access Token Repository

use devspace_core::domain::token::PersonalAccessToken;
use sqlx::PgConnection;
use uuid::Uuid;

use super::records::NewPersonalAccessToken;

pub async fn create(
    conn: &mut PgConnection,
    new: NewPersonalAccessToken,
) -> Result<PersonalAccessToken, sqlx::Error> {
    let token = PersonalAccessToken {
        id: Uuid::new_v4(),
        user_id: new.user_id,
        name: new.name,
        scopes: new.scopes,
        token_digest: new.token_digest,
        expires_at: new.expires_at,
        created_at: chrono::Utc::now(),
    };

    sqlx::query(
        r#"
        INSERT INTO personal_access_tokens (id, user_id, name, scopes, token_digest, expires_at, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(token.id)
    .bind(token.user_id)
    .bind(&token.name)
    .bind(&token.scopes)
    .bind(&token.token_digest)
    .bind(token.expires_at)
    .bind(token.created_at)
    .execute(conn)
    .await?;

    Ok(token)
}
