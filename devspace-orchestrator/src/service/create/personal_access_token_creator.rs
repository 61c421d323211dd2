use chrono::{Duration, Utc};
use devspace_core::domain::token::{
    MAX_TOKEN_LIFETIME_DAYS, PersonalAccessToken, WORKSPACE_TOKEN_SCOPES,
};
use rand::Rng;
use rand::distr::Alphanumeric;
use sha2::{Digest, Sha256};

use super::context::Prepared;
use super::creator::record_failure;
use super::error::CreateError;
use crate::repository::records::NewPersonalAccessToken;
use crate::repository::store::CreationScope;

const TOKEN_PREFIX: &str = "glpat-";
const TOKEN_RANDOM_LENGTH: usize = 20;

/// Persisted token plus the secret it was derived from
pub struct IssuedToken {
    pub record: PersonalAccessToken,
    pub secret: String,
}

pub fn generate_secret() -> String {
    let random: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_RANDOM_LENGTH)
        .map(char::from)
        .collect();
    format!("{}{}", TOKEN_PREFIX, random)
}

pub fn digest(secret: &str) -> String {
    hex::encode(Sha256::digest(secret.as_bytes()))
}

pub async fn create(
    scope: &mut dyn CreationScope,
    prepared: &Prepared,
) -> Result<IssuedToken, CreateError> {
    let secret = generate_secret();
    let token = NewPersonalAccessToken {
        user_id: prepared.params.user.id,
        name: prepared.workspace_name.clone(),
        scopes: WORKSPACE_TOKEN_SCOPES.iter().map(|s| s.to_string()).collect(),
        token_digest: digest(&secret),
        expires_at: Utc::now() + Duration::days(MAX_TOKEN_LIFETIME_DAYS),
    };

    let record = scope
        .create_personal_access_token(token)
        .await
        .map_err(|e| record_failure(e, |errors| CreateError::CredentialCreateFailed { errors }))?;

    Ok(IssuedToken { record, secret })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_shape() {
        let secret = generate_secret();
        assert!(secret.starts_with("glpat-"));
        assert_eq!(secret.len(), 26);
        assert!(secret[6..].chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(secret, generate_secret());
    }

    #[test]
    fn test_digest_is_sha256_hex() {
        assert_eq!(
            digest("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
