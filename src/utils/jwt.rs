use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::{db::UserId, error::AppResult};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub exp: i64,
    pub user_id: UserId,
}

pub fn generate_jwt(user_id: UserId, ttl_days: i64, key: &EncodingKey) -> AppResult<String> {
    let exp = (chrono::Utc::now() + chrono::Duration::days(ttl_days)).timestamp();
    let claims = Claims { exp, user_id };
    let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, key)?;

    Ok(token)
}

pub fn verify_token(token: &str, key: &DecodingKey) -> AppResult<UserId> {
    let claim = verify_jwt(token, key)?;
    Ok(claim.user_id)
}

pub fn verify_jwt(token: &str, key: &DecodingKey) -> AppResult<Claims> {
    let claims =
        jsonwebtoken::decode::<Claims>(token, key, &Validation::new(Algorithm::HS256))?.claims;
    Ok(claims)
}
