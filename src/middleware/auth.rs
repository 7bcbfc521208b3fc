use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::models::user::Role;
use crate::services::user_service::Identity;
use crate::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub role: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
}

impl Claims {
    fn identity(&self) -> Option<Identity> {
        let id = Uuid::parse_str(&self.sub).ok()?;
        let role = match self.role.as_deref() {
            Some(raw) => raw.parse().ok()?,
            None => Role::User,
        };
        Some(Identity {
            id,
            role,
            email: self.email.clone(),
            name: self.name.clone(),
        })
    }
}

fn unauthorized(code: &str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "error": code }))).into_response()
}

fn bearer_identity(req: &Request) -> Result<Identity, Response> {
    let Some(auth_header) = req.headers().get(axum::http::header::AUTHORIZATION) else {
        return Err(unauthorized("missing_authorization"));
    };
    let Ok(auth_str) = auth_header.to_str() else {
        return Err(unauthorized("bad_authorization"));
    };
    let Some(token) = auth_str.strip_prefix("Bearer ") else {
        return Err(unauthorized("unsupported_scheme"));
    };

    let config = crate::config::get_config();
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )
    .map_err(|_| unauthorized("invalid_token"))?
    .claims;

    claims.identity().ok_or_else(|| unauthorized("invalid_claims"))
}

async fn admit(state: &AppState, mut req: Request, next: Next, identity: Identity) -> Response {
    if let Err(e) = state.user_service.ensure_user(&identity).await {
        return e.into_response();
    }
    req.extensions_mut().insert(identity);
    next.run(req).await
}

/// Any valid token. The verified [`Identity`] is put into request extensions.
pub async fn require_bearer_auth(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    match bearer_identity(&req) {
        Ok(identity) => admit(&state, req, next, identity).await,
        Err(response) => response,
    }
}

/// Quiz or organization administrators only.
pub async fn require_admin(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let identity = match bearer_identity(&req) {
        Ok(identity) => identity,
        Err(response) => return response,
    };
    if !identity.role.is_administrator() {
        return (StatusCode::FORBIDDEN, Json(json!({"error":"forbidden"}))).into_response();
    }
    admit(&state, req, next, identity).await
}

/// Signs a token the middleware above accepts. Used by tooling and tests.
pub fn encode_token(claims: &Claims, secret: &str) -> crate::error::Result<String> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| crate::error::Error::Internal(format!("failed to sign token: {e}")))
}
