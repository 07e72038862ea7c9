// ABOUTME: Bearer-token validation and role gating for specialist and client users
// ABOUTME: Validates externally-issued HS256 JWTs; token issuance stays with the identity provider
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutrio Coaching

//! # Authentication Gate
//!
//! The Nutrio server does not run its own login flow. Users authenticate with
//! the external identity provider, which issues HS256 JWTs signed with a
//! secret shared with this server (`NUTRIO_AUTH_SECRET`). This module
//! validates those tokens and extracts the user id and [`Role`] that every
//! data route scopes its queries by.
//!
//! [`AuthManager::generate_token`] exists for tests and local seeding only.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::models::Role;

/// JWT claims carried by identity-provider tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: user id (UUID string)
    pub sub: String,
    /// User role (`specialist` or `client`)
    pub role: String,
    /// Issued-at timestamp (Unix seconds)
    pub iat: i64,
    /// Expiry timestamp (Unix seconds)
    pub exp: i64,
}

/// Result of a successful authentication
#[derive(Debug, Clone, Copy)]
pub struct AuthResult {
    /// Authenticated user id
    pub user_id: Uuid,
    /// Authenticated role
    pub role: Role,
}

impl AuthResult {
    /// Require the specialist role
    ///
    /// # Errors
    ///
    /// Returns `PermissionDenied` when the caller is not a specialist.
    pub fn require_specialist(&self) -> AppResult<()> {
        if self.role == Role::Specialist {
            Ok(())
        } else {
            Err(AppError::permission_denied(
                "This operation requires the specialist role",
            ))
        }
    }

    /// Require the client role
    ///
    /// # Errors
    ///
    /// Returns `PermissionDenied` when the caller is not a client.
    pub fn require_client(&self) -> AppResult<()> {
        if self.role == Role::Client {
            Ok(())
        } else {
            Err(AppError::permission_denied(
                "This operation requires the client role",
            ))
        }
    }
}

/// Validates bearer tokens against the shared identity-provider secret
pub struct AuthManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_expiry_hours: i64,
}

impl AuthManager {
    /// Create a manager from the shared HS256 secret
    #[must_use]
    pub fn new(secret: &str, token_expiry_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            token_expiry_hours,
        }
    }

    /// Generate a token for a user
    ///
    /// Production tokens come from the identity provider; this helper exists
    /// for tests and local seeding, where both sides share the secret.
    ///
    /// # Errors
    ///
    /// Returns an error if JWT encoding fails.
    pub fn generate_token(&self, user_id: Uuid, role: Role) -> AppResult<String> {
        let now = Utc::now();
        let expiry = now + Duration::hours(self.token_expiry_hours);

        let claims = Claims {
            sub: user_id.to_string(),
            role: role.as_str().to_owned(),
            iat: now.timestamp(),
            exp: expiry.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode token: {e}")))
    }

    /// Validate a raw token string and extract the authenticated identity
    ///
    /// # Errors
    ///
    /// Returns `AuthExpired` for expired tokens and `AuthInvalid` for any
    /// other validation failure (bad signature, malformed claims, unknown
    /// role).
    pub fn validate_token(&self, token: &str) -> AppResult<AuthResult> {
        let validation = Validation::new(Algorithm::HS256);

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::auth_expired(),
                    _ => AppError::auth_invalid(format!("Token validation failed: {e}")),
                }
            })?;

        let user_id = Uuid::parse_str(&token_data.claims.sub)
            .map_err(|_| AppError::auth_invalid("Token subject is not a valid user id"))?;

        let role = Role::from_str_opt(&token_data.claims.role)
            .ok_or_else(|| AppError::auth_invalid("Token carries an unknown role"))?;

        Ok(AuthResult { user_id, role })
    }

    /// Authenticate a request from its `Authorization` header value
    ///
    /// # Errors
    ///
    /// Returns `AuthRequired` when the header is absent and `AuthInvalid`
    /// when it is not a bearer token or fails validation.
    pub fn authenticate_header(&self, auth_header: Option<&str>) -> AppResult<AuthResult> {
        let header = auth_header.ok_or_else(AppError::auth_required)?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::auth_invalid("Authorization header must be a bearer token"))?;

        self.validate_token(token.trim())
    }
}
