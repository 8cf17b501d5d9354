//! Identity Store: user records and the email-verification lifecycle.
//!
//! Password hashing, token signing, and mail delivery live in outer
//! collaborators; this store only enforces email uniqueness and the
//! verification-token expiry window.

use crate::domain::error::Error;
use crate::domain::model::{NewUser, User, UserPatch};
use crate::domain::{decode, encode};
use crate::infra::config;
use crate::storage::document::DocumentStore;
use chrono::{Duration, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

pub(crate) const USERS: &str = "users";

#[derive(Clone)]
pub struct IdentityStore {
    store: Arc<dyn DocumentStore>,
}

impl IdentityStore {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Registers a user. Fails with `Conflict` when the email is taken.
    pub async fn create_user(&self, input: NewUser) -> Result<User, Error> {
        let email = input.email.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(Error::validation("a valid email is required"));
        }
        if input.first_name.trim().is_empty() {
            return Err(Error::validation("firstName must not be empty"));
        }
        if self.find_by_email(&email).await?.is_some() {
            return Err(Error::conflict("email already exists"));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4().to_string(),
            first_name: input.first_name,
            last_name: input.last_name,
            email,
            password: input.password,
            role: input.role.unwrap_or_default(),
            is_verified: false,
            verification_token: None,
            verification_token_expires: None,
            created_at: now,
            updated_at: now,
        };
        self.store.insert(USERS, &user.id, encode(&user)?).await?;
        Ok(user)
    }

    pub async fn get_user(&self, id: &str) -> Result<User, Error> {
        match self.store.get(USERS, id).await? {
            Some(doc) => decode(doc),
            None => Err(Error::not_found(format!("user {}", id))),
        }
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        let needle = email.trim().to_lowercase();
        for doc in self.store.scan(USERS).await? {
            let user: User = decode(doc)?;
            if user.email == needle {
                return Ok(Some(user));
            }
        }
        Ok(None)
    }

    pub async fn update_user(&self, id: &str, patch: UserPatch) -> Result<User, Error> {
        if let Some(email) = &patch.email {
            let normalized = email.trim().to_lowercase();
            if let Some(existing) = self.find_by_email(&normalized).await? {
                if existing.id != id {
                    return Err(Error::conflict("email already exists"));
                }
            }
        }
        let updated = self
            .store
            .mutate(
                USERS,
                id,
                Box::new(move |doc| {
                    let mut user: User = decode(doc)?;
                    if let Some(v) = patch.first_name {
                        user.first_name = v;
                    }
                    if let Some(v) = patch.last_name {
                        user.last_name = v;
                    }
                    if let Some(v) = patch.email {
                        user.email = v.trim().to_lowercase();
                    }
                    if let Some(v) = patch.role {
                        user.role = v;
                    }
                    user.updated_at = Utc::now();
                    encode(&user)
                }),
            )
            .await?;
        match updated {
            Some(doc) => decode(doc),
            None => Err(Error::not_found(format!("user {}", id))),
        }
    }

    pub async fn delete_user(&self, id: &str) -> Result<(), Error> {
        if self.store.delete(USERS, id).await? {
            Ok(())
        } else {
            Err(Error::not_found(format!("user {}", id)))
        }
    }

    /// Stamps a fresh verification token with its expiry window.
    pub async fn set_verification_token(&self, id: &str, token: &str) -> Result<(), Error> {
        let token = token.to_string();
        let expires = Utc::now() + Duration::hours(config::verification_token_ttl_hours());
        let updated = self
            .store
            .mutate(
                USERS,
                id,
                Box::new(move |doc| {
                    let mut user: User = decode(doc)?;
                    user.verification_token = Some(token);
                    user.verification_token_expires = Some(expires);
                    user.updated_at = Utc::now();
                    encode(&user)
                }),
            )
            .await?;
        if updated.is_none() {
            return Err(Error::not_found(format!("user {}", id)));
        }
        Ok(())
    }

    /// Only matches tokens that have not expired.
    pub async fn find_by_verification_token(&self, token: &str) -> Result<Option<User>, Error> {
        let now = Utc::now();
        for doc in self.store.scan(USERS).await? {
            let user: User = decode(doc)?;
            let matches = user.verification_token.as_deref() == Some(token)
                && user.verification_token_expires.map(|t| t > now).unwrap_or(false);
            if matches {
                return Ok(Some(user));
            }
        }
        Ok(None)
    }

    /// Marks the user verified and clears the token fields.
    pub async fn activate_user(&self, id: &str) -> Result<User, Error> {
        let updated = self
            .store
            .mutate(
                USERS,
                id,
                Box::new(|doc| {
                    let mut user: User = decode(doc)?;
                    user.is_verified = true;
                    user.verification_token = None;
                    user.verification_token_expires = None;
                    user.updated_at = Utc::now();
                    encode(&user)
                }),
            )
            .await?;
        match updated {
            Some(doc) => decode(doc),
            None => Err(Error::not_found(format!("user {}", id))),
        }
    }

    /// Ids of all users registered with the charity role; the join input
    /// for charity-profile discovery.
    pub async fn charity_user_ids(&self) -> Result<HashSet<String>, Error> {
        let mut ids = HashSet::new();
        for doc in self.store.scan(USERS).await? {
            let user: User = decode(doc)?;
            if user.role == crate::domain::model::UserRole::Charity {
                ids.insert(user.id);
            }
        }
        Ok(ids)
    }
}
