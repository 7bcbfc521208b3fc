use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::Arc;
use uuid::Uuid;

use crate::database::QuizStore;
use crate::error::{Error, Result};
use crate::models::user::{NewUser, Role, User};

/// Identity as asserted by a verified access token.
#[derive(Debug, Clone)]
pub struct Identity {
    pub id: Uuid,
    pub role: Role,
    pub email: Option<String>,
    pub name: Option<String>,
}

const ADJECTIVES: &[&str] = &[
    "Brave", "Calm", "Clever", "Curious", "Eager", "Gentle", "Happy", "Keen", "Lucky", "Mighty",
    "Nimble", "Quick", "Quiet", "Sharp", "Sunny", "Swift", "Witty", "Wise",
];
const NOUNS: &[&str] = &[
    "Badger", "Beaver", "Falcon", "Fox", "Hare", "Heron", "Lynx", "Moose", "Otter", "Owl",
    "Puffin", "Raven", "Reindeer", "Seal", "Squirrel", "Walrus", "Wolf", "Wolverine",
];
const USERNAME_ATTEMPTS: usize = 8;

/// `AdjectiveNoun` plus a two-digit suffix, e.g. `SwiftOtter42`.
fn random_username() -> String {
    let mut rng = rand::thread_rng();
    let adjective = ADJECTIVES.choose(&mut rng).copied().unwrap_or("Curious");
    let noun = NOUNS.choose(&mut rng).copied().unwrap_or("Reader");
    format!("{adjective}{noun}{}", rng.gen_range(10..100))
}

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn QuizStore>,
}

impl UserService {
    pub fn new(store: Arc<dyn QuizStore>) -> Self {
        Self { store }
    }

    /// Returns the local user for `identity`, creating it on first sight.
    pub async fn ensure_user(&self, identity: &Identity) -> Result<User> {
        if let Some(user) = self.store.get_user(identity.id).await? {
            return Ok(user);
        }

        let Some(email) = identity.email.clone() else {
            return Err(Error::Unauthorized(
                "Token for unknown user carries no email".to_string(),
            ));
        };
        let new_user = NewUser {
            id: identity.id,
            email,
            username: identity.name.clone(),
            role: identity.role,
        };
        let created = match self.store.create_user(new_user.clone()).await {
            Ok(user) => user,
            Err(Error::Conflict(msg)) => match self.store.get_user(identity.id).await? {
                // Lost a race with a concurrent first request.
                Some(user) => return Ok(user),
                // The display name is someone else's username.
                None if new_user.username.is_some() => {
                    self.store
                        .create_user(NewUser {
                            username: None,
                            ..new_user
                        })
                        .await?
                }
                None => return Err(Error::Conflict(msg)),
            },
            Err(e) => return Err(e),
        };
        tracing::info!(user_id = %created.id, role = %identity.role, "user provisioned");
        Ok(created)
    }

    /// Gives the user a fresh random username, retrying on collisions.
    pub async fn assign_random_username(&self, user_id: Uuid) -> Result<User> {
        for _ in 0..USERNAME_ATTEMPTS {
            let candidate = random_username();
            match self.store.set_username(user_id, candidate.clone()).await {
                Ok(Some(user)) => {
                    tracing::info!(%user_id, username = %candidate, "username assigned");
                    return Ok(user);
                }
                Ok(None) => return Err(Error::NotFound("User not found".to_string())),
                Err(Error::Conflict(_)) => {
                    tracing::debug!(%user_id, username = %candidate, "username taken, retrying");
                }
                Err(e) => return Err(e),
            }
        }
        Err(Error::Conflict("Could not find a free username".to_string()))
    }
}
