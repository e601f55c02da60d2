//! Mock authentication and the per-user favorites list

use crate::error::SessionError;
use crate::model::{RecipeId, User};
use crate::storage::KeyValueStore;
use log::{error, info, warn};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};

/// Storage key holding the logged-in user as JSON
pub const USER_KEY: &str = "recipeBookUser";

/// Favorites keyed by user
pub trait FavoritesStore: Send + Sync {
    fn contains(&self, user_id: &str, recipe_id: RecipeId) -> bool;

    /// Flip membership of `recipe_id`, returning whether it is now a favorite
    fn toggle(&self, user_id: &str, recipe_id: RecipeId) -> Result<bool, SessionError>;
}

/// The current session, persisted in a [`KeyValueStore`]
///
/// Any non-empty email and password log in. The favorites list belongs to
/// the logged-in user and is saved on every change.
pub struct SessionService {
    store: Arc<dyn KeyValueStore>,
    user: Mutex<Option<User>>,
}

impl SessionService {
    /// Restore the session saved in `store`
    ///
    /// Unreadable session data is dropped from the store and the service
    /// starts logged out.
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let user = match store.get(USER_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<User>(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    error!("Failed to parse stored user data: {}", e);
                    if let Err(e) = store.remove(USER_KEY) {
                        warn!("Failed to clear stored user data: {}", e);
                    }
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                error!("Failed to read stored session: {}", e);
                None
            }
        };

        Self {
            store,
            user: Mutex::new(user),
        }
    }

    /// Log in, returning the new user, or `None` when a credential is empty
    pub fn login(&self, email: &str, password: &str) -> Result<Option<User>, SessionError> {
        if email.is_empty() || password.is_empty() {
            return Ok(None);
        }

        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        let user = User {
            id: format!("user_{}", millis),
            name: email.split('@').next().unwrap_or(email).to_string(),
            email: email.to_string(),
            favorites: Vec::new(),
        };

        let mut current = self.user();
        self.persist(&user)?;
        *current = Some(user.clone());
        info!("Logged in as {}", user.email);
        Ok(Some(user))
    }

    /// Log out; the session stays active if the saved copy cannot be removed
    pub fn logout(&self) -> Result<(), SessionError> {
        let mut current = self.user();
        self.store.remove(USER_KEY)?;
        *current = None;
        Ok(())
    }

    pub fn current_user(&self) -> Option<User> {
        self.user().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user().is_some()
    }

    pub fn favorites(&self) -> Vec<RecipeId> {
        self.user()
            .as_ref()
            .map(|user| user.favorites.clone())
            .unwrap_or_default()
    }

    pub fn is_favorite(&self, recipe_id: RecipeId) -> bool {
        self.user()
            .as_ref()
            .map(|user| user.favorites.contains(&recipe_id))
            .unwrap_or(false)
    }

    /// Add or remove a favorite for the logged-in user
    ///
    /// The in-memory session only changes once the new state is saved.
    pub fn toggle_favorite(&self, recipe_id: RecipeId) -> Result<bool, SessionError> {
        let mut current = self.user();
        let user = current.as_ref().ok_or(SessionError::NotAuthenticated)?;

        let mut updated = user.clone();
        let now_favorite = match updated.favorites.iter().position(|id| *id == recipe_id) {
            Some(index) => {
                updated.favorites.remove(index);
                false
            }
            None => {
                updated.favorites.push(recipe_id);
                true
            }
        };

        self.persist(&updated)?;
        *current = Some(updated);
        Ok(now_favorite)
    }

    fn persist(&self, user: &User) -> Result<(), SessionError> {
        let raw = serde_json::to_string(user).map_err(crate::error::StorageError::from)?;
        self.store.set(USER_KEY, &raw)?;
        Ok(())
    }

    fn user(&self) -> MutexGuard<'_, Option<User>> {
        self.user.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl FavoritesStore for SessionService {
    fn contains(&self, user_id: &str, recipe_id: RecipeId) -> bool {
        self.user()
            .as_ref()
            .filter(|user| user.id == user_id)
            .map(|user| user.favorites.contains(&recipe_id))
            .unwrap_or(false)
    }

    fn toggle(&self, user_id: &str, recipe_id: RecipeId) -> Result<bool, SessionError> {
        let owner = self.user().as_ref().map(|user| user.id == user_id);
        match owner {
            Some(true) => self.toggle_favorite(recipe_id),
            _ => Err(SessionError::NotAuthenticated),
        }
    }
}
