use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::cart::Cart;
use crate::config::Config;
use crate::onboarding::Wizard;
use crate::services::Backend;

pub type UserId = String;
pub type Carts = Arc<Mutex<HashMap<UserId, Cart>>>;
pub type Wizards = Arc<Mutex<HashMap<UserId, Wizard>>>;

#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn Backend>,
    pub config: Config,
    pub carts: Carts,
    pub wizards: Wizards,
}

impl AppState {
    pub fn new(backend: Arc<dyn Backend>, config: Config) -> Self {
        Self {
            backend,
            config,
            carts: Arc::new(Mutex::new(HashMap::new())),
            wizards: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Runs `f` on the user's cart, creating an empty one on first use.
    pub fn with_cart<R>(&self, user_id: &str, f: impl FnOnce(&mut Cart) -> R) -> R {
        let mut carts = self.carts.lock().unwrap_or_else(|e| e.into_inner());
        f(carts.entry(user_id.to_string()).or_default())
    }

    pub fn with_wizard<R>(&self, user_id: &str, f: impl FnOnce(&mut Wizard) -> R) -> R {
        let mut wizards = self.wizards.lock().unwrap_or_else(|e| e.into_inner());
        f(wizards.entry(user_id.to_string()).or_default())
    }

    /// Drops the per-user memory that the browser tab would lose on sign-out.
    pub fn forget_user(&self, user_id: &str) {
        self.carts.lock().unwrap_or_else(|e| e.into_inner()).remove(user_id);
        self.wizards.lock().unwrap_or_else(|e| e.into_inner()).remove(user_id);
    }
}
