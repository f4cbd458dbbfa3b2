use lazy_static::lazy_static;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

// Cancellation flag for one in-flight operation of a scope (e.g. a search box)
pub struct CancellationToken {
    pub scope: String,
    pub id: String,
    pub is_cancelled: Arc<Mutex<bool>>,
}

impl CancellationToken {
    pub fn new(scope: &str, id: String) -> Self {
        Self {
            scope: scope.to_string(),
            id,
            is_cancelled: Arc::new(Mutex::new(false)),
        }
    }

    pub fn cancel(&self) {
        if let Ok(mut cancelled) = self.is_cancelled.lock() {
            *cancelled = true;
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.is_cancelled.lock().map(|guard| *guard).unwrap_or(true)
    }

    pub fn throw_if_cancelled(&self) -> Result<(), String> {
        if self.is_cancelled() {
            Err(format!("Operation {} was cancelled", self.id))
        } else {
            Ok(())
        }
    }
}

impl Clone for CancellationToken {
    fn clone(&self) -> Self {
        Self {
            scope: self.scope.clone(),
            id: self.id.clone(),
            is_cancelled: Arc::clone(&self.is_cancelled),
        }
    }
}

/// Tracks the latest operation per scope.
///
/// Starting a new operation in a scope cancels the one it replaces.
#[derive(Default)]
pub struct CancellationManager {
    tokens: HashMap<String, CancellationToken>,
    generation: u64,
}

impl CancellationManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_token(&mut self, scope: &str) -> CancellationToken {
        // Cancel any existing token for the same scope
        if let Some(existing) = self.tokens.get(scope) {
            existing.cancel();
        }

        self.generation += 1;
        let token = CancellationToken::new(scope, format!("{}#{}", scope, self.generation));
        self.tokens.insert(scope.to_string(), token.clone());
        token
    }

    pub fn cancel_scope(&mut self, scope: &str) -> bool {
        match self.tokens.remove(scope) {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    pub fn get_token(&self, scope: &str) -> Option<&CancellationToken> {
        self.tokens.get(scope)
    }

    // Forget a finished token unless a newer one already replaced it
    pub fn cleanup_token(&mut self, token: &CancellationToken) {
        let is_current = self
            .tokens
            .get(&token.scope)
            .map(|current| current.id == token.id)
            .unwrap_or(false);
        if is_current {
            self.tokens.remove(&token.scope);
        }
    }
}

lazy_static! {
    static ref GLOBAL_CANCELLATION_MANAGER: Mutex<CancellationManager> =
        Mutex::new(CancellationManager::new());
}

pub fn begin_operation(scope: &str) -> Result<CancellationToken, String> {
    let mut manager = GLOBAL_CANCELLATION_MANAGER
        .lock()
        .map_err(|e| e.to_string())?;
    Ok(manager.create_token(scope))
}

pub fn finish_operation(token: &CancellationToken) {
    if let Ok(mut manager) = GLOBAL_CANCELLATION_MANAGER.lock() {
        manager.cleanup_token(token);
    }
}

pub fn cancel_scope(scope: &str) -> bool {
    match GLOBAL_CANCELLATION_MANAGER.lock() {
        Ok(mut manager) => manager.cancel_scope(scope),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_token_cancels_older_one() {
        let mut manager = CancellationManager::new();
        let first = manager.create_token("search");
        let second = manager.create_token("search");

        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
        assert_eq!(
            first.throw_if_cancelled().unwrap_err(),
            format!("Operation {} was cancelled", first.id)
        );
        assert!(second.throw_if_cancelled().is_ok());
    }

    #[test]
    fn scopes_are_independent() {
        let mut manager = CancellationManager::new();
        let a = manager.create_token("left");
        let b = manager.create_token("right");
        assert!(!a.is_cancelled());
        assert!(!b.is_cancelled());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn stale_cleanup_keeps_newer_token() {
        let mut manager = CancellationManager::new();
        let first = manager.create_token("search");
        let second = manager.create_token("search");

        manager.cleanup_token(&first);
        assert_eq!(manager.get_token("search").map(|t| t.id.clone()), Some(second.id.clone()));

        manager.cleanup_token(&second);
        assert!(manager.get_token("search").is_none());
    }

    #[test]
    fn cancel_scope_flags_the_running_token() {
        let mut manager = CancellationManager::new();
        let token = manager.create_token("search");
        assert!(manager.cancel_scope("search"));
        assert!(token.is_cancelled());
        assert!(!manager.cancel_scope("search"));
    }
}
