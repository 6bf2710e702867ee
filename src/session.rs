use tracing::{debug, info, warn};
use crate::models::user::User;
use crate::repositories::session_store::SessionStore;

/// Store slot the serialized identity lives under.
pub const IDENTITY_KEY: &str = "user";

/// Who is logged in. Owned by the composer; views only ever borrow the user.
pub struct Session<S> {
    store: S,
    identity: Option<User>,
}

impl<S: SessionStore> Session<S> {
    /// Reads a previously persisted identity. Anything unreadable means
    /// logged out.
    pub fn restore(store: S) -> Self {
        let identity = match store.get(IDENTITY_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<User>(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    debug!("Ignoring unreadable stored identity: {}", e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                debug!("Ignoring stored identity that could not be read: {}", e);
                None
            }
        };

        Self { store, identity }
    }

    pub fn identity(&self) -> Option<&User> {
        self.identity.as_ref()
    }

    pub fn set_identity(&mut self, user: User) {
        match serde_json::to_string(&user) {
            Ok(raw) => {
                if let Err(e) = self.store.set(IDENTITY_KEY, &raw) {
                    warn!("Failed to persist identity for user {}: {:#}", user.id, e);
                }
            }
            Err(e) => warn!("Failed to serialize identity for user {}: {}", user.id, e),
        }
        info!("Logged in as {} ({})", user.name, user.role);
        self.identity = Some(user);
    }

    pub fn clear_identity(&mut self) {
        if let Err(e) = self.store.remove(IDENTITY_KEY) {
            warn!("Failed to remove persisted identity: {:#}", e);
        }
        if let Some(user) = self.identity.take() {
            info!("Logged out {}", user.name);
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::Role;
    use crate::repositories::session_store::MemorySessionStore;

    fn customer() -> User {
        User {
            id: 1,
            name: "A".to_string(),
            email: "a@b.com".to_string(),
            role: Role::Customer,
        }
    }

    #[test]
    fn restores_persisted_identity() {
        let store = MemorySessionStore::with_entry(
            IDENTITY_KEY,
            r#"{"id":1,"name":"A","email":"a@b.com","role":"CUSTOMER"}"#,
        );
        let session = Session::restore(store);
        assert_eq!(session.identity(), Some(&customer()));
    }

    #[test]
    fn corrupt_identity_means_logged_out() {
        let store = MemorySessionStore::with_entry(IDENTITY_KEY, "{not json");
        let session = Session::restore(store);
        assert!(session.identity().is_none());
    }

    #[test]
    fn set_then_clear_touches_memory_and_store() {
        let mut session = Session::restore(MemorySessionStore::new());
        session.set_identity(customer());
        assert!(session.store().contains(IDENTITY_KEY));
        assert_eq!(session.identity().map(|u| u.id), Some(1));

        session.clear_identity();
        assert!(session.identity().is_none());
        assert!(!session.store().contains(IDENTITY_KEY));

        let reloaded = Session::restore(session.store().clone());
        assert!(reloaded.identity().is_none());
    }
}
