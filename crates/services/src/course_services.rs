use std::sync::Arc;

use storage::repository::Storage;
use storage::rest::{AccessToken, RestConfig, RestRepository};

use crate::Clock;
use crate::auth::{AuthProvider, LocalAuthProvider, RestAuthProvider};
use crate::catalog_service::CatalogService;
use crate::identity::IdentityResolver;
use crate::progress_store::ProgressStore;

/// Assembles the services the controller drives.
#[derive(Clone)]
pub struct CourseServices {
    clock: Clock,
    identity: Arc<IdentityResolver>,
    catalog: Arc<CatalogService>,
    progress: Arc<ProgressStore>,
}

impl CourseServices {
    #[must_use]
    pub fn new(clock: Clock, storage: &Storage, auth: Arc<dyn AuthProvider>) -> Self {
        Self {
            clock,
            identity: Arc::new(IdentityResolver::new(auth, Arc::clone(&storage.local))),
            catalog: Arc::new(CatalogService::new(Arc::clone(&storage.courses))),
            progress: Arc::new(ProgressStore::new(Arc::clone(&storage.progress))),
        }
    }

    /// Everything served from `storage`, accounts checked locally.
    #[must_use]
    pub fn local(clock: Clock, storage: &Storage) -> Self {
        let auth = LocalAuthProvider::new(
            clock,
            Arc::clone(&storage.accounts),
            Arc::clone(&storage.local),
        );
        Self::new(clock, storage, Arc::new(auth))
    }

    /// Catalog, progress and auth served by a hosted backend; the anonymous
    /// id and the persisted session stay in `storage`'s local store.
    #[must_use]
    pub fn remote(clock: Clock, storage: Storage, config: RestConfig) -> Self {
        let token = AccessToken::new();
        let auth = RestAuthProvider::new(config.clone(), token.clone(), Arc::clone(&storage.local));
        let storage = storage.with_remote(RestRepository::new(config, token));
        Self::new(clock, &storage, Arc::new(auth))
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    #[must_use]
    pub fn identity(&self) -> &IdentityResolver {
        &self.identity
    }

    #[must_use]
    pub fn catalog(&self) -> &CatalogService {
        &self.catalog
    }

    #[must_use]
    pub fn progress(&self) -> &ProgressStore {
        &self.progress
    }
}
