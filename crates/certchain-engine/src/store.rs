//! Persistence and lookup seams.
//!
//! The engine never talks to a database or a remote identity service
//! directly. It goes through three object-safe traits: [`CertificateStore`]
//! for certificate records, [`TemplateSource`] for the template registry,
//! and [`UserDirectory`] for issuer and recipient identities. The in-memory
//! implementations here back development deployments and the test suites.
//!
//! All lock usage is `parking_lot` and synchronous — locks are never held
//! across `.await` points, and a panicking writer does not poison the store.

use std::collections::HashMap;

use parking_lot::RwLock;
use thiserror::Error;

use certchain_core::{CertificateId, SerialNumber, TemplateId, UserId};
use certchain_model::{Certificate, LifecycleError, Template, User};

/// Errors from certificate persistence.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A record with the same unique key already exists.
    #[error("duplicate {field}: {value}")]
    DuplicateKey {
        /// Which unique field collided (`"id"` or `"serialNumber"`).
        field: &'static str,
        /// The colliding value.
        value: String,
    },
}

/// Certificate persistence seam.
///
/// `try_update` runs read-validate-mutate under a single write lock, so
/// concurrent lifecycle mutations (a revocation racing a deferred anchor
/// retry) serialize per record and neither sees a half-applied state.
pub trait CertificateStore: Send + Sync {
    /// Insert a new record. Fails when the id or serial number collides
    /// with an existing record; on failure nothing is written.
    fn insert(&self, certificate: Certificate) -> Result<(), StoreError>;

    /// Fetch by id.
    fn get(&self, id: &CertificateId) -> Option<Certificate>;

    /// Fetch by serial number.
    fn get_by_serial(&self, serial: &SerialNumber) -> Option<Certificate>;

    /// Atomically read-validate-mutate a record. Returns `None` when the
    /// id is unknown, otherwise the closure's result with the updated
    /// record on success.
    fn try_update(
        &self,
        id: &CertificateId,
        f: &mut dyn FnMut(&mut Certificate) -> Result<(), LifecycleError>,
    ) -> Option<Result<Certificate, LifecycleError>>;

    /// Ids of all records whose anchor state is pending retry.
    fn pending_retry_ids(&self) -> Vec<CertificateId>;

    /// All records. Development and test use only.
    fn list(&self) -> Vec<Certificate>;
}

/// Template registry seam. Templates are immutable once registered;
/// there is no update operation.
pub trait TemplateSource: Send + Sync {
    /// Fetch by id.
    fn get(&self, id: &TemplateId) -> Option<Template>;

    /// Register a new template.
    fn register(&self, template: Template);

    /// The platform default template, if one is registered.
    fn default_template(&self) -> Option<Template>;
}

/// Identity service seam. Users are owned by the external identity
/// service; the engine only reads them.
pub trait UserDirectory: Send + Sync {
    /// Fetch by id.
    fn get(&self, id: &UserId) -> Option<User>;

    /// Register a user. Development and seed use only.
    fn register(&self, user: User);
}

struct StoreInner {
    by_id: HashMap<CertificateId, Certificate>,
    by_serial: HashMap<String, CertificateId>,
}

/// In-memory certificate store with a serial-number index.
pub struct InMemoryStore {
    inner: RwLock<StoreInner>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(StoreInner {
                by_id: HashMap::new(),
                by_serial: HashMap::new(),
            }),
        }
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.inner.read().by_id.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.read().by_id.is_empty()
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CertificateStore for InMemoryStore {
    fn insert(&self, certificate: Certificate) -> Result<(), StoreError> {
        let mut inner = self.inner.write();
        if inner.by_id.contains_key(&certificate.id) {
            return Err(StoreError::DuplicateKey {
                field: "id",
                value: certificate.id.to_string(),
            });
        }
        let serial = certificate.serial_number.as_str().to_string();
        if inner.by_serial.contains_key(&serial) {
            return Err(StoreError::DuplicateKey {
                field: "serialNumber",
                value: serial,
            });
        }
        inner.by_serial.insert(serial, certificate.id);
        inner.by_id.insert(certificate.id, certificate);
        Ok(())
    }

    fn get(&self, id: &CertificateId) -> Option<Certificate> {
        self.inner.read().by_id.get(id).cloned()
    }

    fn get_by_serial(&self, serial: &SerialNumber) -> Option<Certificate> {
        let inner = self.inner.read();
        let id = inner.by_serial.get(serial.as_str())?;
        inner.by_id.get(id).cloned()
    }

    fn try_update(
        &self,
        id: &CertificateId,
        f: &mut dyn FnMut(&mut Certificate) -> Result<(), LifecycleError>,
    ) -> Option<Result<Certificate, LifecycleError>> {
        let mut inner = self.inner.write();
        let record = inner.by_id.get_mut(id)?;
        Some(f(record).map(|()| record.clone()))
    }

    fn pending_retry_ids(&self) -> Vec<CertificateId> {
        self.inner
            .read()
            .by_id
            .values()
            .filter(|c| c.anchor.is_pending_retry())
            .map(|c| c.id)
            .collect()
    }

    fn list(&self) -> Vec<Certificate> {
        self.inner.read().by_id.values().cloned().collect()
    }
}

/// In-memory template registry.
#[derive(Default)]
pub struct InMemoryTemplates {
    templates: RwLock<HashMap<TemplateId, Template>>,
}

impl InMemoryTemplates {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }
}

impl TemplateSource for InMemoryTemplates {
    fn get(&self, id: &TemplateId) -> Option<Template> {
        self.templates.read().get(id).cloned()
    }

    fn register(&self, template: Template) {
        self.templates.write().insert(template.id, template);
    }

    fn default_template(&self) -> Option<Template> {
        self.templates
            .read()
            .values()
            .find(|t| t.is_default)
            .cloned()
    }
}

/// In-memory user directory.
#[derive(Default)]
pub struct InMemoryDirectory {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserDirectory for InMemoryDirectory {
    fn get(&self, id: &UserId) -> Option<User> {
        self.users.read().get(id).cloned()
    }

    fn register(&self, user: User) {
        self.users.write().insert(user.id, user);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use certchain_core::{ContentDigest, Timestamp};
    use certchain_model::{
        AnchorState, CertificateMetadata, CertificateStatus, DocumentBody, Role, StyleSheet,
    };

    fn make_certificate() -> Certificate {
        let now = Timestamp::now();
        Certificate {
            id: CertificateId::new(),
            title: "Rust Fundamentals".to_string(),
            description: "Completed the course".to_string(),
            issuer_id: UserId::new(),
            issuer_name: "Systems Academy".to_string(),
            recipient_id: UserId::new(),
            recipient_name: "Ada Lovelace".to_string(),
            recipient_email: "ada@example.org".to_string(),
            image_url: None,
            issue_date: now,
            expiry_date: None,
            serial_number: SerialNumber::generate(),
            status: CertificateStatus::Issued,
            anchor: AnchorState::Unanchored,
            metadata: CertificateMetadata::default(),
            template_id: TemplateId::new(),
            document: DocumentBody {
                content: "<h1>Rust Fundamentals</h1>".to_string(),
                styles: StyleSheet::default(),
            },
            fingerprint: ContentDigest::sha256([0u8; 32]),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn insert_and_get_roundtrip() {
        let store = InMemoryStore::new();
        let cert = make_certificate();
        let id = cert.id;
        let serial = cert.serial_number.clone();

        store.insert(cert).unwrap();
        assert_eq!(store.get(&id).unwrap().id, id);
        assert_eq!(store.get_by_serial(&serial).unwrap().id, id);
    }

    #[test]
    fn duplicate_id_is_rejected() {
        let store = InMemoryStore::new();
        let cert = make_certificate();
        let mut twin = make_certificate();
        twin.id = cert.id;

        store.insert(cert).unwrap();
        let err = store.insert(twin).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey { field: "id", .. }));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn duplicate_serial_is_rejected() {
        let store = InMemoryStore::new();
        let cert = make_certificate();
        let mut twin = make_certificate();
        twin.serial_number = cert.serial_number.clone();

        store.insert(cert).unwrap();
        let err = store.insert(twin).unwrap_err();
        assert!(matches!(
            err,
            StoreError::DuplicateKey {
                field: "serialNumber",
                ..
            }
        ));
        // The failed insert wrote nothing, including the serial index.
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn try_update_applies_lifecycle_mutation() {
        let store = InMemoryStore::new();
        let cert = make_certificate();
        let id = cert.id;
        store.insert(cert).unwrap();

        let admin = UserId::new();
        let updated = store
            .try_update(&id, &mut |c| {
                c.revoke("issued in error".to_string(), admin, Timestamp::now())
            })
            .unwrap()
            .unwrap();
        assert!(matches!(updated.status, CertificateStatus::Revoked { .. }));
        assert!(matches!(
            store.get(&id).unwrap().status,
            CertificateStatus::Revoked { .. }
        ));
    }

    #[test]
    fn try_update_surfaces_closure_error() {
        let store = InMemoryStore::new();
        let cert = make_certificate();
        let id = cert.id;
        store.insert(cert).unwrap();

        store
            .try_update(&id, &mut |c| {
                c.revoke("first".to_string(), UserId::new(), Timestamp::now())
            })
            .unwrap()
            .unwrap();
        let err = store
            .try_update(&id, &mut |c| {
                c.revoke("second".to_string(), UserId::new(), Timestamp::now())
            })
            .unwrap()
            .unwrap_err();
        assert_eq!(err, LifecycleError::AlreadyRevoked);
    }

    #[test]
    fn try_update_unknown_id_is_none() {
        let store = InMemoryStore::new();
        assert!(store
            .try_update(&CertificateId::new(), &mut |_| Ok(()))
            .is_none());
    }

    #[test]
    fn pending_retry_ids_filters_anchor_state() {
        let store = InMemoryStore::new();
        let anchored = make_certificate();
        let mut pending = make_certificate();
        pending.anchor = AnchorState::PendingRetry;
        let pending_id = pending.id;

        store.insert(anchored).unwrap();
        store.insert(pending).unwrap();

        assert_eq!(store.pending_retry_ids(), vec![pending_id]);
    }

    #[test]
    fn default_template_lookup() {
        let templates = InMemoryTemplates::new();
        let now = Timestamp::now();
        let make = |is_default: bool| Template {
            id: TemplateId::new(),
            name: "Classic".to_string(),
            description: "Standard layout".to_string(),
            markup: "<h1>{{title}}</h1>".to_string(),
            styles: StyleSheet::default(),
            placeholders: vec!["title".to_string()],
            is_default,
            created_by: UserId::new(),
            created_at: now,
        };

        templates.register(make(false));
        assert!(templates.default_template().is_none());

        let default = make(true);
        let default_id = default.id;
        templates.register(default);
        assert_eq!(templates.default_template().unwrap().id, default_id);
    }

    #[test]
    fn directory_roundtrip() {
        let directory = InMemoryDirectory::new();
        let user = User {
            id: UserId::new(),
            email: "ada@example.org".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            role: Role::Issuer,
            is_active: true,
            created_at: Timestamp::now(),
        };
        let id = user.id;
        directory.register(user);
        assert_eq!(directory.get(&id).unwrap().email, "ada@example.org");
        assert!(directory.get(&UserId::new()).is_none());
    }
}
