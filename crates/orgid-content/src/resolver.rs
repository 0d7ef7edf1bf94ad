use orgid_store::{
    EntityRepository, EntityStore, LegalEntity, OrganizationAddress, OrganizationType,
    OrganizationalUnit, StoreResult,
};
use orgid_types::ContentId;
use tracing::{debug, warn};

use crate::error::{FetchError, ProfileError};
use crate::fetcher::ContentFetcher;
use crate::profile::{extract_profile, Profile, ProfileDocument};

/// Result of resolving a profile document.
#[derive(Debug)]
pub enum ProfileResolution {
    /// The document was accepted and the profile persisted.
    Resolved(Profile),
    /// The document could not be retrieved.
    NotFound(FetchError),
    /// The document was retrieved but rejected.
    Invalid(ProfileError),
}

impl ProfileResolution {
    pub fn profile(&self) -> Option<&Profile> {
        match self {
            Self::Resolved(profile) => Some(profile),
            _ => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }
}

/// Fetches, validates and persists profiles.
pub struct ContentResolver<F> {
    fetcher: F,
}

impl<F: ContentFetcher> ContentResolver<F> {
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Resolve the document at `cid` into a profile of the given kind.
    ///
    /// Fetch failures and rejected documents leave the store untouched and
    /// come back as [`ProfileResolution::NotFound`] / [`ProfileResolution::Invalid`].
    /// Only store failures are errors.
    pub async fn resolve<S: EntityStore + ?Sized>(
        &self,
        store: &S,
        cid: &ContentId,
        kind: OrganizationType,
    ) -> StoreResult<ProfileResolution> {
        let bytes = match self.fetcher.fetch(cid).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(cid = %cid, error = %e, "profile document unavailable");
                return Ok(ProfileResolution::NotFound(e));
            }
        };

        let document = match extract_profile(&bytes, kind) {
            Ok(document) => document,
            Err(e) => {
                warn!(cid = %cid, kind = %kind, error = %e, "profile document rejected");
                return Ok(ProfileResolution::Invalid(e));
            }
        };

        let profile = persist(store, document)?;
        debug!(cid = %cid, did = profile.did(), kind = %kind, "profile resolved");
        Ok(ProfileResolution::Resolved(profile))
    }
}

/// Write the address, then the profile, keeping any existing reverse link.
fn persist<S: EntityStore + ?Sized>(store: &S, document: ProfileDocument) -> StoreResult<Profile> {
    if let Some(address) = document.address {
        let mut stored = store.load_or_create::<OrganizationAddress>(&address.id)?;
        *stored.get_mut() = address;
        store.upsert(stored.get())?;
    }

    Ok(match document.profile {
        Profile::LegalEntity(parsed) => {
            let existing = store.load_or_create::<LegalEntity>(&parsed.id)?;
            let stored = LegalEntity {
                organization: existing.get().organization,
                ..parsed
            };
            store.upsert(&stored)?;
            Profile::LegalEntity(stored)
        }
        Profile::OrganizationalUnit(parsed) => {
            let existing = store.load_or_create::<OrganizationalUnit>(&parsed.id)?;
            let stored = OrganizationalUnit {
                organization: existing.get().organization,
                ..parsed
            };
            store.upsert(&stored)?;
            Profile::OrganizationalUnit(stored)
        }
    })
}

#[cfg(test)]
mod tests {
    use orgid_store::InMemoryEntityStore;
    use orgid_types::{JsonHash, OrgId};

    use super::*;
    use crate::fetcher::InMemoryContentFetcher;

    fn cid(seed: u8) -> ContentId {
        ContentId::from_hash(&JsonHash::from_bytes([seed; 32]))
    }

    const ACME: &str = r#"{
        "id": "did:acme",
        "legalEntity": {
            "legalName": "Acme",
            "legalType": "corp",
            "registeredAddress": { "country": "CH" }
        }
    }"#;

    fn resolver() -> ContentResolver<InMemoryContentFetcher> {
        let fetcher = InMemoryContentFetcher::new();
        fetcher.insert(cid(1), ACME);
        fetcher.insert(
            cid(2),
            r#"{"id":"did:acme","legalEntity":{"legalName":"Renamed"}}"#,
        );
        fetcher.insert(
            cid(3),
            r#"{"id":"did:acme","legalEntity":{"legalName":"Acme AG","legalType":"ag"}}"#,
        );
        ContentResolver::new(fetcher)
    }

    #[tokio::test]
    async fn resolves_and_persists_profile_and_address() {
        let store = InMemoryEntityStore::new();
        let resolution = resolver()
            .resolve(&store, &cid(1), OrganizationType::LegalEntity)
            .await
            .unwrap();
        assert!(resolution.is_resolved());
        assert_eq!(resolution.profile().unwrap().did(), "did:acme");

        let le = store.load::<LegalEntity>("did:acme").unwrap().unwrap();
        assert_eq!(le.legal_name.as_deref(), Some("Acme"));
        assert_eq!(le.registered_address.as_deref(), Some("did:acme"));
        let address = store
            .load::<OrganizationAddress>("did:acme")
            .unwrap()
            .unwrap();
        assert_eq!(address.country.as_deref(), Some("CH"));
    }

    #[tokio::test]
    async fn missing_document_is_not_found() {
        let store = InMemoryEntityStore::new();
        let resolution = resolver()
            .resolve(&store, &cid(9), OrganizationType::LegalEntity)
            .await
            .unwrap();
        assert!(matches!(resolution, ProfileResolution::NotFound(FetchError::NotFound(_))));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn rejected_document_leaves_existing_profile_unchanged() {
        let store = InMemoryEntityStore::new();
        let resolver = resolver();
        resolver
            .resolve(&store, &cid(1), OrganizationType::LegalEntity)
            .await
            .unwrap();
        let before = store.snapshot();

        let resolution = resolver
            .resolve(&store, &cid(2), OrganizationType::LegalEntity)
            .await
            .unwrap();
        assert!(matches!(
            resolution,
            ProfileResolution::Invalid(ProfileError::MissingField(ref f)) if f == "legalEntity.legalType"
        ));
        assert_eq!(store.snapshot(), before);
    }

    #[tokio::test]
    async fn re_resolution_keeps_reverse_link() {
        let store = InMemoryEntityStore::new();
        let resolver = resolver();
        resolver
            .resolve(&store, &cid(1), OrganizationType::LegalEntity)
            .await
            .unwrap();
        let mut le = store.load::<LegalEntity>("did:acme").unwrap().unwrap();
        le.organization = Some(OrgId::from_bytes([7; 32]));
        store.upsert(&le).unwrap();

        resolver
            .resolve(&store, &cid(3), OrganizationType::LegalEntity)
            .await
            .unwrap();
        let le = store.load::<LegalEntity>("did:acme").unwrap().unwrap();
        assert_eq!(le.legal_name.as_deref(), Some("Acme AG"));
        assert_eq!(le.registered_address, None);
        assert_eq!(le.organization, Some(OrgId::from_bytes([7; 32])));
    }
}
