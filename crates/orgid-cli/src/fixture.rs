use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use orgid_content::InMemoryContentFetcher;
use orgid_ledger::{InMemoryRegistry, LedgerEvent, OrganizationView};
use orgid_types::{ContentId, OrgId};
use serde::Deserialize;

/// A recorded slice of chain history.
///
/// `views` answer `getOrganization`, ids in `reverting` make it revert, and
/// `documents` hold profile JSON keyed by CID.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Fixture {
    pub views: Vec<OrganizationView>,
    pub reverting: Vec<OrgId>,
    pub documents: BTreeMap<ContentId, serde_json::Value>,
    pub events: Vec<LedgerEvent>,
}

impl Fixture {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read fixture {}", path.display()))?;
        Self::from_json(&content).with_context(|| format!("invalid fixture {}", path.display()))
    }

    pub fn from_json(s: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn registry(&self) -> InMemoryRegistry {
        let registry = InMemoryRegistry::from_views(self.views.iter().cloned());
        for org_id in &self.reverting {
            registry.set_reverting(*org_id);
        }
        registry
    }

    pub fn document_fetcher(&self) -> anyhow::Result<InMemoryContentFetcher> {
        let fetcher = InMemoryContentFetcher::new();
        for (cid, document) in &self.documents {
            fetcher.insert(cid.clone(), serde_json::to_vec(document)?);
        }
        Ok(fetcher)
    }
}

#[cfg(test)]
mod tests {
    use orgid_content::ContentFetcher;
    use orgid_ledger::{EventBody, OrgIdRegistry};
    use orgid_types::JsonHash;

    use super::*;

    const CID: &str = "bafkrwiflvov2xk5lvov2xk5lvov2xk5lvov2xk5lvov2xk5lvov2xk5lvm";

    fn fixture_json() -> String {
        let org = OrgId::from_bytes([0xaa; 32]);
        format!(
            r#"{{
                "views": [{{
                    "exists": true,
                    "orgId": "{org}",
                    "orgJsonHash": "{hash}",
                    "parentOrgId": "{zero}",
                    "owner": "0x0101010101010101010101010101010101010101",
                    "director": "0x0000000000000000000000000000000000000000",
                    "isActive": true,
                    "isDirectorshipAccepted": false
                }}],
                "reverting": ["{bad}"],
                "documents": {{
                    "{CID}": {{ "id": "did:x", "legalEntity": {{ "legalName": "Acme", "legalType": "corp" }} }}
                }},
                "events": [{{
                    "address": "0x0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a",
                    "block": {{ "number": 1, "timestamp": 100 }},
                    "logIndex": 0,
                    "event": "OrganizationCreated",
                    "orgId": "{org}"
                }}]
            }}"#,
            hash = JsonHash::from_bytes([0xab; 32]),
            zero = OrgId::zero(),
            bad = OrgId::from_bytes([0xbb; 32]),
        )
    }

    #[test]
    fn parses_all_sections() {
        let fixture = Fixture::from_json(&fixture_json()).unwrap();
        assert_eq!(fixture.views.len(), 1);
        assert_eq!(fixture.reverting.len(), 1);
        assert_eq!(fixture.documents.len(), 1);
        assert!(matches!(
            fixture.events[0].body,
            EventBody::OrganizationCreated { .. }
        ));
    }

    #[test]
    fn fixture_cid_matches_view_hash() {
        let fixture = Fixture::from_json(&fixture_json()).unwrap();
        let cid = ContentId::from_hash(&fixture.views[0].org_json_hash);
        assert_eq!(cid.as_str(), CID);
        assert!(fixture.documents.contains_key(&cid));
    }

    #[test]
    fn empty_fixture_is_valid() {
        let fixture = Fixture::from_json("{}").unwrap();
        assert!(fixture.events.is_empty());
    }

    #[tokio::test]
    async fn registry_and_fetcher_serve_fixture_data() {
        let fixture = Fixture::from_json(&fixture_json()).unwrap();
        let registry = fixture.registry();
        assert!(registry
            .get_organization(&OrgId::from_bytes([0xaa; 32]))
            .await
            .unwrap()
            .exists);
        assert!(registry
            .get_organization(&OrgId::from_bytes([0xbb; 32]))
            .await
            .is_err());

        let fetcher = fixture.document_fetcher().unwrap();
        let bytes = fetcher
            .fetch(&ContentId::from_hash(&JsonHash::from_bytes([0xab; 32])))
            .await
            .unwrap();
        let doc: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(doc["legalEntity"]["legalName"], "Acme");
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Fixture::load(&dir.path().join("none.json")).unwrap_err();
        assert!(err.to_string().contains("cannot read fixture"));
    }
}
