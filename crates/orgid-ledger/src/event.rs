use std::fmt;

use orgid_types::{Address, BlockRef, JsonHash, OrgId};
use serde::{Deserialize, Serialize};

/// Contract family an event comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventSource {
    /// The ORGiD registry contract.
    OrgId,
    /// An arbitrable directory contract.
    Directory,
    /// The directory index contract listing directories.
    DirectoryIndex,
}

impl fmt::Display for EventSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::OrgId => "OrgId",
            Self::Directory => "Directory",
            Self::DirectoryIndex => "DirectoryIndex",
        };
        write!(f, "{s}")
    }
}

/// Decoded event parameters.
///
/// Field names follow the contract ABI without the leading underscore
/// (`_newSegment` becomes `newSegment`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all_fields = "camelCase")]
pub enum EventBody {
    // ORGiD registry
    OrganizationCreated {
        org_id: OrgId,
        #[serde(default)]
        owner: Option<Address>,
    },
    UnitCreated {
        parent_org_id: OrgId,
        unit_org_id: OrgId,
        #[serde(default)]
        director: Option<Address>,
    },
    OrgJsonChanged {
        org_id: OrgId,
        new_org_json_hash: JsonHash,
    },
    OrganizationActiveStateChanged {
        org_id: OrgId,
        new_state: bool,
    },
    OrganizationOwnershipTransferred {
        org_id: OrgId,
        new_owner: Address,
    },
    DirectorshipRequested {
        org_id: OrgId,
        director: Address,
    },
    DirectorshipAccepted {
        org_id: OrgId,
        director: Address,
    },
    DirectorshipRejected {
        org_id: OrgId,
        director: Address,
    },
    DirectorshipTransferred {
        org_id: OrgId,
        new_director: Address,
    },

    // Arbitrable directory
    SegmentChanged {
        new_segment: String,
    },
    OrganizationSubmitted {
        organization: OrgId,
    },
    OrganizationRequestRemoved {
        organization: OrgId,
    },
    OrganizationAdded {
        organization: OrgId,
    },
    OrganizationRemoved {
        organization: OrgId,
    },
    OrganizationChallenged {
        organization: OrgId,
        challenger: Address,
        #[serde(default)]
        reason: String,
    },
    ChallengeContributed {
        organization: OrgId,
        challenge: u64,
        contributor: Address,
    },
    Ruling {
        arbitrator: Address,
        dispute_id: u64,
        ruling: u64,
    },
    Dispute {
        arbitrator: Address,
        dispute_id: u64,
        meta_evidence_id: u64,
        evidence_group_id: u64,
    },
    Evidence {
        arbitrator: Address,
        evidence_group_id: u64,
        party: Address,
        evidence: String,
    },
    MetaEvidence {
        meta_evidence_id: u64,
        evidence: String,
    },

    // Directory index
    SegmentAdded {
        segment: Address,
        #[serde(default)]
        index: u64,
    },
    SegmentRemoved {
        segment: Address,
    },
}

impl EventBody {
    /// Event name as emitted by the contract.
    pub fn name(&self) -> &'static str {
        match self {
            Self::OrganizationCreated { .. } => "OrganizationCreated",
            Self::UnitCreated { .. } => "UnitCreated",
            Self::OrgJsonChanged { .. } => "OrgJsonChanged",
            Self::OrganizationActiveStateChanged { .. } => "OrganizationActiveStateChanged",
            Self::OrganizationOwnershipTransferred { .. } => "OrganizationOwnershipTransferred",
            Self::DirectorshipRequested { .. } => "DirectorshipRequested",
            Self::DirectorshipAccepted { .. } => "DirectorshipAccepted",
            Self::DirectorshipRejected { .. } => "DirectorshipRejected",
            Self::DirectorshipTransferred { .. } => "DirectorshipTransferred",
            Self::SegmentChanged { .. } => "SegmentChanged",
            Self::OrganizationSubmitted { .. } => "OrganizationSubmitted",
            Self::OrganizationRequestRemoved { .. } => "OrganizationRequestRemoved",
            Self::OrganizationAdded { .. } => "OrganizationAdded",
            Self::OrganizationRemoved { .. } => "OrganizationRemoved",
            Self::OrganizationChallenged { .. } => "OrganizationChallenged",
            Self::ChallengeContributed { .. } => "ChallengeContributed",
            Self::Ruling { .. } => "Ruling",
            Self::Dispute { .. } => "Dispute",
            Self::Evidence { .. } => "Evidence",
            Self::MetaEvidence { .. } => "MetaEvidence",
            Self::SegmentAdded { .. } => "SegmentAdded",
            Self::SegmentRemoved { .. } => "SegmentRemoved",
        }
    }

    /// Which contract family emits this event.
    pub fn source(&self) -> EventSource {
        match self {
            Self::OrganizationCreated { .. }
            | Self::UnitCreated { .. }
            | Self::OrgJsonChanged { .. }
            | Self::OrganizationActiveStateChanged { .. }
            | Self::OrganizationOwnershipTransferred { .. }
            | Self::DirectorshipRequested { .. }
            | Self::DirectorshipAccepted { .. }
            | Self::DirectorshipRejected { .. }
            | Self::DirectorshipTransferred { .. } => EventSource::OrgId,
            Self::SegmentAdded { .. } | Self::SegmentRemoved { .. } => {
                EventSource::DirectoryIndex
            }
            _ => EventSource::Directory,
        }
    }

    /// Returns `true` for the arbitration events of a directory.
    pub fn is_arbitration(&self) -> bool {
        matches!(
            self,
            Self::OrganizationChallenged { .. }
                | Self::ChallengeContributed { .. }
                | Self::Ruling { .. }
                | Self::Dispute { .. }
                | Self::Evidence { .. }
                | Self::MetaEvidence { .. }
        )
    }
}

/// A single ledger log, decoded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEvent {
    /// Contract that emitted the log.
    pub address: Address,
    pub block: BlockRef,
    /// Position of the log within its block.
    pub log_index: u64,
    #[serde(flatten)]
    pub body: EventBody,
}

impl LedgerEvent {
    pub fn new(address: Address, block: BlockRef, log_index: u64, body: EventBody) -> Self {
        Self {
            address,
            block,
            log_index,
            body,
        }
    }
}

impl fmt::Display for LedgerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{}:{} from {}",
            self.body.name(),
            self.block,
            self.log_index,
            self.address.short_hex()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn org(seed: u8) -> OrgId {
        OrgId::from_bytes([seed; 32])
    }

    #[test]
    fn sources_are_classified() {
        assert_eq!(
            EventBody::OrganizationCreated {
                org_id: org(1),
                owner: None
            }
            .source(),
            EventSource::OrgId
        );
        assert_eq!(
            EventBody::OrganizationAdded {
                organization: org(1)
            }
            .source(),
            EventSource::Directory
        );
        assert_eq!(
            EventBody::SegmentRemoved {
                segment: Address::zero()
            }
            .source(),
            EventSource::DirectoryIndex
        );
    }

    #[test]
    fn arbitration_events_are_flagged() {
        let ruling = EventBody::Ruling {
            arbitrator: Address::zero(),
            dispute_id: 1,
            ruling: 2,
        };
        assert!(ruling.is_arbitration());
        assert_eq!(ruling.source(), EventSource::Directory);
        assert!(!EventBody::SegmentChanged {
            new_segment: "hotels".into()
        }
        .is_arbitration());
    }

    #[test]
    fn decodes_flat_json_log() {
        let json = format!(
            r#"{{
                "address": "{}",
                "block": {{ "number": 12, "timestamp": 1600000000 }},
                "logIndex": 3,
                "event": "OrgJsonChanged",
                "orgId": "{}",
                "newOrgJsonHash": "{}"
            }}"#,
            Address::from_bytes([0xaa; 20]),
            org(5),
            JsonHash::from_bytes([0xcd; 32])
        );
        let event: LedgerEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event.block, BlockRef::new(12, 1_600_000_000));
        assert_eq!(event.log_index, 3);
        assert_eq!(
            event.body,
            EventBody::OrgJsonChanged {
                org_id: org(5),
                new_org_json_hash: JsonHash::from_bytes([0xcd; 32]),
            }
        );
    }

    #[test]
    fn optional_params_default() {
        let json = format!(
            r#"{{
                "address": "{}",
                "block": {{ "number": 1, "timestamp": 1 }},
                "logIndex": 0,
                "event": "OrganizationCreated",
                "orgId": "{}"
            }}"#,
            Address::zero(),
            org(1)
        );
        let event: LedgerEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(
            event.body,
            EventBody::OrganizationCreated {
                org_id: org(1),
                owner: None
            }
        );
    }

    #[test]
    fn serde_roundtrip() {
        let event = LedgerEvent::new(
            Address::from_bytes([1; 20]),
            BlockRef::new(9, 90),
            4,
            EventBody::SegmentChanged {
                new_segment: "airlines".into(),
            },
        );
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"newSegment\":\"airlines\""));
        let parsed: LedgerEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, event);
    }

    #[test]
    fn display_names_event_and_position() {
        let event = LedgerEvent::new(
            Address::from_bytes([0xab; 20]),
            BlockRef::new(9, 90),
            4,
            EventBody::OrganizationAdded {
                organization: org(2),
            },
        );
        assert_eq!(format!("{event}"), "OrganizationAdded@#9:4 from 0xabababab");
    }
}
