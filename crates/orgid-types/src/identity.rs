/// ORGiD organization identifier.
///
/// A 32-byte value assigned by the registry contract when an organization or
/// unit is created. The `0x`-prefixed hex form is the organization's entity
/// key and never changes once the organization exists.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OrgId([u8; 32]);

impl_hex_bytes!(OrgId, 32, "OrgId");

/// Account or contract address (20 bytes).
///
/// Used for owners, directors, and the contracts that emit events. The zero
/// address stands for "unset" in registry view results.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; 20]);

impl_hex_bytes!(Address, 20, "Address");

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TypeError;

    #[test]
    fn org_id_hex_is_prefixed_lowercase() {
        let id = OrgId::from_bytes([0xAB; 32]);
        let hex = id.to_hex();
        assert!(hex.starts_with("0x"));
        assert_eq!(hex.len(), 66);
        assert_eq!(hex, hex.to_lowercase());
    }

    #[test]
    fn hex_roundtrip_with_and_without_prefix() {
        let id = OrgId::from_bytes([7; 32]);
        let prefixed = id.to_hex();
        assert_eq!(OrgId::from_hex(&prefixed).unwrap(), id);
        assert_eq!(OrgId::from_hex(&prefixed[2..]).unwrap(), id);
    }

    #[test]
    fn uppercase_input_is_accepted() {
        let parsed: Address = "0xDEADBEEFDEADBEEFDEADBEEFDEADBEEFDEADBEEF".parse().unwrap();
        assert_eq!(parsed.to_hex(), "0xdeadbeefdeadbeefdeadbeefdeadbeefdeadbeef");
    }

    #[test]
    fn wrong_length_is_rejected() {
        let err = Address::from_hex("0x1234").unwrap_err();
        assert_eq!(
            err,
            TypeError::InvalidLength {
                expected: 20,
                actual: 2
            }
        );
    }

    #[test]
    fn invalid_hex_is_rejected() {
        assert!(matches!(
            OrgId::from_hex("0xzz"),
            Err(TypeError::InvalidHex(_))
        ));
    }

    #[test]
    fn zero_address_detection() {
        assert!(Address::zero().is_zero());
        assert!(!Address::from_bytes([1; 20]).is_zero());
    }

    #[test]
    fn serde_uses_hex_strings() {
        let addr = Address::from_bytes([0x11; 20]);
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{}\"", addr.to_hex()));
        let parsed: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, addr);
    }

    #[test]
    fn debug_is_short() {
        let id = OrgId::from_bytes([0x12; 32]);
        assert_eq!(format!("{id:?}"), "OrgId(0x12121212)");
    }

    #[test]
    fn ordering_is_bytewise() {
        assert!(OrgId::from_bytes([0; 32]) < OrgId::from_bytes([1; 32]));
    }
}
