/// Shared hex plumbing for fixed-width byte identifiers.
///
/// Display and serde use the `0x`-prefixed lowercase hex form, which is also
/// the entity key form used throughout the store.
macro_rules! impl_hex_bytes {
    ($ty:ident, $len:expr, $debug_name:literal) => {
        impl $ty {
            /// Byte width of this identifier.
            pub const LEN: usize = $len;

            /// Wrap raw bytes.
            pub const fn from_bytes(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }

            /// The all-zero value.
            pub const fn zero() -> Self {
                Self([0u8; $len])
            }

            /// Returns `true` if every byte is zero.
            pub fn is_zero(&self) -> bool {
                self.0.iter().all(|b| *b == 0)
            }

            /// The raw bytes.
            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            /// Full `0x`-prefixed lowercase hex.
            pub fn to_hex(&self) -> String {
                format!("0x{}", hex::encode(self.0))
            }

            /// Short form (first 4 bytes) for log lines.
            pub fn short_hex(&self) -> String {
                format!("0x{}", hex::encode(&self.0[..4]))
            }

            /// Parse from hex, with or without the `0x` prefix.
            pub fn from_hex(s: &str) -> Result<Self, $crate::error::TypeError> {
                $crate::error::decode_fixed::<$len>(s).map(Self)
            }
        }

        impl std::fmt::Debug for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({})", $debug_name, self.short_hex())
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.to_hex())
            }
        }

        impl std::str::FromStr for $ty {
            type Err = $crate::error::TypeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_hex(s)
            }
        }

        impl From<[u8; $len]> for $ty {
            fn from(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }
        }

        impl serde::Serialize for $ty {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> serde::Deserialize<'de> for $ty {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = <String as serde::Deserialize>::deserialize(deserializer)?;
                Self::from_hex(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}
