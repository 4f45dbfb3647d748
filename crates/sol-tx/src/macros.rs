/// Base58 text form, serde string form, and byte conversions for the
/// fixed-size newtypes (`Pubkey`, `Hash`, `Signature`).
macro_rules! impl_base58_newtype {
    ($name:ident, $len:expr, $err:path) => {
        impl $name {
            /// Wrap raw bytes.
            pub const fn new_from_array(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }

            /// Copy out the raw bytes.
            pub const fn to_bytes(self) -> [u8; $len] {
                self.0
            }

            pub const fn as_array(&self) -> &[u8; $len] {
                &self.0
            }

            /// Build from a slice that must be exactly the right length.
            pub fn try_from_slice(bytes: &[u8]) -> Result<Self, $crate::error::SolError> {
                let arr: [u8; $len] = bytes.try_into().map_err(|_| {
                    $err(format!("expected {} bytes, got {}", $len, bytes.len()))
                })?;
                Ok(Self(arr))
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&bs58::encode(&self.0).into_string())
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({})", stringify!($name), self)
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::error::SolError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let bytes = bs58::decode(s)
                    .into_vec()
                    .map_err(|e| $err(format!("base58 decode failed: {e}")))?;
                Self::try_from_slice(&bytes)
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl From<[u8; $len]> for $name {
            fn from(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let text = <String as serde::Deserialize>::deserialize(deserializer)?;
                text.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}
