//! Content addresses
//!
//! An [`Id`] is the BLAKE3 hash of a document's canonical serialized bytes.
//! `Id::of` is the only way to mint one from content; `Id::from_slice` exists
//! for reading addresses back out of documents and must be length-checked.

use std::fmt;

use crate::error::{check_length, FolioResult};

/// Length of a content address in bytes
pub const ID_SIZE: usize = 32;

/// A 32-byte content address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id([u8; ID_SIZE]);

impl Id {
    /// Content address of some serialized bytes.
    pub fn of(bytes: &[u8]) -> Self {
        Self(*blake3::hash(bytes).as_bytes())
    }

    /// Parse an address stored inside a document.
    pub fn from_slice(bytes: &[u8]) -> FolioResult<Self> {
        check_length("content address", bytes, ID_SIZE)?;
        let mut id = [0u8; ID_SIZE];
        id.copy_from_slice(bytes);
        Ok(Self(id))
    }

    pub fn as_bytes(&self) -> &[u8; ID_SIZE] {
        &self.0
    }

    /// Lowercase hex, 64 chars
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> FolioResult<Self> {
        let bytes = hex::decode(s)
            .map_err(|e| crate::FolioError::malformed("content address hex", e))?;
        Self::from_slice(&bytes)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", &self.to_hex()[..16])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use proptest::prelude::*;

    #[test]
    fn test_hex_roundtrip() {
        let id = Id::of(b"hello folio");
        let hex = id.to_hex();
        assert_eq!(hex.len(), 64);
        assert_eq!(Id::from_hex(&hex).unwrap(), id);
    }

    #[test]
    fn test_id_is_blake3_of_bytes() {
        let bytes = b"canonical document bytes";
        assert_eq!(Id::of(bytes).as_bytes(), blake3::hash(bytes).as_bytes());
        assert_eq!(
            Id::from_slice(Id::of(bytes).as_bytes()).unwrap(),
            Id::of(bytes)
        );
    }

    #[test]
    fn test_from_slice_wrong_length() {
        let err = Id::from_slice(&[0u8; 31]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedInput);
    }

    proptest! {
        #[test]
        fn id_is_deterministic(data in proptest::collection::vec(any::<u8>(), 0..=2048)) {
            prop_assert_eq!(Id::of(&data), Id::of(&data));
        }

        #[test]
        fn one_byte_change_changes_id(
            data in proptest::collection::vec(any::<u8>(), 1..=2048),
            pos in any::<prop::sample::Index>(),
        ) {
            let mut altered = data.clone();
            let i = pos.index(altered.len());
            altered[i] ^= 0x01;
            prop_assert_ne!(Id::of(&data), Id::of(&altered));
        }
    }
}
