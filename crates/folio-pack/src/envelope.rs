//! Envelope assembly and opening
//!
//! An envelope hands one reader the content key of one entry, wrapped under
//! the author/reader wrapping key.

use folio_core::{Envelope, FolioError, FolioResult, Id};
use folio_crypto::{
    derive_wrapping_key, unwrap_key, wrap_key, ContentKey, CryptoProvider, KeyPair, WrappedKey,
};
use tracing::debug;

pub fn new_envelope(
    entry_key: Id,
    author_public_key: &[u8],
    reader_public_key: &[u8],
    wrapped: WrappedKey,
) -> Envelope {
    Envelope {
        entry_key,
        author_public_key: author_public_key.to_vec(),
        reader_public_key: reader_public_key.to_vec(),
        content_key_ciphertext: wrapped.ciphertext,
        content_key_ciphertext_mac: wrapped.mac,
    }
}

/// Derive the wrapping key for (author, reader), wrap `key`, and build the envelope.
pub fn seal_envelope(
    provider: &dyn CryptoProvider,
    entry_key: Id,
    author: &KeyPair,
    reader_public_key: &[u8],
    key: &ContentKey,
) -> FolioResult<Envelope> {
    let wrapping = derive_wrapping_key(provider, author, reader_public_key)?;
    let wrapped = wrap_key(provider, &wrapping, key)?;
    Ok(new_envelope(
        entry_key,
        author.public_key(),
        reader_public_key,
        wrapped,
    ))
}

/// Recover the content key using the reader's key pair.
pub fn open_envelope(
    provider: &dyn CryptoProvider,
    envelope: &Envelope,
    reader: &KeyPair,
) -> FolioResult<ContentKey> {
    if envelope.reader_public_key != reader.public_key().as_slice() {
        return Err(FolioError::missing_key(&envelope.reader_public_key));
    }
    let wrapping = derive_wrapping_key(provider, reader, &envelope.author_public_key)?;
    let key = unwrap_key(
        provider,
        &wrapping,
        &envelope.content_key_ciphertext,
        &envelope.content_key_ciphertext_mac,
    )?;
    debug!(entry = %envelope.entry_key, "opened envelope");
    Ok(key)
}
