// src/store/charset.rs
//! Ordered charset fallback chain for the dated store files.

use encoding_rs::{Encoding, UTF_16BE, UTF_16LE};
use std::path::Path;

use crate::error::{Result, StoreError};

#[derive(Debug, Clone)]
pub struct CharsetChain {
    chain: Vec<&'static Encoding>,
}

impl CharsetChain {
    /// Resolve WHATWG labels ("utf-8", "latin1", "utf-16le", ...).
    pub fn from_labels<S: AsRef<str>>(labels: &[S]) -> Result<Self> {
        let mut chain = Vec::with_capacity(labels.len());
        for label in labels {
            let label = label.as_ref();
            let enc = Encoding::for_label(label.trim().as_bytes())
                .ok_or_else(|| StoreError::UnknownCharset(label.to_string()))?;
            if !chain.contains(&enc) {
                chain.push(enc);
            }
        }
        if chain.is_empty() {
            return Err(StoreError::UnknownCharset(String::new()));
        }
        Ok(Self { chain })
    }

    pub fn primary(&self) -> &'static Encoding {
        self.chain[0]
    }

    /// BOM wins; otherwise the first charset that decodes without errors.
    /// Single-byte charsets such as windows-1252 accept any input, so charsets
    /// after them are never tried: UTF-16 files are recognised by their BOM only.
    /// Files written here always carry one.
    pub fn decode(&self, bytes: &[u8], path: &Path) -> Result<(String, &'static Encoding)> {
        if bytes.is_empty() {
            return Ok((String::new(), self.primary()));
        }
        if let Some((enc, bom_len)) = Encoding::for_bom(bytes) {
            if let Some(text) = enc.decode_without_bom_handling_and_without_replacement(&bytes[bom_len..]) {
                return Ok((text.into_owned(), enc));
            }
        }
        for enc in &self.chain {
            if let Some(text) = enc.decode_without_bom_handling_and_without_replacement(bytes) {
                return Ok((text.into_owned(), *enc));
            }
        }
        Err(self.failure(path))
    }

    /// Encode with `preferred` first (the file's current charset), then the chain.
    pub fn encode(
        &self,
        text: &str,
        preferred: Option<&'static Encoding>,
        path: &Path,
    ) -> Result<(Vec<u8>, &'static Encoding)> {
        let candidates = preferred
            .into_iter()
            .chain(self.chain.iter().copied().filter(|e| Some(*e) != preferred));
        for enc in candidates {
            match encode_strict(enc, text) {
                Some(bytes) => return Ok((bytes, enc)),
                None => tracing::debug!(charset = enc.name(), path = %path.display(), "charset cannot represent text, falling back"),
            }
        }
        Err(self.failure(path))
    }

    fn failure(&self, path: &Path) -> StoreError {
        StoreError::EncodingFailure {
            path: path.to_path_buf(),
            tried: self
                .chain
                .iter()
                .map(|e| e.name())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

fn encode_strict(enc: &'static Encoding, text: &str) -> Option<Vec<u8>> {
    // encoding_rs only decodes UTF-16; the wide output is written by hand, with a BOM.
    if enc == UTF_16LE || enc == UTF_16BE {
        let mut out = Vec::with_capacity(2 + text.len() * 2);
        if enc == UTF_16LE {
            out.extend_from_slice(&[0xFF, 0xFE]);
            text.encode_utf16().for_each(|u| out.extend_from_slice(&u.to_le_bytes()));
        } else {
            out.extend_from_slice(&[0xFE, 0xFF]);
            text.encode_utf16().for_each(|u| out.extend_from_slice(&u.to_be_bytes()));
        }
        return Some(out);
    }
    let (bytes, used, had_errors) = enc.encode(text);
    if had_errors || used != enc {
        return None;
    }
    Some(bytes.into_owned())
}
