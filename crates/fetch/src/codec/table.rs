//! The MIME type to codec mapping.
//!
//! Reads are lock-free: the whole map sits behind an [`ArcSwap`], and a lookup
//! loads the current snapshot. Registrations are serialized by a writer mutex,
//! copy the map, insert and publish the new snapshot in one store. A lookup
//! racing a registration for the same key therefore sees either the old or the
//! new codec, never a partially updated map.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use arc_swap::ArcSwap;
use once_cell::sync::Lazy;
use tracing::debug;

use micro_fetch_http::protocol::{MimeType, mime};

use crate::codec::{Codec, CsvCodec, FormCodec, JsonCodec, XmlCodec};

type CodecMap = HashMap<String, Arc<dyn Codec>>;

/// A thread-safe mapping from canonical MIME strings to codecs.
///
/// Keys given as aliases (`"json"`) are resolved through the mime registry
/// before they are stored or looked up, except by [`lookup`](Self::lookup)
/// which matches the exact string.
pub struct CodecTable {
    codecs: ArcSwap<CodecMap>,
    writer: Mutex<()>,
}

static GLOBAL: Lazy<CodecTable> = Lazy::new(CodecTable::new);

impl CodecTable {
    /// A table seeded with the JSON, XML, CSV and form codecs.
    pub fn new() -> Self {
        let mut codecs: CodecMap = HashMap::with_capacity(8);
        codecs.insert(mime::JSON.to_owned(), Arc::new(JsonCodec::new()));
        codecs.insert(mime::XML.to_owned(), Arc::new(XmlCodec::new()));
        codecs.insert(mime::CSV.to_owned(), Arc::new(CsvCodec::new()));
        codecs.insert(mime::FORM.to_owned(), Arc::new(FormCodec::new()));
        Self::from_map(codecs)
    }

    /// A table with no codecs; every body decodes as raw text.
    pub fn empty() -> Self {
        Self::from_map(HashMap::new())
    }

    fn from_map(codecs: CodecMap) -> Self {
        Self { codecs: ArcSwap::from_pointee(codecs), writer: Mutex::new(()) }
    }

    /// Returns a reference to the process-wide table.
    ///
    /// It is created with the built-in codecs on first use and is never torn
    /// down.
    pub fn global() -> &'static CodecTable {
        &GLOBAL
    }

    /// Inserts or replaces the codec for `mime`.
    pub fn register<C>(&self, mime: impl AsRef<str>, codec: C)
    where
        C: Codec + 'static,
    {
        self.register_arc(mime, Arc::new(codec));
    }

    pub fn register_arc(&self, mime: impl AsRef<str>, codec: Arc<dyn Codec>) {
        let key = MimeType::resolve(mime.as_ref()).into_string();

        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let mut codecs = CodecMap::clone(&self.codecs.load());
        let replaced = codecs.insert(key.clone(), codec).is_some();
        self.codecs.store(Arc::new(codecs));

        debug!(mime = %key, replaced, "registered codec");
    }

    /// The codec registered under exactly `mime`.
    pub fn lookup(&self, mime: &str) -> Option<Arc<dyn Codec>> {
        self.codecs.load().get(mime).cloned()
    }

    /// The codec registered for `mime`, resolving aliases first.
    pub fn get_codec(&self, mime: impl AsRef<str>) -> Option<Arc<dyn Codec>> {
        self.lookup(MimeType::resolve(mime.as_ref()).as_str())
    }

    pub fn has_registered(&self, mime: impl AsRef<str>) -> bool {
        self.codecs.load().contains_key(MimeType::resolve(mime.as_ref()).as_str())
    }

    /// Number of registered MIME types.
    pub fn len(&self) -> usize {
        self.codecs.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.codecs.load().is_empty()
    }
}

impl Default for CodecTable {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CodecTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let codecs = self.codecs.load();
        let mut keys: Vec<&str> = codecs.keys().map(String::as_str).collect();
        keys.sort_unstable();
        f.debug_struct("CodecTable").field("mime_types", &keys).finish()
    }
}
