//! Host-supplied asset descriptor.

use bytes::Bytes;
use std::collections::BTreeMap;
use std::fmt;
use std::pin::Pin;
use tokio::io::AsyncRead;

/// Content of an incoming asset.
pub enum AssetSource {
    /// Whole file already in memory.
    Buffer(Bytes),
    /// Readable byte stream, consumed exactly once.
    Stream(Pin<Box<dyn AsyncRead + Send + Unpin>>),
}

impl AssetSource {
    pub fn from_reader<R>(reader: R) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        AssetSource::Stream(Box::pin(reader))
    }
}

impl fmt::Debug for AssetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetSource::Buffer(bytes) => f
                .debug_tuple("Buffer")
                .field(&format_args!("{} bytes", bytes.len()))
                .finish(),
            AssetSource::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// Description of one asset as handed over by the host.
///
/// `path` carries the raw custom metadata sent with an upload (a JSON object
/// with `upload_path` and `imageSizes`). After a successful upload the parsed
/// customization is written to `provider_metadata`, which the host persists
/// and hands back on delete. `url` and `formats` are outputs.
#[derive(Debug, Default)]
pub struct AssetDescriptor {
    pub hash: String,
    pub ext: String,
    pub mime: String,
    pub name: String,
    pub source: Option<AssetSource>,
    pub path: Option<String>,
    pub provider_metadata: Option<serde_json::Value>,
    pub url: Option<String>,
    /// Size name to public URL, filled for every stored size variant.
    pub formats: BTreeMap<String, String>,
}

impl AssetDescriptor {
    pub fn new(hash: impl Into<String>, ext: impl Into<String>, mime: impl Into<String>) -> Self {
        Self {
            hash: hash.into(),
            ext: ext.into(),
            mime: mime.into(),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_buffer(mut self, data: impl Into<Bytes>) -> Self {
        self.source = Some(AssetSource::Buffer(data.into()));
        self
    }

    pub fn with_stream<R>(mut self, reader: R) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        self.source = Some(AssetSource::from_reader(reader));
        self
    }

    pub fn with_path(mut self, raw: impl Into<String>) -> Self {
        self.path = Some(raw.into());
        self
    }

    pub fn with_provider_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.provider_metadata = Some(metadata);
        self
    }
}
