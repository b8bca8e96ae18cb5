use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;

use super::dav_transport::{
    ByteStream, DIRECTORY_CONTENT_TYPE, DavEntry, DavTransport, Result, TransportError,
};

/// A call received by a [`MemoryTransport`], in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCall {
    List(String),
    FetchMetadata(String),
    OpenRead(String),
    Upload(String),
    CreateContainer(String),
    Delete(String),
}

#[derive(Debug, Clone)]
enum Node {
    Container {
        created_at: DateTime<Utc>,
    },
    Item {
        content: Bytes,
        content_type: String,
        created_at: DateTime<Utc>,
        modified_at: DateTime<Utc>,
    },
}

/// An in-memory implementation of `DavTransport`, intended primarily for testing.
///
/// Containers are keyed by URLs ending in `/`, items by URLs without one.
/// Asking for a resource under its other shape answers 301, like servers that
/// redirect between `dir` and `dir/`. Every call is recorded, failures can be
/// injected per URL, and an artificial latency can be added to every call.
pub struct MemoryTransport {
    nodes: RwLock<BTreeMap<String, Node>>,
    failures: RwLock<HashMap<String, TransportError>>,
    calls: Mutex<Vec<TransportCall>>,
    latency: Option<Duration>,
}

impl MemoryTransport {
    /// Create an empty transport. Not even the root container exists.
    pub fn new() -> Self {
        Self {
            nodes: RwLock::new(BTreeMap::new()),
            failures: RwLock::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            latency: None,
        }
    }

    /// Delay every call by `latency` before it is served.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Add a container without checking that its parent exists.
    pub fn add_container(&self, url: &str) {
        let url = container_key(url);
        self.nodes.write().expect("memory transport lock poisoned").insert(
            url,
            Node::Container {
                created_at: Utc::now(),
            },
        );
    }

    /// Add an item without checking that its parent exists.
    pub fn add_item(&self, url: &str, content_type: &str, content: impl Into<Bytes>) {
        let now = Utc::now();
        self.nodes.write().expect("memory transport lock poisoned").insert(
            url.to_string(),
            Node::Item {
                content: content.into(),
                content_type: content_type.to_string(),
                created_at: now,
                modified_at: now,
            },
        );
    }

    /// Make every call on exactly `url` fail with `error`.
    pub fn fail(&self, url: &str, error: TransportError) {
        self.failures
            .write()
            .expect("memory transport lock poisoned")
            .insert(url.to_string(), error);
    }

    /// All calls received so far.
    pub fn calls(&self) -> Vec<TransportCall> {
        self.calls.lock().expect("memory transport lock poisoned").clone()
    }

    /// Whether a container (URL ending in `/`) or item exists.
    pub fn contains(&self, url: &str) -> bool {
        self.nodes
            .read()
            .expect("memory transport lock poisoned")
            .contains_key(url)
    }

    /// The stored content of an item.
    pub fn content(&self, url: &str) -> Option<Bytes> {
        match self.nodes.read().expect("memory transport lock poisoned").get(url) {
            Some(Node::Item { content, .. }) => Some(content.clone()),
            _ => None,
        }
    }

    async fn begin(&self, call: TransportCall, url: &str) -> Result<()> {
        self.calls
            .lock()
            .expect("memory transport lock poisoned")
            .push(call);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        match self
            .failures
            .read()
            .expect("memory transport lock poisoned")
            .get(url)
        {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    /// Look up `url` under its exact shape, answering 301 or 404 otherwise.
    fn entry(&self, nodes: &BTreeMap<String, Node>, url: &str) -> Result<DavEntry> {
        if let Some(node) = nodes.get(url) {
            return Ok(to_entry(url, node, false));
        }
        let other_shape = match url.strip_suffix('/') {
            Some(item) => item.to_string(),
            None => format!("{}/", url),
        };
        if nodes.contains_key(&other_shape) {
            Err(TransportError::status(301, format!("moved to {}", other_shape)))
        } else {
            Err(TransportError::status(404, format!("not found {}", url)))
        }
    }
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

fn container_key(url: &str) -> String {
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{}/", url)
    }
}

/// The container holding `url`, with its trailing `/`.
fn parent_key(url: &str) -> Option<String> {
    let trimmed = url.strip_suffix('/').unwrap_or(url);
    let idx = trimmed.rfind('/')?;
    let parent = &trimmed[..=idx];
    // "http://" is a scheme, not a container.
    if parent.ends_with("//") {
        None
    } else {
        Some(parent.to_string())
    }
}

fn to_entry(url: &str, node: &Node, is_current_directory: bool) -> DavEntry {
    match node {
        Node::Container { created_at } => DavEntry {
            url: url.to_string(),
            is_current_directory,
            content_type: Some(DIRECTORY_CONTENT_TYPE.to_string()),
            content_length: None,
            created_at: Some(*created_at),
            modified_at: Some(*created_at),
        },
        Node::Item {
            content,
            content_type,
            created_at,
            modified_at,
        } => DavEntry {
            url: url.to_string(),
            is_current_directory,
            content_type: Some(content_type.clone()),
            content_length: Some(content.len() as u64),
            created_at: Some(*created_at),
            modified_at: Some(*modified_at),
        },
    }
}

#[async_trait]
impl DavTransport for MemoryTransport {
    async fn list(&self, url: &str) -> Result<Vec<DavEntry>> {
        self.begin(TransportCall::List(url.to_string()), url).await?;
        let nodes = self.nodes.read().expect("memory transport lock poisoned");
        let mut own = self.entry(&nodes, url)?;
        if !url.ends_with('/') {
            return Ok(vec![own]);
        }

        own.is_current_directory = true;
        let mut entries = vec![own];
        for (key, node) in nodes.range(url.to_string()..) {
            let Some(rest) = key.strip_prefix(url) else {
                break;
            };
            let rest = rest.strip_suffix('/').unwrap_or(rest);
            if !rest.is_empty() && !rest.contains('/') {
                entries.push(to_entry(key, node, false));
            }
        }
        Ok(entries)
    }

    async fn fetch_metadata(&self, url: &str) -> Result<DavEntry> {
        self.begin(TransportCall::FetchMetadata(url.to_string()), url)
            .await?;
        let nodes = self.nodes.read().expect("memory transport lock poisoned");
        self.entry(&nodes, url)
    }

    async fn open_read(&self, url: &str) -> Result<ByteStream> {
        self.begin(TransportCall::OpenRead(url.to_string()), url).await?;
        let nodes = self.nodes.read().expect("memory transport lock poisoned");
        match nodes.get(url) {
            Some(Node::Item { content, .. }) => {
                let chunk: Result<Bytes> = Ok(content.clone());
                Ok(Box::pin(futures::stream::iter(vec![chunk])))
            }
            Some(Node::Container { .. }) => Err(TransportError::status(
                405,
                format!("cannot read container {}", url),
            )),
            None => Err(TransportError::status(404, format!("not found {}", url))),
        }
    }

    async fn upload(&self, url: &str, content: ByteStream) -> Result<()> {
        self.begin(TransportCall::Upload(url.to_string()), url).await?;
        let data = content
            .try_fold(Vec::new(), |mut acc, chunk| async move {
                acc.extend_from_slice(&chunk);
                Ok(acc)
            })
            .await?;

        let mut nodes = self.nodes.write().expect("memory transport lock poisoned");
        if url.ends_with('/') || nodes.contains_key(&container_key(url)) {
            return Err(TransportError::status(
                405,
                format!("cannot write to container {}", url),
            ));
        }
        match parent_key(url) {
            Some(parent) if nodes.contains_key(&parent) => {}
            _ => {
                return Err(TransportError::status(
                    409,
                    format!("missing parent container for {}", url),
                ));
            }
        }

        let now = Utc::now();
        let created_at = match nodes.get(url) {
            Some(Node::Item { created_at, .. }) => *created_at,
            _ => now,
        };
        nodes.insert(
            url.to_string(),
            Node::Item {
                content: Bytes::from(data),
                content_type: "application/octet-stream".to_string(),
                created_at,
                modified_at: now,
            },
        );
        Ok(())
    }

    async fn create_container(&self, url: &str) -> Result<()> {
        self.begin(TransportCall::CreateContainer(url.to_string()), url)
            .await?;
        let key = container_key(url);
        let mut nodes = self.nodes.write().expect("memory transport lock poisoned");
        if nodes.contains_key(&key) || nodes.contains_key(key.trim_end_matches('/')) {
            return Err(TransportError::status(405, format!("already exists {}", url)));
        }
        match parent_key(&key) {
            Some(parent) if nodes.contains_key(&parent) => {}
            _ => {
                return Err(TransportError::status(
                    409,
                    format!("missing parent container for {}", url),
                ));
            }
        }
        nodes.insert(
            key,
            Node::Container {
                created_at: Utc::now(),
            },
        );
        Ok(())
    }

    async fn delete(&self, url: &str) -> Result<()> {
        self.begin(TransportCall::Delete(url.to_string()), url).await?;
        let mut nodes = self.nodes.write().expect("memory transport lock poisoned");
        self.entry(&nodes, url)?;
        if url.ends_with('/') {
            nodes.retain(|key, _| !key.starts_with(url));
        } else {
            nodes.remove(url);
        }
        Ok(())
    }
}
