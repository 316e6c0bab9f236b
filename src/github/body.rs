//! Request bodies that report when the transport has finished with them.
//!
//! The first-byte budget starts once the request body has been fully handed
//! to the transport. Every body is sent as a stream wrapped in a
//! [`SendTracker`], which signals on end of stream and, failing that, when the
//! transport drops it.

use super::failure::ExchangeError;
use bytes::Bytes;
use futures_lite::Stream;
use futures_lite::stream;
use std::io;
use std::path::PathBuf;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::oneshot;
use tokio_util::io::ReaderStream;

type ByteStream = Pin<Box<dyn Stream<Item = io::Result<Bytes>> + Send>>;

/// Payload of an outgoing request
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    /// No payload
    #[default]
    Empty,
    /// In-memory payload
    Bytes(Bytes),
    /// Contents of a file, read while sending
    File(PathBuf),
}

/// A body ready for the transport, with its length when known.
pub(crate) struct PreparedBody {
    pub body: reqwest::Body,
    pub content_length: Option<u64>,
    pub sent: oneshot::Receiver<()>,
}

impl RequestBody {
    /// Open the payload and wrap it for sending.
    ///
    /// File bodies are opened here so a missing or unreadable artifact fails
    /// before any connection is made.
    pub(crate) async fn prepare(self) -> Result<PreparedBody, ExchangeError> {
        let (stream, content_length): (ByteStream, Option<u64>) = match self {
            RequestBody::Empty => (Box::pin(stream::empty::<io::Result<Bytes>>()), None),
            RequestBody::Bytes(bytes) => {
                let length = bytes.len() as u64;
                (Box::pin(stream::once(Ok::<_, io::Error>(bytes))), Some(length))
            }
            RequestBody::File(path) => {
                let artifact = |source| ExchangeError::Artifact {
                    path: path.clone(),
                    source,
                };
                let file = tokio::fs::File::open(&path).await.map_err(artifact)?;
                let length = file.metadata().await.map_err(artifact)?.len();
                (Box::pin(ReaderStream::new(file)), Some(length))
            }
        };

        let (tracker, sent) = SendTracker::new(stream);
        Ok(PreparedBody {
            body: reqwest::Body::wrap_stream(tracker),
            content_length,
            sent,
        })
    }
}

/// Stream adapter resolving its receiver once the inner stream is exhausted
/// or the adapter is dropped.
struct SendTracker {
    inner: ByteStream,
    sent: Option<oneshot::Sender<()>>,
}

impl SendTracker {
    fn new(inner: ByteStream) -> (Self, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                inner,
                sent: Some(tx),
            },
            rx,
        )
    }
}

impl Stream for SendTracker {
    type Item = io::Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let poll = self.inner.as_mut().poll_next(cx);
        if let Poll::Ready(None) = poll {
            if let Some(sent) = self.sent.take() {
                let _ = sent.send(());
            }
        }
        poll
    }
}
