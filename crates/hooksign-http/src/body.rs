//! Response body: the exact signed bytes, sent as one frame.

use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use http_body::{Frame, SizeHint};

/// Body of every webhook response.
///
/// Holds the complete payload up front, so the bytes on the wire are the bytes
/// that were signed. An empty payload yields no frames at all.
#[derive(Debug, Default)]
pub struct HookResponseBody {
    data: Option<Bytes>,
}

impl HookResponseBody {
    /// Create a response body from raw bytes.
    #[must_use]
    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        let data: Bytes = data.into();
        Self {
            data: (!data.is_empty()).then_some(data),
        }
    }

    /// Create an empty response body.
    #[must_use]
    pub fn empty() -> Self {
        Self { data: None }
    }
}

impl http_body::Body for HookResponseBody {
    type Data = Bytes;
    type Error = std::convert::Infallible;

    fn poll_frame(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        Poll::Ready(self.get_mut().data.take().map(|data| Ok(Frame::data(data))))
    }

    fn is_end_stream(&self) -> bool {
        self.data.is_none()
    }

    fn size_hint(&self) -> SizeHint {
        SizeHint::with_exact(self.data.as_ref().map_or(0, |data| data.len() as u64))
    }
}
