//! Analysis transport port.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;

use crate::domain::errors::TransportError;

/// Raw fragments of the `data: <payload>` event stream. Fragment boundaries
/// carry no meaning; a line may be split across several fragments.
pub type FragmentStream = BoxStream<'static, Result<Bytes, TransportError>>;

/// Opens the event stream for one analysis request.
#[async_trait]
pub trait AnalysisTransport: Send + Sync {
    /// Transport name, for logs.
    fn name(&self) -> &'static str;

    /// Submit `prompt` for analysis and return the response event stream.
    async fn open(&self, prompt: &str) -> Result<FragmentStream, TransportError>;
}

#[async_trait]
impl<T: AnalysisTransport + ?Sized> AnalysisTransport for Box<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    async fn open(&self, prompt: &str) -> Result<FragmentStream, TransportError> {
        (**self).open(prompt).await
    }
}
