use crate::domain::ports::PresentationSurface;
use async_trait::async_trait;
use tracing::info;

/// `PresentationSurface` for headless runs: the dismiss signal only reaches
/// the log. The real hosted-checkout view lives in the UI layer, which
/// supplies its own implementation.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingSurface;

#[async_trait]
impl PresentationSurface for LoggingSurface {
    async fn dismiss_checkout(&self) {
        info!("dismissing hosted checkout surface");
    }
}
