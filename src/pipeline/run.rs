//! The asynchronous generation run
//!
//! One run per admitted request: API call, download, relay hand-off,
//! bounded delivery, terminal cleanup. Every failure is converted to a
//! single message for the actor at this boundary; nothing escapes a run
//! without the cleanup step having run. The downloaded file and the dedup
//! slot are both released exactly once per run, whatever the exit path.

use crate::dedup::TaskSlot;
use crate::delivery::VideoDelivery;
use crate::error::{Error, Result};
use crate::storage::DownloadedAsset;
use crate::types::{Event, GenerationRequest, TaskId};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use super::VideoPipeline;

/// Bounded wait for the delivery collaborator's send
///
/// Elapsing is a warning, not a failure: the transport may still complete
/// the transfer out-of-band, and the wait does not cancel the send.
pub(super) const DELIVERY_TIMEOUT: Duration = Duration::from_secs(90);

const MSG_SENDING: &str = "Sending the video file...";
const MSG_DELIVERED: &str = "Video delivered.";
const MSG_DELIVERY_TIMED_OUT: &str =
    "Video send timed out; the transfer may still be completing.";

/// How the delivering step ended
enum DeliveryOutcome {
    Sent,
    TimedOut,
}

impl VideoPipeline {
    /// Drive one generation run to its terminal state
    ///
    /// Spawned by the command handler after admission; consumes the dedup
    /// slot so the actor is freed exactly when the run terminates.
    pub(super) async fn run_generation(
        self,
        request: GenerationRequest,
        slot: TaskSlot,
        delivery: Arc<dyn VideoDelivery>,
    ) {
        let task = slot.id();
        info!(actor = %request.actor_id, task = %task, "generation run started");
        self.publish(Event::RunStarted {
            actor: request.actor_id.clone(),
            task,
        });

        // The asset lands here as soon as it exists so the terminal cleanup
        // sees it no matter where execute() bails out.
        let mut asset_slot: Option<DownloadedAsset> = None;
        let outcome = self
            .execute(&request, task, &mut asset_slot, delivery.as_ref())
            .await;

        match outcome {
            Ok(DeliveryOutcome::Sent) => {
                info!(actor = %request.actor_id, task = %task, "generation run finished");
            }
            Ok(DeliveryOutcome::TimedOut) => {
                info!(actor = %request.actor_id, task = %task, "generation run finished with delivery still in flight");
            }
            Err(e) => {
                let text = user_message(&e);
                error!(actor = %request.actor_id, task = %task, error = %e, "generation run failed");
                self.publish(Event::RunFailed {
                    task,
                    error: text.clone(),
                });
                delivery
                    .send_text(&format!("Video generation failed: {text}"))
                    .await
                    .ok();
            }
        }

        if let Some(asset) = asset_slot.take() {
            self.store.cleanup(asset).await;
        }
        drop(slot);
        self.publish(Event::RunCleaned { task });
    }

    /// The fallible middle of the run, from API call to delivery
    async fn execute(
        &self,
        request: &GenerationRequest,
        task: TaskId,
        asset_slot: &mut Option<DownloadedAsset>,
        delivery: &dyn VideoDelivery,
    ) -> Result<DeliveryOutcome> {
        let video_url = self
            .client
            .generate(&request.prompt, &request.image)
            .await?;
        self.publish(Event::UrlExtracted {
            task,
            video_url: video_url.clone(),
        });

        let asset = self.store.download(&video_url).await?;
        self.publish(Event::AssetDownloaded {
            task,
            path: asset.path().to_path_buf(),
        });
        let asset = asset_slot.insert(asset);

        delivery.send_text(MSG_SENDING).await?;
        let delivery_path = self.store.prepare_for_delivery(asset).await;

        match tokio::time::timeout(self.delivery_timeout, delivery.send_video(&delivery_path)).await
        {
            Ok(Ok(())) => {
                info!(task = %task, path = %delivery_path.display(), "video delivered");
                self.publish(Event::Delivered { task });
                delivery.send_text(MSG_DELIVERED).await.ok();
                Ok(DeliveryOutcome::Sent)
            }
            Ok(Err(Error::Delivery(text))) => Err(Error::Delivery(text)),
            Ok(Err(e)) => Err(Error::Delivery(e.to_string())),
            Err(_) => {
                warn!(task = %task, "delivery wait elapsed; transfer may still complete");
                self.publish(Event::DeliveryTimedOut { task });
                delivery.send_text(MSG_DELIVERY_TIMED_OUT).await.ok();
                Ok(DeliveryOutcome::TimedOut)
            }
        }
    }
}

/// Map a run failure to the single message the actor sees
///
/// API errors are surfaced verbatim; download failures collapse to a fixed
/// text since their detail only helps operators, who get it from the log.
fn user_message(error: &Error) -> String {
    match error {
        Error::Download(_) => "the video could not be saved locally".to_string(),
        other => other.to_string(),
    }
}
