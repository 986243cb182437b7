//! Generation orchestration pipeline
//!
//! The `VideoPipeline` struct and its methods are organized by concern:
//! - [`commands`] - Inbound command surface (generate / diagnostics / help)
//! - [`run`] - The asynchronous generation run and its state machine
//!
//! The command handler performs admission, dedup acquisition, and the image
//! precondition synchronously, then spawns the run as an independent task;
//! it never blocks on generation itself.

mod commands;
mod run;


pub use commands::Command;

use crate::admission::AdmissionControl;
use crate::client::GenerationClient;
use crate::config::Config;
use crate::dedup::TaskRegistry;
use crate::delivery::VideoDelivery;
use crate::error::{Error, Result};
use crate::relay::{FileRelay, NoopRelay};
use crate::storage::VideoStore;
use crate::types::{Event, GenerationRequest, InboundMessage, TaskId};
use std::sync::Arc;
use tracing::info;

/// Main pipeline instance (cloneable - all fields are Arc-wrapped)
///
/// One per process. Owns the admission windows, the dedup registry, and the
/// video store; every accepted request runs as an independent task against
/// these shared services.
#[derive(Clone)]
pub struct VideoPipeline {
    config: Arc<Config>,
    client: GenerationClient,
    admission: AdmissionControl,
    tasks: TaskRegistry,
    store: Arc<VideoStore>,
    event_tx: tokio::sync::broadcast::Sender<Event>,
    delivery_timeout: std::time::Duration,
}

impl VideoPipeline {
    /// Create a pipeline without a file relay
    ///
    /// Creates the storage directory and the HTTP clients. Use this when the
    /// host and the delivery process share a filesystem.
    pub async fn new(config: Config) -> Result<Self> {
        Self::with_relay(config, Arc::new(NoopRelay)).await
    }

    /// Create a pipeline with a file relay collaborator
    pub async fn with_relay(config: Config, relay: Arc<dyn FileRelay>) -> Result<Self> {
        let client = GenerationClient::new(config.api.clone())?;
        let admission = AdmissionControl::new(config.admission.clone());
        let store = VideoStore::new(&config.storage, config.relay.clone(), relay).await?;

        // Multiple subscribers receive all run events independently
        let (event_tx, _rx) = tokio::sync::broadcast::channel(1000);

        info!(api_url = %config.api.api_url(), storage = %config.storage.storage_dir.display(), "video pipeline initialized");

        Ok(Self {
            config: Arc::new(config),
            client,
            admission,
            tasks: TaskRegistry::new(),
            store: Arc::new(store),
            event_tx,
            delivery_timeout: run::DELIVERY_TIMEOUT,
        })
    }

    /// Subscribe to run lifecycle events
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Handle one inbound command
    ///
    /// Progress and rejection messages go to the actor through `delivery`;
    /// the returned value reports whether a generation run was spawned
    /// (`Some(task_id)`) or the command completed inline (`None`). Errors
    /// are only the delivery channel's own failures — every pipeline
    /// failure is converted to a message for the actor instead.
    pub async fn handle_command(
        &self,
        message: &InboundMessage,
        command: Command,
        delivery: Arc<dyn VideoDelivery>,
    ) -> Result<Option<TaskId>> {
        match command {
            Command::Generate { prompt } => self.handle_generate(message, prompt, delivery).await,
            Command::Diagnostics => {
                let authorized = self
                    .config
                    .admission
                    .authorized_actors
                    .contains(message.actor_id.as_str());
                if authorized {
                    delivery.send_text(&self.diagnostics_report()).await?;
                } else {
                    delivery.send_text(commands::MSG_DIAGNOSTICS_RESTRICTED).await?;
                }
                Ok(None)
            }
            Command::Help => {
                delivery.send_text(commands::HELP_TEXT).await?;
                Ok(None)
            }
        }
    }

    /// Admission, dedup, image precondition, then spawn the run
    async fn handle_generate(
        &self,
        message: &InboundMessage,
        prompt: String,
        delivery: Arc<dyn VideoDelivery>,
    ) -> Result<Option<TaskId>> {
        if !self.config.api.enabled {
            delivery.send_text(&Error::Disabled.to_string()).await?;
            return Ok(None);
        }

        if let Err(denied) = self.admission.check(message.group_id.as_ref()) {
            delivery
                .send_text(&Error::Admission(denied).to_string())
                .await?;
            return Ok(None);
        }

        let Some(slot) = self.tasks.begin(&message.actor_id) else {
            delivery
                .send_text(&Error::DuplicateInFlight.to_string())
                .await?;
            return Ok(None);
        };

        let Some(image) = message.first_image() else {
            // The slot guard drops here and frees the actor again
            delivery.send_text(&Error::NoImage.to_string()).await?;
            return Ok(None);
        };

        let task = slot.id();
        let request = GenerationRequest {
            actor_id: message.actor_id.clone(),
            group_id: message.group_id.clone(),
            prompt,
            image: image.clone(),
        };

        delivery.send_text(&commands::ack_message(task)).await?;

        let pipeline = self.clone();
        tokio::spawn(async move {
            pipeline.run_generation(request, slot, delivery).await;
        });

        Ok(Some(task))
    }

    pub(crate) fn publish(&self, event: Event) {
        self.event_tx.send(event).ok();
    }
}
