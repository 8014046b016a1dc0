use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, error, info};
use uuid::Uuid;

/// Domain events emitted by the workflow engine. Consumed in-process by
/// [`process_events`]; side effects triggered by events must tolerate
/// the channel being full or closed (emission is best-effort).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Purchase requisition events
    PrCreated(Uuid),
    PrUpdated(Uuid),
    PrSubmitted(Uuid),
    PrApproved {
        pr_id: Uuid,
        approver_id: Uuid,
    },
    PrRejected {
        pr_id: Uuid,
        approver_id: Uuid,
    },

    // Purchase order events
    PoCreated {
        po_id: Uuid,
        pr_id: Uuid,
    },
    PoDeliveryUpdated {
        po_id: Uuid,
        delivered_quantity: i32,
        total_quantity: i32,
    },
    PoClosed(Uuid),
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {e}"))
    }
}

/// Consumes events from the channel until it closes. Spawned once at
/// startup; currently logs each event, and is the hook point for
/// webhook or queue fan-out.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    info!("Event processor started");
    while let Some(event) = receiver.recv().await {
        match &event {
            Event::PrApproved { pr_id, approver_id } => {
                info!(pr_id = %pr_id, approver_id = %approver_id, "PR approved");
            }
            Event::PrRejected { pr_id, approver_id } => {
                info!(pr_id = %pr_id, approver_id = %approver_id, "PR rejected");
            }
            Event::PoDeliveryUpdated {
                po_id,
                delivered_quantity,
                total_quantity,
            } => {
                info!(
                    po_id = %po_id,
                    delivered = delivered_quantity,
                    total = total_quantity,
                    "PO delivery updated"
                );
            }
            other => debug!(event = ?other, "domain event"),
        }
    }
    error!("Event channel closed; processor exiting");
}
