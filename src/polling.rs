//! Worker de Telegram
//!
//! Long polling de `getUpdates` y despacho de updates. Cada chat tiene su
//! propia cola: los mensajes de un mismo chat se procesan en orden de
//! llegada y los chats distintos avanzan en paralelo. Un panic al procesar
//! un mensaje se registra y no afecta al loop ni al resto de mensajes.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::clients::{next_offset, TelegramClient};
use crate::controllers::MessageController;
use crate::dto::Update;

const RETRY_DELAY: Duration = Duration::from_secs(5);

/// Tiempo sin mensajes tras el cual la cola de un chat se cierra
const CHAT_IDLE_TIMEOUT: Duration = Duration::from_secs(300);

/// Destino de las respuestas del bot
#[async_trait]
pub trait ReplySender: Send + Sync {
    async fn send_reply(&self, chat_id: i64, text: &str) -> Result<()>;
}

#[async_trait]
impl ReplySender for TelegramClient {
    async fn send_reply(&self, chat_id: i64, text: &str) -> Result<()> {
        self.send_message(chat_id, text).await
    }
}

struct ChatQueue {
    sender: mpsc::UnboundedSender<Update>,
    worker: JoinHandle<()>,
}

/// Reparte updates en colas por chat
#[derive(Clone)]
pub struct UpdateDispatcher {
    controller: MessageController,
    replies: Arc<dyn ReplySender>,
    chats: Arc<Mutex<HashMap<i64, ChatQueue>>>,
}

impl UpdateDispatcher {
    pub fn new(controller: MessageController, replies: Arc<dyn ReplySender>) -> Self {
        Self {
            controller,
            replies,
            chats: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Encola el update en la cola de su chat; no espera a que se procese
    pub async fn dispatch(&self, update: Update) {
        let Some(chat_id) = update.message.as_ref().map(|m| m.chat.id) else {
            debug!("⏭️ Update {} sin mensaje, ignorado", update.update_id);
            return;
        };

        let mut chats = self.chats.lock().await;
        chats.retain(|_, queue| !queue.worker.is_finished());

        let (update, previous) = match chats.remove(&chat_id) {
            Some(queue) => match queue.sender.send(update) {
                Ok(()) => {
                    chats.insert(chat_id, queue);
                    return;
                }
                // la cola se está cerrando: la nueva espera a que termine
                Err(mpsc::error::SendError(update)) => (update, Some(queue.worker)),
            },
            None => (update, None),
        };

        let (sender, receiver) = mpsc::unbounded_channel();
        if sender.send(update).is_err() {
            return;
        }
        let worker = tokio::spawn(run_chat_queue(
            self.controller.clone(),
            self.replies.clone(),
            chat_id,
            receiver,
            previous,
        ));
        chats.insert(chat_id, ChatQueue { sender, worker });
    }
}

async fn run_chat_queue(
    controller: MessageController,
    replies: Arc<dyn ReplySender>,
    chat_id: i64,
    mut receiver: mpsc::UnboundedReceiver<Update>,
    previous: Option<JoinHandle<()>>,
) {
    if let Some(previous) = previous {
        let _ = previous.await;
    }

    loop {
        match tokio::time::timeout(CHAT_IDLE_TIMEOUT, receiver.recv()).await {
            Ok(Some(update)) => process_update(&controller, &replies, update).await,
            Ok(None) => break,
            Err(_) => {
                receiver.close();
                while let Ok(update) = receiver.try_recv() {
                    process_update(&controller, &replies, update).await;
                }
                debug!("💤 Cola del chat {} cerrada por inactividad", chat_id);
                break;
            }
        }
    }
}

/// Procesa un update en su propia task para aislar panics
async fn process_update(controller: &MessageController, replies: &Arc<dyn ReplySender>, update: Update) {
    let update_id = update.update_id;
    let controller = controller.clone();
    let replies = replies.clone();

    let worker = tokio::spawn(async move {
        let Some((chat_id, sender_id, text)) = update.text_message() else {
            return;
        };
        for reply in controller.handle(chat_id, sender_id, text).await {
            if let Err(e) = replies.send_reply(chat_id, &reply).await {
                error!("❌ Error enviando respuesta a {}: {}", chat_id, e);
                break;
            }
        }
    });

    if let Err(e) = worker.await {
        error!("💥 Update {} abortado: {}", update_id, e);
    }
}

/// Loop de long polling; termina solo si se cancela la task
pub async fn run_polling(dispatcher: UpdateDispatcher, telegram: TelegramClient) {
    info!("📡 Polling de Telegram iniciado");
    let mut offset = None;

    loop {
        match telegram.get_updates(offset).await {
            Ok(updates) => {
                offset = next_offset(offset, &updates);
                for update in updates {
                    dispatcher.dispatch(update).await;
                }
            }
            Err(e) => {
                warn!("⚠️ Error en getUpdates, reintentando en {:?}: {}", RETRY_DELAY, e);
                tokio::time::sleep(RETRY_DELAY).await;
            }
        }
    }
}
