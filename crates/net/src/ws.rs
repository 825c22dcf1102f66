use cardroom_core::{Transport, TransportError, TransportEvent};
use futures_util::{SinkExt, StreamExt};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};
use url::Url;

const SHUTDOWN_POLL: Duration = Duration::from_millis(10);

enum Outbound {
    Text(String),
    Close,
}

/// Runs the socket on its own thread and reports back through a channel, so
/// the session itself stays single-threaded. One instance per connection
/// attempt.
pub struct WsTransport {
    url: Url,
    events: Sender<TransportEvent>,
    outbound: Option<UnboundedSender<Outbound>>,
    worker: Option<JoinHandle<()>>,
}

impl WsTransport {
    pub fn new(url: Url) -> (Self, Receiver<TransportEvent>) {
        let (events, receiver) = mpsc::channel();
        let transport = Self {
            url,
            events,
            outbound: None,
            worker: None,
        };
        (transport, receiver)
    }

    /// Closes the socket and waits up to `grace` for the worker to flush
    /// queued frames. Returns false if it was still running and got detached.
    pub fn shutdown(&mut self, grace: Duration) -> bool {
        self.close();
        let Some(worker) = self.worker.take() else {
            return true;
        };
        let deadline = Instant::now() + grace;
        while !worker.is_finished() {
            if Instant::now() >= deadline {
                debug!("socket worker still running; detached");
                return false;
            }
            thread::sleep(SHUTDOWN_POLL);
        }
        if worker.join().is_err() {
            warn!("socket worker panicked");
        }
        true
    }
}

impl Transport for WsTransport {
    fn open(&mut self) -> Result<(), TransportError> {
        if self.outbound.is_some() {
            return Err(TransportError::AlreadyOpen);
        }
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|err| TransportError::Failed(err.to_string()))?;
        let (sender, receiver) = unbounded_channel();
        let url = self.url.clone();
        let events = self.events.clone();
        let worker = thread::Builder::new()
            .name("cardroom-ws".to_string())
            .spawn(move || runtime.block_on(pump(url, receiver, events)))
            .map_err(|err| TransportError::Failed(err.to_string()))?;
        self.outbound = Some(sender);
        self.worker = Some(worker);
        Ok(())
    }

    fn send(&mut self, text: String) -> Result<(), TransportError> {
        let Some(sender) = self.outbound.as_ref() else {
            return Err(TransportError::NotOpen);
        };
        sender
            .send(Outbound::Text(text))
            .map_err(|_| TransportError::Closed)
    }

    fn close(&mut self) {
        if let Some(sender) = self.outbound.take() {
            // The worker may already be gone after a remote close.
            let _ = sender.send(Outbound::Close);
        }
    }
}

impl Drop for WsTransport {
    fn drop(&mut self) {
        self.close();
    }
}

async fn pump(
    url: Url,
    mut outbound: UnboundedReceiver<Outbound>,
    events: Sender<TransportEvent>,
) {
    let stream = match connect_async(url.as_str()).await {
        Ok((stream, _response)) => stream,
        Err(err) => {
            warn!(%url, error = %err, "socket connect failed");
            let _ = events.send(TransportEvent::Closed {
                reason: Some(err.to_string()),
            });
            return;
        }
    };
    info!(%url, "socket open");
    if events.send(TransportEvent::Opened).is_err() {
        return;
    }
    let (mut sink, mut source) = stream.split();
    let reason = loop {
        tokio::select! {
            command = outbound.recv() => match command {
                Some(Outbound::Text(text)) => {
                    if let Err(err) = sink.send(Message::Text(text)).await {
                        break Some(err.to_string());
                    }
                }
                Some(Outbound::Close) | None => {
                    if let Err(err) = sink.send(Message::Close(None)).await {
                        debug!(error = %err, "close frame not sent");
                    }
                    break None;
                }
            },
            frame = source.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    if events.send(TransportEvent::Message(text)).is_err() {
                        break None;
                    }
                }
                Some(Ok(Message::Close(frame))) => {
                    break frame.map(|frame| frame.reason.to_string());
                }
                Some(Ok(_)) => {}
                Some(Err(err)) => break Some(err.to_string()),
                None => break None,
            },
        }
    };
    info!(%url, reason = reason.as_deref().unwrap_or("-"), "socket closed");
    let _ = events.send(TransportEvent::Closed { reason });
}
