// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::model::{Model, PredictResponse};
use az_utils::config;
use az_utils::error::SearchError;
use az_utils::types::f16;
use crossbeam_channel::{Receiver, Select, Sender, TryRecvError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;

type PredictReply = Result<PredictResponse, SearchError>;

struct Slot {
    request_rx: Receiver<Vec<f16>>,
    reply_tx: Sender<PredictReply>,
}

/// A client's end of a broker connection. Each handle has its own request
/// and reply channel; replies on a single handle always arrive in the
/// order requests were sent on it.
pub struct ClientHandle {
    request_tx: Sender<Vec<f16>>,
    reply_rx: Receiver<PredictReply>,
}

impl ClientHandle {
    /// Sends `tensor` to the broker and blocks for its reply.
    pub fn predict(&self, tensor: Vec<f16>) -> PredictReply {
        self.request_tx
            .send(tensor)
            .map_err(|_| SearchError::BrokerClosed)?;

        self.reply_rx.recv().map_err(|_| SearchError::BrokerClosed)?
    }
}

/// A pending registration: a newly minted client channel pair, handed from
/// `client_handle` to the acceptor thread.
struct Registration {
    request_rx: Receiver<Vec<f16>>,
    reply_tx: Sender<PredictReply>,
}

/// Batches concurrent `predict` requests from many client handles onto a
/// single `Model`. Owns two threads: an acceptor that admits new client
/// registrations, and a predictor that drains pending requests and invokes
/// the model once per non-empty drain cycle.
pub struct Broker {
    model: Arc<Mutex<Box<dyn Model>>>,
    slots: Arc<Mutex<Vec<Option<Slot>>>>,
    register_tx: Sender<Registration>,
    register_rx: Option<Receiver<Registration>>,
    running: Arc<AtomicBool>,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Broker {
    pub fn new(model: Box<dyn Model>) -> Self {
        let (register_tx, register_rx) = crossbeam_channel::unbounded();

        Self {
            model: Arc::new(Mutex::new(model)),
            slots: Arc::new(Mutex::new(Vec::new())),
            register_tx,
            register_rx: Some(register_rx),
            running: Arc::new(AtomicBool::new(false)),
            handles: Mutex::new(Vec::new()),
        }
    }

    /// Registers a new client connection and returns its handle. Safe to
    /// call from any thread, including while the broker is running.
    pub fn client_handle(&self) -> ClientHandle {
        let (request_tx, request_rx) = crossbeam_channel::unbounded();
        let (reply_tx, reply_rx) = crossbeam_channel::unbounded();

        // best effort: if the acceptor has shut down, the registration is
        // simply dropped and the resulting handle will see `BrokerClosed`
        // on its first request.
        let _ = self.register_tx.send(Registration { request_rx, reply_tx });

        ClientHandle { request_tx, reply_rx }
    }

    /// Starts the acceptor and predictor threads. Idempotent: calling
    /// `start` while already running has no effect.
    pub fn start(&mut self) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }

        let register_rx = match self.register_rx.take() {
            Some(rx) => rx,
            None => {
                // start() after a previous stop(): re-create the
                // registration channel so new client_handle() calls work.
                let (tx, rx) = crossbeam_channel::unbounded();
                self.register_tx = tx;
                rx
            }
        };

        let mut handles = self.handles.lock().unwrap();

        handles.push(spawn_acceptor(
            Arc::clone(&self.slots),
            register_rx,
            Arc::clone(&self.running),
        ));
        handles.push(spawn_predictor(
            Arc::clone(&self.slots),
            Arc::clone(&self.model),
            Arc::clone(&self.running),
        ));
    }

    /// Stops both threads and drops all client connections. `start` may be
    /// called again afterward.
    pub fn stop(&mut self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }

        let mut handles = self.handles.lock().unwrap();
        for handle in handles.drain(..) {
            let _ = handle.join();
        }

        self.slots.lock().unwrap().clear();
    }

    /// Replaces the model instance. Only safe to call while stopped.
    pub fn reload_model(&self, model: Box<dyn Model>) {
        *self.model.lock().unwrap() = model;
    }
}

impl Drop for Broker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn spawn_acceptor(
    slots: Arc<Mutex<Vec<Option<Slot>>>>,
    register_rx: Receiver<Registration>,
    running: Arc<AtomicBool>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        while running.load(Ordering::SeqCst) {
            match register_rx.recv_timeout(Duration::from_millis(4)) {
                Ok(registration) => {
                    slots.lock().unwrap().push(Some(Slot {
                        request_rx: registration.request_rx,
                        reply_tx: registration.reply_tx,
                    }));
                }
                Err(crossbeam_channel::RecvTimeoutError::Timeout) => {}
                Err(crossbeam_channel::RecvTimeoutError::Disconnected) => break,
            }
        }
    })
}

fn spawn_predictor(
    slots: Arc<Mutex<Vec<Option<Slot>>>>,
    model: Arc<Mutex<Box<dyn Model>>>,
    running: Arc<AtomicBool>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        while running.load(Ordering::SeqCst) {
            let mut guard = slots.lock().unwrap();

            if guard.is_empty() || guard.iter().all(Option::is_none) {
                drop(guard);
                thread::sleep(Duration::from_millis(1));
                continue;
            }

            let mut sel = Select::new();
            for slot in guard.iter() {
                if let Some(slot) = slot {
                    sel.recv(&slot.request_rx);
                }
            }
            let has_ready = sel.ready_timeout(Duration::from_millis(1)).is_ok();
            drop(sel);

            if !has_ready {
                drop(guard);
                continue;
            }

            let mut requests: Vec<(usize, Vec<f16>)> = Vec::new();

            for (index, slot) in guard.iter_mut().enumerate() {
                let mut close = false;

                if let Some(s) = slot {
                    loop {
                        match s.request_rx.try_recv() {
                            Ok(tensor) => requests.push((index, tensor)),
                            Err(TryRecvError::Empty) => break,
                            Err(TryRecvError::Disconnected) => {
                                eprintln!("broker: client on slot {} disconnected", index);
                                close = true;
                                break;
                            }
                        }
                    }
                }

                if close {
                    *slot = None;
                }
            }

            if requests.is_empty() {
                continue;
            }

            let max_batch = (*config::BATCH_SIZE).max(1);

            for chunk in requests.chunks(max_batch) {
                let batch: Vec<Vec<f16>> = chunk.iter().map(|(_, tensor)| tensor.clone()).collect();
                let outcome = model.lock().unwrap().predict(&batch);

                match outcome {
                    Ok(responses) => {
                        for ((index, _), response) in chunk.iter().zip(responses.into_iter()) {
                            if let Some(slot) = &guard[*index] {
                                let _ = slot.reply_tx.send(Ok(response));
                            }
                        }
                    }
                    Err(err) => {
                        for (index, _) in chunk {
                            if let Some(slot) = &guard[*index] {
                                let _ = slot.reply_tx.send(Err(err.clone()));
                            }
                        }
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration as StdDuration;

    struct EchoModel;

    impl Model for EchoModel {
        fn predict(&self, batch: &[Vec<f16>]) -> Result<Vec<PredictResponse>, SearchError> {
            Ok(batch
                .iter()
                .map(|tensor| PredictResponse::new(vec![1.0 / tensor.len().max(1) as f32; tensor.len().max(1)], 0.0))
                .collect())
        }
    }

    #[test]
    fn single_client_round_trip() {
        let mut broker = Broker::new(Box::new(EchoModel));
        broker.start();

        let client = broker.client_handle();
        let response = client.predict(vec![f16::from_f32(1.0); 4]).unwrap();

        assert_eq!(response.value(), 0.0);
        broker.stop();
    }

    #[test]
    fn per_channel_replies_are_fifo() {
        let mut broker = Broker::new(Box::new(EchoModel));
        broker.start();

        let client = broker.client_handle();

        for i in 0..20 {
            let tensor = vec![f16::from_f32(i as f32); (i % 5) + 1];
            let response = client.predict(tensor.clone()).unwrap();
            assert_eq!(response.policy().len(), tensor.len());
        }

        broker.stop();
    }

    #[test]
    fn broken_client_does_not_affect_others() {
        let mut broker = Broker::new(Box::new(EchoModel));
        broker.start();

        let doomed = broker.client_handle();
        let survivor = broker.client_handle();

        drop(doomed);
        thread::sleep(StdDuration::from_millis(20));

        let response = survivor.predict(vec![f16::from_f32(0.0); 2]);
        assert!(response.is_ok());

        broker.stop();
    }
}
