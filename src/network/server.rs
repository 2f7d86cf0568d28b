//! TCP Server
//!
//! Accepts connections and dispatches them to worker threads.

use std::collections::HashMap;
use std::io::{ErrorKind, Write};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam::channel::{self, Receiver};
use parking_lot::Mutex;

use super::Connection;
use crate::config::Config;
use crate::dispatch::Dispatcher;
use crate::error::{RespError, Result};

/// How long the acceptor sleeps when no connection is pending
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Sent to clients turned away at the connection limit
const MAX_CLIENTS_REPLY: &[u8] = b"-ERR max number of clients reached\r\n";

/// TCP server for respkv
pub struct Server {
    config: Config,
    dispatcher: Arc<Dispatcher>,
    listener: TcpListener,
    shutdown: AtomicBool,
    /// Connections accepted and not yet finished (queued or being served)
    active: AtomicUsize,
    next_id: AtomicU64,
    /// Clones of live streams so shutdown can unblock their workers
    streams: Mutex<HashMap<u64, TcpStream>>,
}

impl Server {
    /// Bind the listen address. Connections are not accepted until `run`.
    pub fn bind(config: Config, dispatcher: Arc<Dispatcher>) -> Result<Self> {
        config.validate()?;

        let listener = TcpListener::bind(&config.listen_addr).map_err(|e| {
            RespError::Network(format!("failed to bind {}: {}", config.listen_addr, e))
        })?;
        listener.set_nonblocking(true)?;

        Ok(Self {
            config,
            dispatcher,
            listener,
            shutdown: AtomicBool::new(false),
            active: AtomicUsize::new(0),
            next_id: AtomicU64::new(0),
            streams: Mutex::new(HashMap::new()),
        })
    }

    /// Address the listener is bound to
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Number of connections currently accepted
    pub fn active_connections(&self) -> usize {
        self.active.load(Ordering::Acquire)
    }

    /// Start the server (blocking until `shutdown` is called)
    pub fn run(&self) -> Result<()> {
        tracing::info!(
            "Listening on {} with {} workers",
            self.local_addr()?,
            self.config.worker_threads
        );

        let (sender, receiver) = channel::bounded::<(u64, TcpStream)>(self.config.max_connections);

        thread::scope(|scope| {
            for worker_id in 0..self.config.worker_threads {
                let receiver = receiver.clone();
                scope.spawn(move || self.worker_loop(worker_id, receiver));
            }
            drop(receiver);

            while !self.shutdown.load(Ordering::Acquire) {
                match self.listener.accept() {
                    Ok((stream, addr)) => {
                        if self.active.load(Ordering::Acquire) >= self.config.max_connections {
                            tracing::warn!("Rejecting {}: connection limit reached", addr);
                            reject(stream);
                            continue;
                        }

                        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                        match stream.try_clone() {
                            Ok(clone) => {
                                self.streams.lock().insert(id, clone);
                            }
                            Err(e) => {
                                tracing::warn!("Dropping {}: {}", addr, e);
                                continue;
                            }
                        }

                        self.active.fetch_add(1, Ordering::AcqRel);
                        tracing::debug!("Accepted connection {} from {}", id, addr);

                        if sender.send((id, stream)).is_err() {
                            break;
                        }
                    }
                    Err(ref e) if e.kind() == ErrorKind::WouldBlock => {
                        thread::sleep(ACCEPT_POLL_INTERVAL);
                    }
                    Err(e) => {
                        tracing::warn!("Accept failed: {}", e);
                        thread::sleep(ACCEPT_POLL_INTERVAL);
                    }
                }
            }

            // Closing the channel stops workers once the queue drains
            drop(sender);
            self.close_streams();
        });

        tracing::info!("Server stopped");
        Ok(())
    }

    /// Signal the server to shutdown gracefully
    ///
    /// Open connections are shut down so their workers return.
    pub fn shutdown(&self) {
        tracing::info!("Shutdown requested");
        self.shutdown.store(true, Ordering::Release);
        self.close_streams();
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }

    fn worker_loop(&self, worker_id: usize, receiver: Receiver<(u64, TcpStream)>) {
        tracing::trace!("Worker {} started", worker_id);

        for (id, stream) in receiver {
            if !self.is_shutdown() {
                self.serve(stream);
            }
            self.streams.lock().remove(&id);
            self.active.fetch_sub(1, Ordering::AcqRel);
        }

        tracing::trace!("Worker {} stopped", worker_id);
    }

    fn serve(&self, stream: TcpStream) {
        let mut connection = match Connection::new(stream, Arc::clone(&self.dispatcher), &self.config) {
            Ok(connection) => connection,
            Err(e) => {
                tracing::warn!("Failed to set up connection: {}", e);
                return;
            }
        };

        if let Err(e) = connection.handle() {
            tracing::warn!("Connection {} closed with error: {}", connection.peer_addr(), e);
        }
    }

    fn close_streams(&self) {
        for stream in self.streams.lock().values() {
            let _ = stream.shutdown(Shutdown::Both);
        }
    }
}

fn reject(mut stream: TcpStream) {
    let _ = stream.set_nonblocking(false);
    let _ = stream.write_all(MAX_CLIENTS_REPLY);
    let _ = stream.shutdown(Shutdown::Both);
}
