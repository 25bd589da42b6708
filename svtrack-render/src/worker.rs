//! Background geometry builds.
//!
//! Heavy frames are built off the UI thread: the host submits a request
//! snapshot over a bounded channel and polls for responses. Responses carry
//! the originating request id so the host can drop results that a newer
//! viewport has already superseded.

use anyhow::{anyhow, Context, Result};
use crossbeam::channel::{bounded, Receiver, Sender, TryRecvError};
use std::thread::JoinHandle;

use crate::arena::GeometryArena;
use crate::geometry::{build_geometry, GeometryBatch, LinearScale, RenderOptions};
use svtrack_core::{AbsSpan, Segment};

/// Snapshot of everything one build needs; owns its segment copy so the
/// track can keep mutating its working set.
#[derive(Debug, Clone)]
pub struct GeometryRequest {
    pub request_id: u64,
    pub visible: AbsSpan,
    pub scale: LinearScale,
    pub options: RenderOptions,
    pub segments: Vec<Segment>,
}

#[derive(Debug)]
pub struct GeometryResponse {
    pub request_id: u64,
    pub batch: GeometryBatch,
}

/// Dedicated geometry-build thread with bounded request/response queues.
pub struct GeometryWorker {
    request_tx: Option<Sender<GeometryRequest>>,
    response_rx: Option<Receiver<GeometryResponse>>,
    handle: Option<JoinHandle<()>>,
}

impl GeometryWorker {
    /// Spawn the worker. `queue_depth` bounds both queues; a full request
    /// queue makes `submit` fail rather than buffer stale frames.
    pub fn spawn(queue_depth: usize) -> Result<Self> {
        let (request_tx, request_rx) = bounded::<GeometryRequest>(queue_depth);
        let (response_tx, response_rx) = bounded::<GeometryResponse>(queue_depth);

        let handle = std::thread::Builder::new()
            .name("svtrack-geometry".to_string())
            .spawn(move || {
                // The worker keeps one arena for its whole lifetime.
                let mut arena = GeometryArena::new();
                for request in request_rx.iter() {
                    let batch = build_geometry(
                        &request.segments,
                        &request.visible,
                        &request.scale,
                        &request.options,
                        &mut arena,
                    );
                    let response = GeometryResponse {
                        request_id: request.request_id,
                        batch,
                    };
                    // Receiver gone: the owner is shutting down.
                    if response_tx.send(response).is_err() {
                        break;
                    }
                }
            })
            .context("failed to spawn geometry worker thread")?;

        Ok(Self {
            request_tx: Some(request_tx),
            response_rx: Some(response_rx),
            handle: Some(handle),
        })
    }

    /// Queue one build; fails when the queue is full or the worker has
    /// stopped.
    pub fn submit(&self, request: GeometryRequest) -> Result<()> {
        let tx = self
            .request_tx
            .as_ref()
            .ok_or_else(|| anyhow!("geometry worker already shut down"))?;
        tx.try_send(request)
            .map_err(|e| anyhow!("geometry request dropped: {e}"))
    }

    /// Non-blocking poll for a finished build.
    pub fn try_recv(&self) -> Option<GeometryResponse> {
        match self.response_rx.as_ref()?.try_recv() {
            Ok(response) => Some(response),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Blocking receive, for tests and synchronous hosts.
    pub fn recv(&self) -> Result<GeometryResponse> {
        self.response_rx
            .as_ref()
            .ok_or_else(|| anyhow!("geometry worker already shut down"))?
            .recv()
            .context("geometry worker stopped before responding")
    }
}

impl Drop for GeometryWorker {
    fn drop(&mut self) {
        // Closing the request channel ends the worker loop. The response
        // receiver must go too, or a worker blocked sending an unread
        // response into a full queue would never observe the shutdown and
        // the join below would wait forever.
        self.request_tx.take();
        self.response_rx.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!("geometry worker thread panicked");
            }
        }
    }
}

/// Monotonic request ids plus the stale-response filter.
#[derive(Debug, Default)]
pub struct RequestTracker {
    next_id: u64,
    latest_issued: u64,
    latest_accepted: u64,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id for the next request; every issue supersedes all earlier ones.
    pub fn issue(&mut self) -> u64 {
        self.next_id += 1;
        self.latest_issued = self.next_id;
        self.next_id
    }

    /// True when a response is current and newer than anything accepted so
    /// far; stale responses are discarded.
    pub fn accept(&mut self, request_id: u64) -> bool {
        if request_id == self.latest_issued && request_id > self.latest_accepted {
            self.latest_accepted = request_id;
            true
        } else {
            log::debug!("discarding stale geometry response {request_id}");
            false
        }
    }
}
