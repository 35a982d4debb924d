//! Background CPU blur for the software strategy.
//!
//! At most one job is in flight per effect. A request made while a job runs replaces any earlier
//! waiting request and starts when the running job reports back, so the effect shows a stale
//! frame instead of building a queue. Results cross back to the render thread over a channel and
//! are only applied by [`SoftwareBlur::poll`] when their generation is still current.

use std::collections::VecDeque;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{Receiver, Sender, channel};
use std::sync::{Arc, Mutex, PoisonError};

use crate::compile::graph::FilterGraphNode;
use crate::foundation::error::{HazeError, HazeResult};
use crate::render::backend::{PixelBuffer, RedrawRequester};
use crate::render::cpu::{CpuContext, evaluate};
use crate::render::registry::NoiseTexture;

/// Unit of background work.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Where software blur jobs run.
pub trait JobSpawner: Send + Sync {
    /// Run `job` off the render thread.
    fn spawn(&self, job: Job);
}

/// Runs jobs on a rayon pool.
#[derive(Clone, Debug, Default)]
pub struct RayonSpawner {
    pool: Option<Arc<rayon::ThreadPool>>,
}

impl RayonSpawner {
    /// Use rayon's global pool.
    pub fn global() -> Self {
        Self { pool: None }
    }

    /// Dedicated pool with `threads` workers, or rayon's default count.
    pub fn with_threads(threads: Option<usize>) -> HazeResult<Self> {
        let mut builder = rayon::ThreadPoolBuilder::new().thread_name(|i| format!("haze-blur-{i}"));
        if let Some(n) = threads {
            builder = builder.num_threads(n);
        }
        let pool = builder
            .build()
            .map_err(|e| HazeError::job(format!("failed to build rayon thread pool: {e}")))?;
        Ok(Self {
            pool: Some(Arc::new(pool)),
        })
    }
}

impl JobSpawner for RayonSpawner {
    fn spawn(&self, job: Job) {
        match &self.pool {
            Some(pool) => pool.spawn(job),
            None => rayon::spawn(job),
        }
    }
}

/// Holds jobs until [`QueueSpawner::run_all`] is called. For deterministic tests and hosts that
/// drive their own executors.
#[derive(Default)]
pub struct QueueSpawner {
    queue: Mutex<VecDeque<Job>>,
}

impl QueueSpawner {
    /// Empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of queued jobs.
    pub fn pending(&self) -> usize {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Run every queued job on the calling thread. Returns how many ran.
    pub fn run_all(&self) -> usize {
        let mut ran = 0;
        loop {
            let next = self
                .queue
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .pop_front();
            let Some(job) = next else {
                return ran;
            };
            job();
            ran += 1;
        }
    }
}

impl std::fmt::Debug for QueueSpawner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueSpawner")
            .field("pending", &self.pending())
            .finish()
    }
}

impl JobSpawner for QueueSpawner {
    fn spawn(&self, job: Job) {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(job);
    }
}

/// Pixels and graph for one software blur.
#[derive(Clone, Debug)]
pub struct SoftwareRequest {
    /// Read-back content in offscreen pixels.
    pub source: PixelBuffer,
    /// Graph to evaluate over `source`.
    pub graph: FilterGraphNode,
    /// Noise tile for noise stages.
    pub noise: Option<Arc<NoiseTexture>>,
}

/// Job counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SoftwareStats {
    /// Jobs handed to the spawner.
    pub started: u64,
    /// Requests that replaced a waiting request or waited behind a running job.
    pub coalesced: u64,
    /// Results dropped because they were no longer current.
    pub discarded: u64,
    /// Jobs that returned an error or panicked.
    pub failed: u64,
    /// Results applied.
    pub completed: u64,
}

/// Identity of a submitted job.
#[derive(Clone, Debug)]
pub struct JobTicket {
    generation: u64,
    current: Arc<AtomicU64>,
    cancelled: Arc<AtomicBool>,
}

impl JobTicket {
    /// Return `true` while the job's result would still be applied.
    pub fn is_current(&self) -> bool {
        !self.cancelled.load(Ordering::Acquire)
            && self.current.load(Ordering::Acquire) == self.generation
    }
}

struct InFlight {
    generation: u64,
    cancelled: Arc<AtomicBool>,
}

struct JobMessage {
    generation: u64,
    result: HazeResult<PixelBuffer>,
}

/// Software blur job runner owned by one effect.
pub struct SoftwareBlur {
    spawner: Arc<dyn JobSpawner>,
    redraw: Arc<dyn RedrawRequester>,
    max_radius_px: f32,
    current: Arc<AtomicU64>,
    in_flight: Option<InFlight>,
    waiting: Option<SoftwareRequest>,
    tx: Sender<JobMessage>,
    rx: Receiver<JobMessage>,
    latest: Option<PixelBuffer>,
    stats: SoftwareStats,
}

impl SoftwareBlur {
    /// Runner that spawns on `spawner`, asks `redraw` for a frame when a result lands and clamps
    /// blur radii to `max_radius_px`.
    pub fn new(
        spawner: Arc<dyn JobSpawner>,
        redraw: Arc<dyn RedrawRequester>,
        max_radius_px: f32,
    ) -> Self {
        let (tx, rx) = channel();
        Self {
            spawner,
            redraw,
            max_radius_px,
            current: Arc::new(AtomicU64::new(0)),
            in_flight: None,
            waiting: None,
            tx,
            rx,
            latest: None,
            stats: SoftwareStats::default(),
        }
    }

    /// Counters.
    pub fn stats(&self) -> SoftwareStats {
        self.stats
    }

    /// Most recent applied result.
    pub fn latest(&self) -> Option<&PixelBuffer> {
        self.latest.as_ref()
    }

    /// Return `true` while a job runs.
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Ticket of the running job.
    pub fn ticket(&self) -> Option<JobTicket> {
        self.in_flight.as_ref().map(|f| JobTicket {
            generation: f.generation,
            current: Arc::clone(&self.current),
            cancelled: Arc::clone(&f.cancelled),
        })
    }

    /// Submit a request. Returns a ticket when a job started, `None` when it was coalesced.
    pub fn submit(&mut self, request: SoftwareRequest) -> Option<JobTicket> {
        if self.in_flight.is_some() {
            if self.waiting.replace(request).is_some() {
                tracing::trace!("waiting software request replaced");
            }
            self.stats.coalesced += 1;
            return None;
        }
        Some(self.start(request))
    }

    /// Apply finished results. Returns `true` when a new result became visible.
    pub fn poll(&mut self) -> bool {
        let mut applied = false;
        while let Ok(msg) = self.rx.try_recv() {
            let current = self.current.load(Ordering::Acquire);
            let in_flight = self.in_flight.as_ref().map(|f| f.generation);
            if msg.generation != current || in_flight != Some(msg.generation) {
                self.stats.discarded += 1;
                tracing::warn!(
                    generation = msg.generation,
                    current,
                    "stale software blur result discarded"
                );
                continue;
            }
            self.in_flight = None;
            match msg.result {
                Ok(pixels) => {
                    self.latest = Some(pixels);
                    self.stats.completed += 1;
                    applied = true;
                }
                Err(e) => {
                    // The previous result stays on screen.
                    self.stats.failed += 1;
                    tracing::warn!(error = %e, "software blur job failed");
                }
            }
        }
        if self.in_flight.is_none()
            && let Some(next) = self.waiting.take()
        {
            self.start(next);
        }
        applied
    }

    /// Cancel the running job and drop any waiting request. Its result will never be applied.
    pub fn cancel(&mut self) {
        self.waiting = None;
        if let Some(f) = self.in_flight.take() {
            f.cancelled.store(true, Ordering::Release);
            self.current.fetch_add(1, Ordering::AcqRel);
            tracing::debug!(generation = f.generation, "software blur job cancelled");
        }
    }

    /// Cancel outstanding work and drop every buffer.
    pub fn detach(mut self) {
        self.cancel();
        self.latest = None;
        while self.rx.try_recv().is_ok() {
            self.stats.discarded += 1;
        }
    }

    fn start(&mut self, request: SoftwareRequest) -> JobTicket {
        let generation = self.current.fetch_add(1, Ordering::AcqRel) + 1;
        let cancelled = Arc::new(AtomicBool::new(false));
        let ticket = JobTicket {
            generation,
            current: Arc::clone(&self.current),
            cancelled: Arc::clone(&cancelled),
        };
        self.in_flight = Some(InFlight {
            generation,
            cancelled: Arc::clone(&cancelled),
        });
        self.stats.started += 1;

        let job_ticket = ticket.clone();
        let tx = self.tx.clone();
        let redraw = Arc::clone(&self.redraw);
        let graph = limit_blur_radius(&request.graph, self.max_radius_px);
        let SoftwareRequest { source, noise, .. } = request;
        self.spawner.spawn(Box::new(move || {
            if !job_ticket.is_current() {
                return;
            }
            let result = std::panic::catch_unwind(AssertUnwindSafe(|| {
                evaluate(
                    &graph,
                    &source,
                    CpuContext {
                        noise: noise.as_deref(),
                    },
                )
            }))
            .unwrap_or_else(|_| Err(HazeError::job("software blur job panicked")));
            if !job_ticket.is_current() {
                tracing::debug!(generation, "software blur finished after cancellation");
                return;
            }
            if tx.send(JobMessage { generation, result }).is_ok() {
                redraw.request_redraw();
            }
        }));
        ticket
    }
}

impl std::fmt::Debug for SoftwareBlur {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoftwareBlur")
            .field("busy", &self.is_busy())
            .field("has_result", &self.latest.is_some())
            .field("stats", &self.stats)
            .finish()
    }
}

/// Clamp every blur radius in `node` to `max` pixels.
fn limit_blur_radius(node: &FilterGraphNode, max: f32) -> FilterGraphNode {
    let b = |n: &FilterGraphNode| Box::new(limit_blur_radius(n, max));
    match node {
        FilterGraphNode::Source | FilterGraphNode::ShaderEffect(_) => node.clone(),
        FilterGraphNode::Blur {
            input,
            radius_x,
            radius_y,
            tile_mode,
        } => FilterGraphNode::Blur {
            input: b(input),
            radius_x: radius_x.min(max),
            radius_y: radius_y.min(max),
            tile_mode: *tile_mode,
        },
        FilterGraphNode::ColorFilter { input, filter } => FilterGraphNode::ColorFilter {
            input: b(input),
            filter: *filter,
        },
        FilterGraphNode::Blend {
            background,
            foreground,
            mode,
            offset,
        } => FilterGraphNode::Blend {
            background: b(background),
            foreground: b(foreground),
            mode: *mode,
            offset: *offset,
        },
        FilterGraphNode::Offset { input, offset } => FilterGraphNode::Offset {
            input: b(input),
            offset: *offset,
        },
        FilterGraphNode::Chain { inner, outer } => FilterGraphNode::Chain {
            inner: b(inner),
            outer: b(outer),
        },
        FilterGraphNode::RuntimeBlur {
            input,
            radius,
            crop,
            mask,
            tile_mode,
        } => FilterGraphNode::RuntimeBlur {
            input: b(input),
            radius: radius.min(max),
            crop: *crop,
            mask: mask.clone(),
            tile_mode: *tile_mode,
        },
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/software.rs"]
mod tests;
