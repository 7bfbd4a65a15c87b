//! Background job queue.
//!
//! Notifications and media deletions run here, off the request path. The
//! queue is bounded: enqueueing never waits, and a job that does not fit is
//! dropped with a warning. Each job gets its own context and timeout when a
//! worker picks it up, and its failure is only logged.

use std::sync::Arc;
use std::time::Duration;

use posts_common::RequestContext;
use posts_common::config::JobsConfig;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::services::media::MediaServiceRef;
use crate::services::notification::{Notice, NotificationDispatcher};

/// Job types that can be processed.
#[derive(Debug, Clone)]
pub enum Job {
    /// Notify a post owner about an engagement event.
    Notify { request_id: Uuid, notice: Notice },
    /// Delete the media of a removed post.
    DeleteMedia {
        request_id: Uuid,
        post_id: i64,
        media_id: i64,
    },
}

impl Job {
    const fn kind(&self) -> &'static str {
        match self {
            Self::Notify { .. } => "notify",
            Self::DeleteMedia { .. } => "delete_media",
        }
    }

    const fn request_id(&self) -> Uuid {
        match self {
            Self::Notify { request_id, .. } | Self::DeleteMedia { request_id, .. } => *request_id,
        }
    }
}

/// Job sender for enqueueing jobs.
#[derive(Clone)]
pub struct JobSender {
    sender: mpsc::Sender<Job>,
}

impl JobSender {
    /// Enqueue a job without waiting. Returns `false` if it was dropped.
    pub fn enqueue(&self, job: Job) -> bool {
        match self.sender.try_send(job) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(job)) => {
                warn!(
                    request_id = %job.request_id(),
                    job = job.kind(),
                    "Job queue is full, dropping job"
                );
                false
            }
            Err(mpsc::error::TrySendError::Closed(job)) => {
                warn!(
                    request_id = %job.request_id(),
                    job = job.kind(),
                    "Job queue is closed, dropping job"
                );
                false
            }
        }
    }

    /// Enqueue a notification for the owner of a post.
    pub fn notify(&self, ctx: &RequestContext, notice: Notice) -> bool {
        self.enqueue(Job::Notify {
            request_id: ctx.request_id(),
            notice,
        })
    }

    /// Enqueue deletion of a post's media.
    pub fn delete_media(&self, ctx: &RequestContext, post_id: i64, media_id: i64) -> bool {
        self.enqueue(Job::DeleteMedia {
            request_id: ctx.request_id(),
            post_id,
            media_id,
        })
    }
}

/// Services needed for job processing.
#[derive(Clone)]
pub struct JobWorkerContext {
    pub notifications: NotificationDispatcher,
    pub media: MediaServiceRef,
}

/// Job processing service.
pub struct JobService {
    sender: mpsc::Sender<Job>,
    receiver: mpsc::Receiver<Job>,
    workers: usize,
    timeout: Duration,
}

impl JobService {
    /// Create a new job service.
    #[must_use]
    pub fn new(config: &JobsConfig) -> Self {
        let (sender, receiver) = mpsc::channel(config.buffer_size.max(1));
        Self {
            sender,
            receiver,
            workers: config.workers.max(1),
            timeout: config.timeout(),
        }
    }

    /// Get a job sender for enqueueing jobs.
    #[must_use]
    pub fn sender(&self) -> JobSender {
        JobSender {
            sender: self.sender.clone(),
        }
    }

    /// Spawn the processor. Jobs enqueued before this call are kept.
    #[must_use]
    pub fn start(self, context: JobWorkerContext) -> JobHandle {
        let cancel = CancellationToken::new();
        let processor = JobProcessor {
            context: Arc::new(context),
            semaphore: Arc::new(Semaphore::new(self.workers)),
            workers: self.workers,
            timeout: self.timeout,
        };

        let token = cancel.clone();
        let task = tokio::spawn(async move {
            info!("Job worker starting with {} workers", processor.workers);
            processor.run(self.receiver, token).await;
            info!("Job worker stopped");
        });

        JobHandle { cancel, task }
    }
}

/// Handle to a running job processor.
pub struct JobHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl JobHandle {
    /// Stop accepting jobs, run what is already queued and wait for it.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            error!(error = %e, "Job worker panicked");
        }
    }
}

struct JobProcessor {
    context: Arc<JobWorkerContext>,
    semaphore: Arc<Semaphore>,
    workers: usize,
    timeout: Duration,
}

impl JobProcessor {
    async fn run(&self, mut receiver: mpsc::Receiver<Job>, cancel: CancellationToken) {
        loop {
            let job = tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                job = receiver.recv() => match job {
                    Some(job) => job,
                    None => break,
                },
            };
            self.spawn(job).await;
        }

        receiver.close();
        let mut drained = 0usize;
        while let Some(job) = receiver.recv().await {
            self.spawn(job).await;
            drained += 1;
        }
        if drained > 0 {
            info!(drained, "Drained pending jobs");
        }

        // Every in-flight job holds a permit.
        let _all = self.semaphore.acquire_many(self.workers as u32).await;
    }

    async fn spawn(&self, job: Job) {
        let Ok(permit) = self.semaphore.clone().acquire_owned().await else {
            return;
        };
        let context = self.context.clone();
        let timeout = self.timeout;

        tokio::spawn(async move {
            let _permit = permit;
            let kind = job.kind();
            let ctx = RequestContext::background(job.request_id(), timeout);
            if tokio::time::timeout(timeout, process_job(job, &ctx, &context))
                .await
                .is_err()
            {
                error!(request_id = %ctx.request_id(), job = kind, "Job timed out");
            }
        });
    }
}

/// Process a single job.
async fn process_job(job: Job, ctx: &RequestContext, context: &JobWorkerContext) {
    match job {
        Job::Notify { notice, .. } => {
            if let Err(e) = context.notifications.deliver(ctx, notice).await {
                error!(
                    request_id = %ctx.request_id(),
                    to_user_id = notice.to_user_id,
                    error = %e,
                    "Failed to publish notification"
                );
            }
        }
        Job::DeleteMedia {
            post_id,
            media_id,
            ..
        } => match context.media.delete(ctx, media_id).await {
            Ok(()) => {
                debug!(request_id = %ctx.request_id(), post_id, media_id, "Media delete requested");
            }
            Err(e) => {
                error!(
                    request_id = %ctx.request_id(),
                    post_id,
                    media_id,
                    error = %e,
                    "Failed to request media delete"
                );
            }
        },
    }
}
