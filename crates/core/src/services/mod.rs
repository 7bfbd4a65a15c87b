//! Business logic services.

#![allow(missing_docs)]

pub mod comment;
pub mod event_publisher;
pub mod jobs;
pub mod like;
pub mod locks;
pub mod media;
pub mod notification;
pub mod post;
pub mod user_directory;

pub use comment::{CommentService, CreateCommentInput};
pub use event_publisher::{EventPublisher, EventPublisherService, NoOpEventPublisher};
pub use jobs::{Job, JobHandle, JobSender, JobService, JobWorkerContext};
pub use like::LikeService;
pub use locks::{PostGuard, PostLocks};
pub use media::{MediaRef, MediaService, MediaServiceRef, MediaUpload, RestMediaClient};
pub use notification::{Notice, NoticeKind, Notification, NotificationDispatcher};
pub use post::{CreatePostInput, PostService};
pub use user_directory::{RestUserDirectory, UserDirectory, UserDirectoryRef, UserProfile};
