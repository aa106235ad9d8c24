/// Database access layer
///
/// Each repository exclusively owns writes to its tables; cross-entity
/// deletions happen only inside the owning repository's cascade method.
/// The store traits are the seams services are built against, so business
/// logic stays testable without a live database.
pub mod comment_likes;
pub mod comments;
pub mod post_likes;
pub mod posts;
pub mod users;

pub use comment_likes::{CommentLikeRepository, CommentLikeStore};
pub use comments::{CommentRepository, CommentStore};
pub use post_likes::{PostLikeRepository, PostLikeStore};
pub use posts::{PostRepository, PostStore};
pub use users::{IdentityStore, UserRepository};

#[cfg(test)]
pub use comment_likes::MockCommentLikeStore;
#[cfg(test)]
pub use comments::MockCommentStore;
#[cfg(test)]
pub use post_likes::MockPostLikeStore;
#[cfg(test)]
pub use posts::MockPostStore;
#[cfg(test)]
pub use users::MockIdentityStore;
