/// Business logic layer for pulse-social
///
/// - Post service: post lifecycle, image list mutations, cascade on delete
/// - Comment service: comment tree (one reply level), cascade on delete
/// - Like service: idempotent toggles, counts, like listings for both targets
/// - Feed service: paginated denormalized post pages
pub mod comments;
pub mod feed;
pub mod likes;
pub mod posts;

pub use comments::CommentService;
pub use feed::FeedService;
pub use likes::LikeService;
pub use posts::PostService;
