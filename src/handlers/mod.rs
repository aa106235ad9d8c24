/// HTTP handlers for content-related endpoints
///
/// Handlers validate request DTOs, delegate to the service layer, and wrap
/// results into the `{ message, entity }` / pagination envelopes the API
/// exposes.
pub mod comments;
pub mod likes;
pub mod posts;

pub use comments::{
    create_comment, create_reply, delete_comment, edit_comment, get_comment_replies,
    get_post_comments,
};
pub use likes::{
    get_comment_likes, get_comment_likes_count, get_post_likes, get_post_likes_count,
    toggle_comment_like, toggle_post_like,
};
pub use posts::{
    add_post_images, create_post, delete_post, delete_post_images, edit_post_content,
    get_all_posts, get_my_posts, get_post, get_user_posts,
};
