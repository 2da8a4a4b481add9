//! Domain records and the queries each table supports.

pub mod comment;
pub mod mrt_carriage;
pub mod mrt_stream;
pub mod post;
pub mod user;

pub use comment::Comment;
pub use mrt_carriage::{decode_congestion, MrtCarriage, MrtLine};
pub use mrt_stream::MrtStream;
pub use post::Post;
pub use user::{User, MAX_PASSWORD_BYTES};
