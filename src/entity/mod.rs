pub mod comment;
pub mod mrt_carriage;
pub mod mrt_stream;
pub mod post;
pub mod user;
