pub mod auth;
pub mod comment;
pub mod docs;
pub mod follow;
pub mod group;
pub mod model;
pub mod post;
