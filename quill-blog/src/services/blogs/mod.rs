pub mod blog;
pub mod blogs_schema;
pub mod blogs_service;
pub mod blogs_shared;

pub use blog::{Blog, BlogChanges, NewBlog};
pub use blogs_service::BlogsService;
