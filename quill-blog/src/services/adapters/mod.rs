pub mod blog_repository;

pub use blog_repository::{BlogRepository, MemoryBlogRepository};
