//! Product-level services (outside the attribute mutation pipeline)

pub mod product_service;

pub use product_service::ProductService;
