//! The tidy annotation model: backend records, the four normalized tables,
//! the table builder, and the corpus store.

pub mod builder;
pub mod record;
pub mod store;
pub mod tables;
