//! Query builder
//!
//! This module assembles statements against a table descriptor and pages
//! through their results.

pub mod cursor;
pub mod filter;
pub mod fragment;
pub mod list;
pub mod pagination;
pub mod select;
pub mod update;

#[cfg(test)]
mod tests;


pub use cursor::Cursor;
pub use filter::{Filter, FilterSet, Operator};
pub use fragment::{Assignment, FragmentBuilder, PqFragments, PQ};
pub use list::List;
pub use select::Select;
pub use update::Update;
