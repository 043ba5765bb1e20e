pub mod adapter;

pub use adapter::adapt_patch_for_upstream;
