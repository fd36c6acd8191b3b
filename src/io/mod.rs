pub mod paths;

pub use paths::PathUtils;
