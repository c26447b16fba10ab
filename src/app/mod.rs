pub mod output;
pub mod sources;
