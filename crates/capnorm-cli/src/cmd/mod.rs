pub mod agents;
pub mod audit;
pub mod config;
pub mod init;
pub mod migrate;
pub mod normalize;
pub mod seed;
