mod client;
mod mapper;

pub use client::GitHubDirectory;
