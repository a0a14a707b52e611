pub mod fixtures;

mod analytics;
mod coaching;
mod jobs;
mod notifications;
mod progress;
mod store;
