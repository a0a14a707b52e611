pub mod goals;
pub mod milestones;
pub mod roadmap_tasks;
pub mod roadmaps;
pub mod tasks;
pub mod users;
