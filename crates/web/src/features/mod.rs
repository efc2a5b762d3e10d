pub mod aiparse;
pub mod cups;
pub mod events;
pub mod players;
pub mod scores;
