//! different utility modules used throughout the project
/// logger initialization, timing and saving of trajectories into csv files
pub mod logger;
