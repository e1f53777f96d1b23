pub mod error;
pub mod normalize;
pub mod planner;
pub mod report;
pub mod synchronizer;
