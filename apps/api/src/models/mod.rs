pub mod candidate;
pub mod job;
pub mod match_record;
