pub mod applicants;
pub mod duplicates;
