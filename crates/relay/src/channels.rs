//! Channel naming conventions.
//!
//! Channel names are opaque strings formed by concatenation; no
//! escaping is performed, so job identifiers must not contain
//! characters that corrupt the convention.

/// Prefix of the per-job result channel.
pub const JOB_CHANNEL_PREFIX: &str = "job-";

/// Event name published on a job channel when the backend finishes.
pub const RESULT_EVENT: &str = "result";

/// Channel carrying result notifications for one job.
pub fn job_channel(job_id: &str) -> String {
    format!("{JOB_CHANNEL_PREFIX}{job_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_channel_concatenates_prefix_and_id() {
        assert_eq!(job_channel("42"), "job-42");
        assert_eq!(job_channel("a1b2-c3"), "job-a1b2-c3");
    }

    #[test]
    fn job_channel_performs_no_escaping() {
        // Opaque concatenation, by contract.
        assert_eq!(job_channel("x y"), "job-x y");
    }
}
