use crate::errors::AppError;
use crate::services::job_scheduler_service::{JobContext, JobResult};
use crate::store::SessionStatus;
use tracing::info;

/// Periodic client-side expiry check of the held session token.
///
/// An expired or unreadable token ends the session and wipes the stock cache,
/// so a signed-out user never keeps seeing the previous user's data.
pub async fn check_session(ctx: JobContext) -> Result<JobResult, AppError> {
    let status = ctx.auth.check_session();

    let result = match status {
        SessionStatus::Anonymous => JobResult::default(),
        SessionStatus::Valid => JobResult {
            items_processed: 1,
            items_failed: 0,
        },
        SessionStatus::Expired | SessionStatus::Invalid => {
            info!("Session check signed the user out ({:?})", status);
            JobResult {
                items_processed: 1,
                items_failed: 0,
            }
        }
    };

    Ok(result)
}
