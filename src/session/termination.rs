use crate::feedback::{FeedbackGenerator, FeedbackRequest};
use crate::navigation::{NavigationTarget, Navigator};
use tracing::{error, info, warn};

/// What happens once a call run finishes
#[derive(Debug, Clone, PartialEq)]
pub enum TerminationAction {
    /// Practice generation: go back to the landing view
    ReturnToLanding,
    /// Scripted interview: ask for feedback, then show it
    RequestFeedback(FeedbackRequest),
}

/// Run a termination action to completion and navigate
///
/// The generator is called at most once; failures fall back to the landing
/// view and are not retried.
pub async fn execute_termination(
    action: TerminationAction,
    generator: &dyn FeedbackGenerator,
    navigator: &dyn Navigator,
) -> NavigationTarget {
    let target = match action {
        TerminationAction::ReturnToLanding => NavigationTarget::Landing,
        TerminationAction::RequestFeedback(request) => {
            let interview_id = request.interview_id.clone();

            match generator.create_feedback(request).await {
                Ok(response) if response.is_usable() => {
                    info!(
                        "Feedback {} saved for interview {}",
                        response.feedback_id.as_deref().unwrap_or_default(),
                        interview_id
                    );
                    NavigationTarget::FeedbackDetail { interview_id }
                }
                Ok(_) => {
                    warn!("Feedback generator reported failure for interview {}", interview_id);
                    NavigationTarget::Landing
                }
                Err(e) => {
                    error!("Error saving feedback for interview {}: {:#}", interview_id, e);
                    NavigationTarget::Landing
                }
            }
        }
    };

    navigator.navigate(target.clone());
    target
}
