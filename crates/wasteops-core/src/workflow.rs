//! Status transitions. Any status may move to any other, including back to
//! itself; there is no forward-only guard.

use crate::registry::Registry;
use crate::IssueStatus;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub issue_id: String,
    pub from: IssueStatus,
    pub to: IssueStatus,
}

impl Transition {
    pub fn is_noop(&self) -> bool {
        self.from == self.to
    }

    pub fn notice(&self) -> String {
        format!(
            "민원({}) 상태가 '{}'(으)로 변경되었습니다.",
            self.issue_id, self.to
        )
    }
}

/// Writes `to` into the registry and describes what happened. Returns `None`
/// when `issue_id` is unknown, in which case nothing was written.
pub fn transition(registry: &mut Registry, issue_id: &str, to: IssueStatus) -> Option<Transition> {
    let from = registry.issue(issue_id)?.status;
    registry.set_issue_status(issue_id, to);
    let transition = Transition {
        issue_id: issue_id.to_string(),
        from,
        to,
    };
    info!(
        issue_id,
        from = %transition.from,
        to = %transition.to,
        noop = transition.is_noop(),
        "issue status transition"
    );
    Some(transition)
}
