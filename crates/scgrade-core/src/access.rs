//! File access policy for content embedded in a question.

use serde::{Deserialize, Serialize};

/// Component owning this question type's own file areas.
pub const OWN_COMPONENT: &str = "qtype_sc";
/// Component owning the shared question file areas.
pub const QUESTION_COMPONENT: &str = "question";

/// A request to serve a file attached to a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileAccessRequest {
    pub component: String,
    pub file_area: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl FileAccessRequest {
    pub fn new(component: impl Into<String>, file_area: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            file_area: file_area.into(),
            args: Vec::new(),
        }
    }
}

/// What kind of content a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileArea {
    OptionText,
    FeedbackText,
    CombinedFeedback,
    Hint,
    Other,
}

impl FileArea {
    pub fn classify(component: &str, file_area: &str) -> Self {
        match (component, file_area) {
            (OWN_COMPONENT, "optiontext") => FileArea::OptionText,
            (OWN_COMPONENT, "feedbacktext") => FileArea::FeedbackText,
            (
                QUESTION_COMPONENT,
                "correctfeedback" | "partiallycorrectfeedback" | "incorrectfeedback",
            ) => FileArea::CombinedFeedback,
            (QUESTION_COMPONENT, "hint") => FileArea::Hint,
            _ => FileArea::Other,
        }
    }
}

/// The host's own authorization checks, used where the policy delegates.
pub trait HostFileAccess {
    fn check_combined_feedback_access(&self, request: &FileAccessRequest) -> bool;
    fn check_hint_access(&self, request: &FileAccessRequest) -> bool;
    fn check_default_access(&self, request: &FileAccessRequest) -> bool;
}

/// Decide whether `request` may be served.
///
/// Option and feedback text are always readable. Combined feedback and hints
/// are readable when the question was edited after the attempt began,
/// otherwise the host decides. Everything else goes to the host default.
pub fn check_file_access(
    request: &FileAccessRequest,
    edited_question: bool,
    host: &dyn HostFileAccess,
) -> bool {
    match FileArea::classify(&request.component, &request.file_area) {
        FileArea::OptionText | FileArea::FeedbackText => true,
        FileArea::CombinedFeedback => {
            edited_question || host.check_combined_feedback_access(request)
        }
        FileArea::Hint => edited_question || host.check_hint_access(request),
        FileArea::Other => host.check_default_access(request),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct DenyAll;

    impl HostFileAccess for DenyAll {
        fn check_combined_feedback_access(&self, _: &FileAccessRequest) -> bool {
            false
        }
        fn check_hint_access(&self, _: &FileAccessRequest) -> bool {
            false
        }
        fn check_default_access(&self, _: &FileAccessRequest) -> bool {
            false
        }
    }

    struct HintsOnly;

    impl HostFileAccess for HintsOnly {
        fn check_combined_feedback_access(&self, _: &FileAccessRequest) -> bool {
            false
        }
        fn check_hint_access(&self, _: &FileAccessRequest) -> bool {
            true
        }
        fn check_default_access(&self, _: &FileAccessRequest) -> bool {
            false
        }
    }

    #[test]
    fn own_text_is_always_readable() {
        let option = FileAccessRequest::new(OWN_COMPONENT, "optiontext");
        let feedback = FileAccessRequest::new(OWN_COMPONENT, "feedbacktext");
        assert!(check_file_access(&option, false, &DenyAll));
        assert!(check_file_access(&feedback, false, &DenyAll));
    }

    #[test]
    fn combined_feedback_open_after_edit() {
        let request = FileAccessRequest::new(QUESTION_COMPONENT, "partiallycorrectfeedback");
        assert!(!check_file_access(&request, false, &DenyAll));
        assert!(check_file_access(&request, true, &DenyAll));
    }

    #[test]
    fn hints_delegate_unless_edited() {
        let request = FileAccessRequest::new(QUESTION_COMPONENT, "hint");
        assert!(!check_file_access(&request, false, &DenyAll));
        assert!(check_file_access(&request, false, &HintsOnly));
        assert!(check_file_access(&request, true, &DenyAll));
    }

    #[test]
    fn unknown_areas_use_host_default() {
        let request = FileAccessRequest::new(QUESTION_COMPONENT, "questiontext");
        assert_eq!(
            FileArea::classify(&request.component, &request.file_area),
            FileArea::Other
        );
        assert!(!check_file_access(&request, true, &DenyAll));
        // Own component names in the shared component are not own text
        let foreign = FileAccessRequest::new(QUESTION_COMPONENT, "optiontext");
        assert!(!check_file_access(&foreign, false, &DenyAll));
    }
}
