//! Node ids of the SDLC graph, in flow order.

pub const REQUIREMENTS: &str = "User Requirements";
pub const USER_STORIES: &str = "Auto-generate User Stories";
pub const USER_STORY_APPROVAL: &str = "Human User Story Approval";
pub const DESIGN_DOCUMENT: &str = "Create Design Document";
pub const DESIGN_DOCUMENT_REVIEW: &str = "Human Design Document Review";
pub const GENERATE_CODE: &str = "Generate Code";
pub const CODE_REVIEW: &str = "Human Code Review";
pub const SECURITY_REVIEW: &str = "Security Review";
pub const SECURITY_REVIEW_APPROVAL: &str = "Human Security Review";
pub const WRITE_TEST_CASES: &str = "Write Test Cases";
pub const TEST_CASES_REVIEW: &str = "Human Test Cases Review";
pub const QA_TESTING: &str = "QA Testing";
pub const QA_REVIEW: &str = "Human QA Review";
pub const DEPLOYMENT: &str = "Deployment";

/// Every node in flow order. Also the step list of the progress tracker.
pub const FLOW_ORDER: [&str; 14] = [
    REQUIREMENTS,
    USER_STORIES,
    USER_STORY_APPROVAL,
    DESIGN_DOCUMENT,
    DESIGN_DOCUMENT_REVIEW,
    GENERATE_CODE,
    CODE_REVIEW,
    SECURITY_REVIEW,
    SECURITY_REVIEW_APPROVAL,
    WRITE_TEST_CASES,
    TEST_CASES_REVIEW,
    QA_TESTING,
    QA_REVIEW,
    DEPLOYMENT,
];
