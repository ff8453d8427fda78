//! Assembles the SDLC stage graph.

use std::collections::HashMap;
use std::sync::Arc;

use crate::graph::{
    CompilationError, CompiledStateGraph, GateNode, NodeMiddleware, RetryPolicy, StateGraph, END,
    START,
};
use crate::llm::LlmClient;
use crate::memory::Checkpointer;
use crate::stages::{
    CodeNode, DeploymentNode, DesignDocumentNode, QaTestingNode, RequirementsNode,
    SecurityReviewNode, StageDeps, StagePrompts, TestCasesNode, UserStoriesNode,
};
use crate::state::SdlcState;

use super::decision::{decide, Decision};
use super::gate::Gate;
use super::nodes;

/// Optional execution settings for the built graph.
#[derive(Clone, Default)]
pub struct BuildOptions {
    pub retry_policy: RetryPolicy,
    pub middleware: Option<Arc<dyn NodeMiddleware<SdlcState>>>,
}

/// Builds the fixed workflow:
///
/// ```text
/// User Requirements -> Auto-generate User Stories -> [Human User Story Approval]
///   -> Create Design Document -> [Human Design Document Review]
///   -> Generate Code -> [Human Code Review] -> Security Review -> [Human Security Review]
///   -> Write Test Cases -> [Human Test Cases Review] -> QA Testing -> [Human QA Review]
///   -> Deployment -> END
/// ```
///
/// Every bracketed gate is an interrupt point with `Approve`/`Denied` edges
/// (see [`Gate::on_approve`] and [`Gate::on_deny`]). Without a checkpointer
/// only `invoke` is usable.
pub fn build_sdlc_graph(
    llm: Arc<dyn LlmClient>,
    prompts: Arc<StagePrompts>,
    checkpointer: Option<Arc<dyn Checkpointer<SdlcState>>>,
    options: BuildOptions,
) -> Result<CompiledStateGraph<SdlcState>, CompilationError> {
    let deps = StageDeps::new(llm, prompts);

    let mut graph = StateGraph::<SdlcState>::new();
    graph
        .add_node(nodes::REQUIREMENTS, Arc::new(RequirementsNode::new()))
        .add_node(nodes::USER_STORIES, Arc::new(UserStoriesNode::new(deps.clone())))
        .add_node(nodes::USER_STORY_APPROVAL, Arc::new(GateNode::new(nodes::USER_STORY_APPROVAL)))
        .add_node(nodes::DESIGN_DOCUMENT, Arc::new(DesignDocumentNode::new(deps.clone())))
        .add_node(
            nodes::DESIGN_DOCUMENT_REVIEW,
            Arc::new(GateNode::new(nodes::DESIGN_DOCUMENT_REVIEW)),
        )
        .add_node(nodes::GENERATE_CODE, Arc::new(CodeNode::new(deps.clone())))
        .add_node(nodes::CODE_REVIEW, Arc::new(GateNode::new(nodes::CODE_REVIEW)))
        .add_node(nodes::SECURITY_REVIEW, Arc::new(SecurityReviewNode::new(deps.clone())))
        .add_node(
            nodes::SECURITY_REVIEW_APPROVAL,
            Arc::new(GateNode::new(nodes::SECURITY_REVIEW_APPROVAL)),
        )
        .add_node(nodes::WRITE_TEST_CASES, Arc::new(TestCasesNode::new(deps.clone())))
        .add_node(nodes::TEST_CASES_REVIEW, Arc::new(GateNode::new(nodes::TEST_CASES_REVIEW)))
        .add_node(nodes::QA_TESTING, Arc::new(QaTestingNode::new(deps)))
        .add_node(nodes::QA_REVIEW, Arc::new(GateNode::new(nodes::QA_REVIEW)))
        .add_node(nodes::DEPLOYMENT, Arc::new(DeploymentNode::new()));

    graph
        .add_edge(START, nodes::REQUIREMENTS)
        .add_edge(nodes::REQUIREMENTS, nodes::USER_STORIES)
        .add_edge(nodes::USER_STORIES, nodes::USER_STORY_APPROVAL)
        .add_edge(nodes::DESIGN_DOCUMENT, nodes::DESIGN_DOCUMENT_REVIEW)
        .add_edge(nodes::GENERATE_CODE, nodes::CODE_REVIEW)
        .add_edge(nodes::SECURITY_REVIEW, nodes::SECURITY_REVIEW_APPROVAL)
        .add_edge(nodes::WRITE_TEST_CASES, nodes::TEST_CASES_REVIEW)
        .add_edge(nodes::QA_TESTING, nodes::QA_REVIEW)
        .add_edge(nodes::DEPLOYMENT, END);

    for gate in Gate::ALL {
        let path_map: HashMap<String, String> = [
            (Decision::Approve.as_str().to_string(), gate.on_approve().to_string()),
            (Decision::Denied.as_str().to_string(), gate.on_deny().to_string()),
        ]
        .into_iter()
        .collect();
        graph.add_conditional_edges(
            gate.node_id(),
            Arc::new(move |state: &SdlcState| decide(gate.status(state)).as_str().to_string()),
            Some(path_map),
        );
    }

    let mut graph = graph
        .with_interrupt_before(Gate::ALL.map(Gate::node_id))
        .with_retry_policy(options.retry_policy);
    if let Some(middleware) = options.middleware {
        graph = graph.with_middleware(middleware);
    }

    match checkpointer {
        Some(checkpointer) => graph.compile_with_checkpointer(checkpointer),
        None => graph.compile(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlm;
    use crate::workflow::nodes::FLOW_ORDER;

    fn build() -> CompiledStateGraph<SdlcState> {
        build_sdlc_graph(
            Arc::new(MockLlm::new("")),
            Arc::new(StagePrompts::embedded().unwrap()),
            None,
            BuildOptions::default(),
        )
        .unwrap()
    }

    /// **Scenario**: the graph holds all fourteen nodes in flow order and halts at each gate.
    #[test]
    fn graph_has_every_node_and_gate() {
        let graph = build();
        assert_eq!(graph.node_ids(), FLOW_ORDER.map(String::from).as_slice());
        assert_eq!(graph.first_node_id(), nodes::REQUIREMENTS);
        for gate in Gate::ALL {
            assert!(graph.is_interrupt(gate.node_id()));
        }
        assert!(!graph.is_interrupt(nodes::GENERATE_CODE));
    }

    #[test]
    fn rendering_lists_gate_routes() {
        let text = crate::graph::generate_text(&build());
        assert!(text.contains("[Human QA Review] (interrupt) -> Deployment | Generate Code"), "{}", text);
    }
}
