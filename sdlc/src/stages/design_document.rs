//! Design document from the approved user stories.

use async_trait::async_trait;

use crate::error::AgentError;
use crate::graph::{Next, Node};
use crate::llm::{parse_structured, ProviderOutput};
use crate::state::{is_denied, require_items, DesignDocument, SdlcState};
use crate::workflow::nodes;

use super::{bullet_list, lines_as_items, StageDeps};

pub struct DesignDocumentNode {
    deps: StageDeps,
}

impl DesignDocumentNode {
    pub fn new(deps: StageDeps) -> Self {
        Self { deps }
    }
}

#[derive(Clone, Copy)]
enum Section {
    Functional,
    Technical,
    Assumptions,
    OpenQuestions,
}

/// A heading line (`## Technical Requirements`, `**Assumptions:**`, `Risks:`)
/// and the section it opens.
fn section_heading(line: &str) -> Option<Section> {
    let line = line.trim();
    if ["- ", "* ", "• "].iter().any(|marker| line.starts_with(marker)) {
        return None;
    }
    let decorated = line.starts_with('#')
        || line.starts_with("**")
        || line.trim_end_matches('*').ends_with(':');
    let title = line
        .trim_start_matches(|c: char| c == '#' || c == '*' || c.is_whitespace())
        .trim_end_matches(|c: char| c == ':' || c == '*' || c.is_whitespace())
        .to_ascii_lowercase();
    if title.is_empty() || title.len() > 40 || !(decorated || title.ends_with("requirements")) {
        return None;
    }
    if title.starts_with("functional") {
        Some(Section::Functional)
    } else if title.starts_with("technical") {
        Some(Section::Technical)
    } else if title.starts_with("assumption") {
        Some(Section::Assumptions)
    } else if title.starts_with("open question") || title.starts_with("risk") {
        Some(Section::OpenQuestions)
    } else {
        None
    }
}

/// Splits prose on section headings; text before the first heading is functional.
fn design_from_text(raw: &str) -> DesignDocument {
    let mut doc = DesignDocument::default();
    let mut section = Section::Functional;
    let mut body = String::new();
    let flush = |doc: &mut DesignDocument, section: Section, body: &mut String| {
        let items = lines_as_items(body);
        match section {
            Section::Functional => doc.functional.extend(items),
            Section::Technical => doc.technical.extend(items),
            Section::Assumptions => doc.assumptions.extend(items),
            Section::OpenQuestions => doc.open_questions.extend(items),
        }
        body.clear();
    };
    for line in raw.lines() {
        match section_heading(line) {
            Some(next) => {
                flush(&mut doc, section, &mut body);
                section = next;
            }
            None => {
                body.push_str(line);
                body.push('\n');
            }
        }
    }
    flush(&mut doc, section, &mut body);
    doc
}

/// Design from the provider reply: the JSON shape when it has content,
/// otherwise the prose split on its headings. Code generation needs both
/// functional and technical content, so a section the reply leaves empty
/// holds the whole reply text instead.
fn design_from_reply(raw: &str) -> DesignDocument {
    let mut doc = match parse_structured::<DesignDocument>(raw) {
        ProviderOutput::Structured(doc) if !doc.is_empty() => doc,
        _ => {
            tracing::debug!("design document reply is not JSON, splitting on headings");
            design_from_text(raw)
        }
    };
    let text = raw.trim();
    if !text.is_empty() {
        for section in [&mut doc.functional, &mut doc.technical] {
            if section.iter().all(|item| item.trim().is_empty()) {
                *section = vec![text.to_string()];
            }
        }
    }
    doc
}

#[async_trait]
impl Node<SdlcState> for DesignDocumentNode {
    fn id(&self) -> &str {
        nodes::DESIGN_DOCUMENT
    }

    async fn run(&self, state: SdlcState) -> Result<(SdlcState, Next), AgentError> {
        require_items("user_stories", &state.user_stories)?;

        let stories = bullet_list(&state.user_stories);
        let feedback = bullet_list(&state.design_document_review_feedback);
        let vars = [
            ("user_stories", stories.as_str()),
            ("feedback", feedback.as_str()),
        ];
        let prompt = &self.deps.prompts.design_document;
        let messages = if is_denied(&state.design_document_review_status) && !feedback.is_empty() {
            prompt.revision_messages(&vars)
        } else {
            prompt.messages(&vars)
        };

        let response = self.deps.llm.invoke(&messages).await?;
        let design_document = design_from_reply(&response.content);

        Ok((
            SdlcState {
                design_document,
                ..state
            },
            Next::Continue,
        ))
    }
}
