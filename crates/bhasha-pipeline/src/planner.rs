//! Operation planner: decides which capabilities a request needs.

use serde::Serialize;

use bhasha_core::error::PipelineError;
use bhasha_core::language::Language;
use bhasha_core::types::{InputModality, Operation, OutputModality};

/// The ordered operations for one request.
///
/// Holds at most one of each operation, never both Recognize and Extract,
/// and ends in Synthesize exactly when the output is audio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelinePlan {
    pub input: InputModality,
    pub output: OutputModality,
    pub source: Language,
    pub target: Language,
    pub operations: Vec<Operation>,
}

impl PipelinePlan {
    /// Text in, text out, same language.
    pub fn is_passthrough(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn translates(&self) -> bool {
        self.operations.contains(&Operation::Translate)
    }

    pub fn synthesizes(&self) -> bool {
        self.operations.contains(&Operation::Synthesize)
    }

    /// Wire names of the planned operations, e.g. `["asr", "mt"]`.
    pub fn wire_names(&self) -> Vec<&'static str> {
        self.operations.iter().map(|op| op.wire_name()).collect()
    }
}

pub fn plan(
    input: InputModality,
    output: OutputModality,
    source: Language,
    target: Language,
) -> PipelinePlan {
    let mut operations = Vec::with_capacity(3);

    match input {
        InputModality::Audio => operations.push(Operation::Recognize),
        InputModality::Image => operations.push(Operation::Extract),
        InputModality::Text => {}
    }
    if source != target {
        operations.push(Operation::Translate);
    }
    if output == OutputModality::Audio {
        operations.push(Operation::Synthesize);
    }

    PipelinePlan {
        input,
        output,
        source,
        target,
        operations,
    }
}

/// Validate raw language codes, then plan.
pub fn plan_for_codes(
    input: InputModality,
    output: OutputModality,
    source: &str,
    target: &str,
) -> Result<PipelinePlan, PipelineError> {
    let source = Language::validate(source)?;
    let target = Language::validate(target)?;
    Ok(plan(input, output, source, target))
}
