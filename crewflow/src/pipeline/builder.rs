//! Pipeline builder with validation.

use super::SequentialPipeline;
use crate::errors::{ContractErrorInfo, PipelineValidationError};
use crate::stages::Stage;
use std::collections::HashSet;
use std::sync::Arc;

/// Builder for validated sequential pipelines.
#[derive(Debug, Clone)]
pub struct PipelineBuilder {
    name: String,
    stages: Vec<Arc<dyn Stage>>,
    names: HashSet<String>,
}

impl PipelineBuilder {
    /// Creates a new pipeline builder.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stages: Vec::new(),
            names: HashSet::new(),
        }
    }

    /// Appends a stage. Stages run in the order they are added.
    ///
    /// # Errors
    ///
    /// Returns an error if the stage name is empty or already used.
    pub fn stage(mut self, stage: Arc<dyn Stage>) -> Result<Self, PipelineValidationError> {
        let name = stage.name().trim().to_string();

        if name.is_empty() {
            return Err(PipelineValidationError::new("Stage name cannot be empty")
                .with_error_info(
                    ContractErrorInfo::new("PIPELINE-EMPTY-STAGE-NAME", "Stage has no name")
                        .with_fix_hint("Give every stage a non-empty name."),
                ));
        }

        if !self.names.insert(name.clone()) {
            return Err(
                PipelineValidationError::new(format!("Stage '{name}' is already in the pipeline"))
                    .with_stages(vec![name.clone()])
                    .with_error_info(
                        ContractErrorInfo::new(
                            "PIPELINE-DUPLICATE-STAGE",
                            format!("Duplicate stage '{name}'"),
                        )
                        .with_fix_hint("Stage names must be unique within a pipeline."),
                    ),
            );
        }

        self.stages.push(stage);
        Ok(self)
    }

    /// Builds the pipeline.
    ///
    /// # Errors
    ///
    /// Returns an error if the builder has no stages.
    pub fn build(self) -> Result<SequentialPipeline, PipelineValidationError> {
        if self.stages.is_empty() {
            return Err(PipelineValidationError::new("Pipeline has no stages")
                .with_error_info(
                    ContractErrorInfo::new("PIPELINE-EMPTY", "Cannot build an empty pipeline")
                        .with_fix_hint("Add at least one stage to the pipeline before building."),
                ));
        }

        Ok(SequentialPipeline::new(self.name, self.stages))
    }

    /// Returns the pipeline name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::StageContext;
    use crate::core::StageOutput;
    use async_trait::async_trait;

    #[derive(Debug)]
    struct Named(&'static str);

    #[async_trait]
    impl Stage for Named {
        fn name(&self) -> &str {
            self.0
        }

        async fn execute(&self, _ctx: &StageContext) -> StageOutput {
            StageOutput::ok(self.0)
        }
    }

    #[test]
    fn test_builder_keeps_order() {
        let pipeline = PipelineBuilder::new("crew")
            .stage(Arc::new(Named("b")))
            .unwrap()
            .stage(Arc::new(Named("a")))
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(pipeline.name(), "crew");
        assert_eq!(pipeline.stage_names(), vec!["b", "a"]);
    }

    #[test]
    fn test_builder_rejects_duplicates() {
        let err = PipelineBuilder::new("crew")
            .stage(Arc::new(Named("a")))
            .unwrap()
            .stage(Arc::new(Named("a")))
            .unwrap_err();

        assert_eq!(err.code(), Some("PIPELINE-DUPLICATE-STAGE"));
        assert_eq!(err.stages, vec!["a".to_string()]);
    }

    #[test]
    fn test_builder_rejects_empty_name_and_empty_pipeline() {
        let err = PipelineBuilder::new("crew")
            .stage(Arc::new(Named("  ")))
            .unwrap_err();
        assert_eq!(err.code(), Some("PIPELINE-EMPTY-STAGE-NAME"));

        let builder = PipelineBuilder::new("crew");
        assert_eq!(builder.build().unwrap_err().code(), Some("PIPELINE-EMPTY"));
    }
}
