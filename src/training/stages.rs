//! Pipeline made of named stages run in order.

use crate::common::error::GuardResult;

use super::domain::{Pipeline, Stage};

/// Adapter turning a closure into a [`Stage`].
pub struct FnStage<F> {
    name: String,
    f: F,
}

impl<F> FnStage<F>
where
    F: FnMut() -> GuardResult<()>,
{
    pub fn new<S: Into<String>>(name: S, f: F) -> Self {
        Self { name: name.into(), f }
    }
}

impl<F> Stage for FnStage<F>
where
    F: FnMut() -> GuardResult<()>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&mut self) -> GuardResult<()> {
        (self.f)()
    }
}

/// Runs its stages in insertion order and stops at the first failure.
pub struct StagePipeline {
    name: String,
    stages: Vec<Box<dyn Stage>>,
}

impl StagePipeline {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            stages: Vec::new(),
        }
    }

    /// Append a stage.
    pub fn with_stage<T: Stage + 'static>(mut self, stage: T) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Append a closure stage.
    pub fn stage<S, F>(self, name: S, f: F) -> Self
    where
        S: Into<String>,
        F: FnMut() -> GuardResult<()> + 'static,
    {
        self.with_stage(FnStage::new(name, f))
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

impl Pipeline for StagePipeline {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&mut self) -> GuardResult<()> {
        for stage in &mut self.stages {
            log::debug!(target: "trainguard::pipeline", stage = stage.name(); "stage started");
            stage.execute().map_err(|err| err.trace())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::common::error::{ErrorContext, FaultError, ResultExt, WrappedError};

    #[test]
    fn runs_stages_in_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let (a, b) = (Rc::clone(&seen), Rc::clone(&seen));
        let mut pipeline = StagePipeline::new("train")
            .stage("ingest", move || {
                a.borrow_mut().push("ingest");
                Ok(())
            })
            .stage("fit", move || {
                b.borrow_mut().push("fit");
                Ok(())
            });
        assert_eq!(pipeline.len(), 2);
        pipeline.run().unwrap();
        assert_eq!(*seen.borrow(), vec!["ingest", "fit"]);
    }

    #[test]
    fn stops_at_first_failure() {
        let ran_last = Rc::new(RefCell::new(false));
        let flag = Rc::clone(&ran_last);
        let mut pipeline = StagePipeline::new("train")
            .stage("validate", || {
                Err(FaultError::invalid("no rows")).wrap_err()
            })
            .stage("fit", move || {
                *flag.borrow_mut() = true;
                Ok(())
            });
        let err = pipeline.run().unwrap_err();
        assert!(!*ran_last.borrow());
        assert!(err.to_string().ends_with("with message: [invalid input: no rows]"));
        // fault site plus the stage boundary
        assert_eq!(err.context().frames().len(), 2);
    }

    #[test]
    fn empty_pipeline_succeeds() {
        let mut pipeline = StagePipeline::new("noop");
        assert!(pipeline.is_empty());
        assert!(pipeline.run().is_ok());
    }

    #[test]
    fn detached_failure_propagates() {
        let mut pipeline = StagePipeline::new("train").stage("export", || {
            Err(WrappedError::detached("artifact store offline", ErrorContext::capture()))
        });
        let err = pipeline.run().unwrap_err();
        assert!(err.to_string().contains("artifact store offline"));
    }
}
