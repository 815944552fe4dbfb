use tracing::Level;

/// A named transformation over the pipeline context.
pub struct Rule<C, E> {
    name: &'static str,
    apply: fn(&mut C) -> Result<(), E>,
}

impl<C, E> Rule<C, E> {
    pub const fn new(name: &'static str, apply: fn(&mut C) -> Result<(), E>) -> Self {
        Self { name, apply }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// An ordered list of rules which are applied together.
pub struct Stage<C, E> {
    name: &'static str,
    rules: Vec<Rule<C, E>>,
}

impl<C, E> Stage<C, E> {
    pub fn new(name: &'static str, rules: Vec<Rule<C, E>>) -> Self {
        Self { name, rules }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn rules(&self) -> &[Rule<C, E>] {
        &self.rules
    }
}

/// Runs stages in order and remembers how many of them have been applied.
///
/// Running a stage first runs every stage before it. A stage never runs twice,
/// so asking for level `L` and then `L + 1` only executes the additional stage.
pub struct Pipeline<C, E> {
    stages: Vec<Stage<C, E>>,
    level: usize,
}

impl<C, E> Pipeline<C, E> {
    pub fn new(stages: Vec<Stage<C, E>>) -> Self {
        Self { stages, level: 0 }
    }

    /// Number of stages which have been applied.
    pub fn level(&self) -> usize {
        self.level
    }

    pub fn stages(&self) -> &[Stage<C, E>] {
        &self.stages
    }

    /// Run the stage at `index` (zero based) and all stages before it.
    /// Indices beyond the last stage run the whole pipeline.
    pub fn run_stage(&mut self, context: &mut C, index: usize) -> Result<(), E> {
        let target = (index + 1).min(self.stages.len());
        while self.level < target {
            let stage = &self.stages[self.level];
            let span = tracing::span!(Level::DEBUG, "stage", name = stage.name);
            let _guard = span.enter();

            for rule in &stage.rules {
                tracing::trace!(rule = rule.name, "applying rule");
                (rule.apply)(context)?;
            }

            self.level += 1;
        }

        Ok(())
    }

    /// Run the first `count` stages. Zero is a no-op.
    pub fn run_until(&mut self, context: &mut C, count: usize) -> Result<(), E> {
        match count {
            0 => Ok(()),
            count => self.run_stage(context, count - 1),
        }
    }

    /// Run every stage.
    pub fn run_all(&mut self, context: &mut C) -> Result<(), E> {
        self.run_until(context, self.stages.len())
    }
}

#[cfg(test)]
mod test {
    use super::{
        Pipeline,
        Rule,
        Stage,
    };

    fn push_a(log: &mut Vec<&'static str>) -> Result<(), ()> {
        log.push("a");
        Ok(())
    }

    fn push_b(log: &mut Vec<&'static str>) -> Result<(), ()> {
        log.push("b");
        Ok(())
    }

    fn push_c(log: &mut Vec<&'static str>) -> Result<(), ()> {
        log.push("c");
        Ok(())
    }

    fn fail(_log: &mut Vec<&'static str>) -> Result<(), ()> {
        Err(())
    }

    fn pipeline() -> Pipeline<Vec<&'static str>, ()> {
        Pipeline::new(vec![
            Stage::new("first", vec![Rule::new("a", push_a), Rule::new("b", push_b)]),
            Stage::new("second", vec![Rule::new("c", push_c)]),
            Stage::new("third", vec![Rule::new("a", push_a)]),
        ])
    }

    #[test]
    fn stages_run_once_and_in_order() {
        let mut pipeline = pipeline();
        let mut log = Vec::new();

        pipeline.run_stage(&mut log, 1).unwrap();
        assert_eq!(log, ["a", "b", "c"]);
        assert_eq!(pipeline.level(), 2);

        pipeline.run_stage(&mut log, 0).unwrap();
        assert_eq!(log, ["a", "b", "c"]);

        pipeline.run_stage(&mut log, 2).unwrap();
        assert_eq!(log, ["a", "b", "c", "a"]);
        assert_eq!(pipeline.level(), 3);
    }

    #[test]
    fn run_until_bounds() {
        let mut pipeline = pipeline();
        let mut log = Vec::new();

        pipeline.run_until(&mut log, 0).unwrap();
        assert!(log.is_empty());

        pipeline.run_until(&mut log, 99).unwrap();
        assert_eq!(log, ["a", "b", "c", "a"]);
    }

    #[test]
    fn stepwise_limits_equal_a_direct_run() {
        let mut stepwise = pipeline();
        let mut stepwise_log = Vec::new();
        stepwise.run_until(&mut stepwise_log, 1).unwrap();
        stepwise.run_until(&mut stepwise_log, 2).unwrap();

        let mut direct = pipeline();
        let mut direct_log = Vec::new();
        direct.run_until(&mut direct_log, 2).unwrap();

        assert_eq!(stepwise_log, direct_log);
        assert_eq!(stepwise.level(), direct.level());
    }

    #[test]
    fn failing_rule_keeps_level() {
        let mut pipeline = Pipeline::new(vec![
            Stage::new("first", vec![Rule::new("a", push_a)]),
            Stage::new("broken", vec![Rule::new("fail", fail)]),
        ]);
        let mut log = Vec::new();

        assert!(pipeline.run_all(&mut log).is_err());
        assert_eq!(pipeline.level(), 1);
    }
}
