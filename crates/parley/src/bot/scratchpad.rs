//! The running transcript of one `chat` call.

/// One completed tool round: what the model wrote and what the tool returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotStep {
    /// The model's raw completion for this turn.
    pub log: String,
    pub tool: String,
    pub input: String,
    pub observation: String,
}

/// Append-only list of [`BotStep`]s in execution order.
#[derive(Debug, Clone, Default)]
pub struct Scratchpad {
    steps: Vec<BotStep>,
}

impl Scratchpad {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, step: BotStep) {
        self.steps.push(step);
    }

    pub fn steps(&self) -> &[BotStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn into_steps(self) -> Vec<BotStep> {
        self.steps
    }

    /// Render the transcript for the prompt.
    ///
    /// Each step contributes its log, then the observation on its own line,
    /// then the LLM prefix that cues the next thought:
    ///
    /// ```
    /// use parley::bot::{BotStep, Scratchpad};
    ///
    /// let mut pad = Scratchpad::new();
    /// pad.push(BotStep {
    ///     log: "Action: echo\nAction Input: hi".into(),
    ///     tool: "echo".into(),
    ///     input: "hi".into(),
    ///     observation: "hi".into(),
    /// });
    /// assert_eq!(
    ///     pad.render("Observation: ", "Thought:"),
    ///     "Action: echo\nAction Input: hi\nObservation: hi\nThought:"
    /// );
    /// ```
    pub fn render(&self, observation_prefix: &str, llm_prefix: &str) -> String {
        let mut out = String::new();
        for step in &self.steps {
            out.push_str(&step.log);
            out.push('\n');
            out.push_str(observation_prefix);
            out.push_str(&step.observation);
            out.push('\n');
            out.push_str(llm_prefix);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(n: usize) -> BotStep {
        BotStep {
            log: format!("log{n}"),
            tool: "t".into(),
            input: format!("in{n}"),
            observation: format!("obs{n}"),
        }
    }

    #[test]
    fn empty_renders_empty() {
        assert_eq!(Scratchpad::new().render("Observation: ", "Thought:"), "");
    }

    #[test]
    fn renders_steps_in_order() {
        let mut pad = Scratchpad::new();
        pad.push(step(1));
        pad.push(step(2));
        assert_eq!(pad.len(), 2);
        assert_eq!(
            pad.render("Observation: ", "Thought:"),
            "log1\nObservation: obs1\nThought:log2\nObservation: obs2\nThought:"
        );
    }

    #[test]
    fn into_steps_keeps_order() {
        let mut pad = Scratchpad::new();
        pad.push(step(1));
        pad.push(step(2));
        let inputs: Vec<_> = pad.into_steps().into_iter().map(|s| s.input).collect();
        assert_eq!(inputs, vec!["in1", "in2"]);
    }
}
