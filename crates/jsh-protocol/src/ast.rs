use std::fmt::{self, Display};

/// One stage of a pipeline: a program name and its argument tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    pub name: String,
    pub args: Vec<String>,
}

impl Stage {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }
}

impl Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// A fully parsed command line: one or more stages connected stdout to
/// stdin, optional file redirections at the ends, and a background flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    /// Never empty; stage `i` writes into stage `i + 1`.
    pub stages: Vec<Stage>,
    pub input: Option<String>,
    pub output: Option<String>,
    pub background: bool,
}

impl Pipeline {
    pub fn new(stages: Vec<Stage>) -> Self {
        Self {
            stages,
            input: None,
            output: None,
            background: false,
        }
    }

    /// The leading program name, used to recognize builtins.
    pub fn head(&self) -> &Stage {
        &self.stages[0]
    }
}

impl Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, stage) in self.stages.iter().enumerate() {
            if i > 0 {
                write!(f, " | ")?;
            }
            write!(f, "{stage}")?;
        }
        if let Some(input) = &self.input {
            write!(f, " < {input}")?;
        }
        if let Some(output) = &self.output {
            write!(f, " > {output}")?;
        }
        if self.background {
            write!(f, " &")?;
        }
        Ok(())
    }
}
