/// Name-ordered lower bound for a resumed run.
///
/// Resumption is per problem: a run interrupted partway through a problem
/// restarts that problem from its first solution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeCursor(String);

impl ResumeCursor {
    pub fn new(from: impl Into<String>) -> Self {
        Self(from.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn admits(&self, problem: &str) -> bool {
        problem >= self.0.as_str()
    }
}
