/// Knobs for frame computation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisSettings {
    /// Replace locals that are out of scope (according to the local variable table) with `Empty`
    /// before propagating a frame into a successor
    pub prune_out_of_scope_locals: bool,

    /// Leave the frame at offset 0 out of the encoded table unless something jumps there (the JVM
    /// derives that frame from the method descriptor)
    pub implicit_entry_frame: bool,

    /// Give up on methods where some instruction is visited more than this many times
    pub max_visits_per_instruction: usize,
}

impl AnalysisSettings {
    pub fn new() -> AnalysisSettings {
        AnalysisSettings {
            prune_out_of_scope_locals: true,
            implicit_entry_frame: true,
            max_visits_per_instruction: 1024,
        }
    }
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self::new()
    }
}
