/// Letter grade derived from a session's mean reaction time
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Grade {
    #[strum(to_string = "S+")]
    SPlus,
    S,
    A,
    B,
    C,
    D,
}

impl Grade {
    /// S-tier grades get highlighted on the result screen
    pub fn is_elite(&self) -> bool {
        matches!(self, Grade::SPlus | Grade::S)
    }
}

pub fn grade_for(mean_reaction_ms: u64) -> Grade {
    match mean_reaction_ms {
        0..=149 => Grade::SPlus,
        150..=179 => Grade::S,
        180..=199 => Grade::A,
        200..=249 => Grade::B,
        250..=299 => Grade::C,
        _ => Grade::D,
    }
}
