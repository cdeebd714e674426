//! The wizard's screens

use std::fmt;
use std::str::FromStr;

/// One wizard screen; exactly one is active at a time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Screen {
    /// Name the task being taught
    #[default]
    InputTask,
    /// Pick the demonstration recordings
    InputSmile,
    /// Choose between the builder and an existing knowledge file
    InputCauses,
    Builder,
    Relationship,
    ActionParameters,
    CausalParameters,
    Preview,
    Review,
    /// Describe the initial tabletop scene
    XmlPage,
    BuilderReview,
    Final,
}

impl Screen {
    pub const ALL: [Screen; 12] = [
        Screen::InputTask,
        Screen::InputSmile,
        Screen::InputCauses,
        Screen::Builder,
        Screen::Relationship,
        Screen::ActionParameters,
        Screen::CausalParameters,
        Screen::Preview,
        Screen::Review,
        Screen::XmlPage,
        Screen::BuilderReview,
        Screen::Final,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Screen::InputTask => "InputTask",
            Screen::InputSmile => "InputSmile",
            Screen::InputCauses => "InputCauses",
            Screen::Builder => "Builder",
            Screen::Relationship => "Relationship",
            Screen::ActionParameters => "ActionParameters",
            Screen::CausalParameters => "CausalParameters",
            Screen::Preview => "Preview",
            Screen::Review => "Review",
            Screen::XmlPage => "XmlPage",
            Screen::BuilderReview => "BuilderReview",
            Screen::Final => "Final",
        }
    }

    pub fn is_terminal(&self) -> bool {
        *self == Screen::Final
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Screen {
    type Err = String;

    /// Accepts `CausalParameters`, `causal-parameters`, `causal_parameters`, ...
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        Screen::ALL
            .into_iter()
            .find(|screen| screen.name().to_ascii_lowercase() == wanted)
            .ok_or_else(|| format!("Unknown screen '{s}'"))
    }
}
