use std::fmt;

use clap::ValueEnum;

/// The learning task the user picked. Decides which section of the model reply is shown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, ValueEnum)]
pub enum LearningFunction {
    #[default]
    Translation,
    PronunciationGuide,
    Definition,
    GrammarAndStructure,
    VocabularyAnalysis,
    Corrections,
}

impl LearningFunction {
    pub const ALL: [LearningFunction; 6] = [
        LearningFunction::Translation,
        LearningFunction::PronunciationGuide,
        LearningFunction::Definition,
        LearningFunction::GrammarAndStructure,
        LearningFunction::VocabularyAnalysis,
        LearningFunction::Corrections,
    ];

    /// Name used in the prompt template and when matching reply sections.
    pub fn label(self) -> &'static str {
        match self {
            LearningFunction::Translation => "Translation",
            LearningFunction::PronunciationGuide => "Pronunciation Guide",
            LearningFunction::Definition => "Definition",
            LearningFunction::GrammarAndStructure => "Grammar and Structure",
            LearningFunction::VocabularyAnalysis => "Vocabulary Analysis",
            LearningFunction::Corrections => "Corrections",
        }
    }

    /// Heading shown above a rendered result.
    pub fn title(self) -> &'static str {
        match self {
            LearningFunction::Translation => "🌐 Translation to Urdu",
            LearningFunction::PronunciationGuide => "🔊 Pronunciation Guide",
            LearningFunction::Definition => "📚 Definition",
            LearningFunction::GrammarAndStructure => "📏 Grammar and Structure",
            LearningFunction::VocabularyAnalysis => "🧠 Vocabulary and Phrase Analysis",
            LearningFunction::Corrections => "✍️ Corrections",
        }
    }

    pub fn is_pronunciation(self) -> bool {
        self == LearningFunction::PronunciationGuide
    }

    pub fn next(self) -> Self {
        let idx = self.position();
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Self {
        let idx = self.position();
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    fn position(self) -> usize {
        Self::ALL
            .iter()
            .position(|function| *function == self)
            .unwrap_or(0)
    }
}

impl fmt::Display for LearningFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
