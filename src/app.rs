use std::path::Path;
use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use rand::Rng;
use rand::rngs::StdRng;

use crate::assistant::{AudioState, LearningRequest, Outcome, RenderedResult};
use crate::function::LearningFunction;
use crate::quiz::{QuizEngine, QuizOutcome};
use crate::speech::Speed;
use crate::tui::Editor;

pub const FLASH_SECS: f64 = 2.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tab {
    Learn,
    Quiz,
}

impl Tab {
    pub fn toggle(self) -> Self {
        match self {
            Tab::Learn => Tab::Quiz,
            Tab::Quiz => Tab::Learn,
        }
    }
}

/// Work the event loop has to do after a key press.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    None,
    Quit,
    Submit,
    Resynthesize,
    Play,
}

#[derive(Clone, Debug)]
pub struct Flash {
    pub message: String,
    pub is_error: bool,
    pub at: Instant,
}

/// State of one interactive session. All I/O happens in the caller.
pub struct App<R: Rng = StdRng> {
    pub tab: Tab,
    pub function: LearningFunction,
    pub input: Editor,
    pub speed: Speed,
    pub outcome: Option<Outcome>,
    pub show_raw: bool,
    pub busy: bool,
    pub quiz: QuizEngine<R>,
    pub answer: Editor,
    pub quiz_feedback: Option<QuizOutcome>,
    pub flash: Option<Flash>,
}

impl<R: Rng> App<R> {
    pub fn new(quiz: QuizEngine<R>) -> Self {
        Self {
            tab: Tab::Learn,
            function: LearningFunction::default(),
            input: Editor::new(),
            speed: Speed::default(),
            outcome: None,
            show_raw: false,
            busy: false,
            quiz,
            answer: Editor::single_line(),
            quiz_feedback: None,
            flash: None,
        }
    }

    pub fn request(&self) -> LearningRequest {
        LearningRequest::new(self.input.content(), self.function)
    }

    pub fn apply_outcome(&mut self, outcome: Outcome) {
        self.show_raw = false;
        self.outcome = Some(outcome);
    }

    pub fn result(&self) -> Option<&RenderedResult> {
        match &self.outcome {
            Some(Outcome::Rendered(result)) => Some(result),
            _ => None,
        }
    }

    pub fn result_mut(&mut self) -> Option<&mut RenderedResult> {
        match &mut self.outcome {
            Some(Outcome::Rendered(result)) => Some(result),
            _ => None,
        }
    }

    pub fn audio_path(&self) -> Option<&Path> {
        match &self.result()?.audio {
            AudioState::Ready(artifact) => Some(artifact.path.as_path()),
            _ => None,
        }
    }

    pub fn set_flash(&mut self, message: impl Into<String>, is_error: bool) {
        self.flash = Some(Flash {
            message: message.into(),
            is_error,
            at: Instant::now(),
        });
    }

    pub fn active_flash(&self) -> Option<&Flash> {
        self.flash
            .as_ref()
            .filter(|flash| flash.at.elapsed().as_secs_f64() < FLASH_SECS)
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if key.code == KeyCode::Esc || (ctrl && key.code == KeyCode::Char('c')) {
            return Action::Quit;
        }
        if key.code == KeyCode::Tab {
            self.tab = self.tab.toggle();
            return Action::None;
        }

        match self.tab {
            Tab::Learn => self.handle_learn_key(key, ctrl),
            Tab::Quiz => self.handle_quiz_key(key, ctrl),
        }
    }

    fn handle_learn_key(&mut self, key: KeyEvent, ctrl: bool) -> Action {
        if ctrl {
            return match key.code {
                KeyCode::Char('n') => {
                    self.function = self.function.next();
                    Action::None
                }
                KeyCode::Char('p') => {
                    self.function = self.function.previous();
                    Action::None
                }
                KeyCode::Char('s') => Action::Submit,
                KeyCode::Char('o') => {
                    self.speed = self.speed.toggle();
                    if self
                        .result()
                        .is_some_and(|result| result.function.is_pronunciation())
                    {
                        Action::Resynthesize
                    } else {
                        Action::None
                    }
                }
                KeyCode::Char('a') => {
                    if self.audio_path().is_some() {
                        Action::Play
                    } else {
                        self.set_flash("No audio available.", true);
                        Action::None
                    }
                }
                KeyCode::Char('r') => {
                    if self.result().is_some() {
                        self.show_raw = !self.show_raw;
                    }
                    Action::None
                }
                _ => Action::None,
            };
        }

        edit(&mut self.input, key);
        Action::None
    }

    fn handle_quiz_key(&mut self, key: KeyEvent, ctrl: bool) -> Action {
        if ctrl {
            if key.code == KeyCode::Char('n') {
                self.quiz.next();
                self.quiz_feedback = None;
                self.answer.clear();
            }
            return Action::None;
        }

        if key.code == KeyCode::Enter {
            let outcome = self.quiz.submit(&self.answer.content());
            if outcome != QuizOutcome::Empty {
                self.answer.clear();
            }
            self.quiz_feedback = Some(outcome);
            return Action::None;
        }

        edit(&mut self.answer, key);
        Action::None
    }
}

fn edit(editor: &mut Editor, key: KeyEvent) {
    match key.code {
        KeyCode::Char(c) => editor.insert_char(c),
        KeyCode::Enter => editor.insert_newline(),
        KeyCode::Backspace => editor.backspace(),
        KeyCode::Delete => editor.delete(),
        KeyCode::Left => editor.move_left(),
        KeyCode::Right => editor.move_right(),
        KeyCode::Up => editor.move_up(),
        KeyCode::Down => editor.move_down(),
        KeyCode::Home => editor.move_home(),
        KeyCode::End => editor.move_end(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use rand::SeedableRng;

    use super::*;
    use crate::assistant::render;
    use crate::llm::ModelReply;
    use crate::quiz::{QUIZ_ITEMS, QuizItem};
    use crate::speech::AudioArtifact;

    const WEAK: &[QuizItem] = &[QuizItem {
        question: "What is the opposite of the word 'strong'?",
        answer: "weak",
    }];

    fn app() -> App {
        App::new(QuizEngine::new(QUIZ_ITEMS, StdRng::seed_from_u64(1)))
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn type_str(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
    }

    fn pronunciation_result(audio: AudioState) -> Outcome {
        let request = LearningRequest::new("good", LearningFunction::PronunciationGuide);
        let reply = ModelReply {
            raw_text: "### Pronunciation Guide\nguhd".to_string(),
        };
        Outcome::Rendered(render(&request, &reply, audio))
    }

    #[test]
    fn quit_keys() {
        let mut app = app();
        assert_eq!(app.handle_key(key(KeyCode::Esc)), Action::Quit);
        assert_eq!(app.handle_key(ctrl('c')), Action::Quit);
    }

    #[test]
    fn typing_builds_the_request() {
        let mut app = app();
        type_str(&mut app, "good");
        app.handle_key(ctrl('n'));
        app.handle_key(ctrl('n'));
        assert_eq!(app.handle_key(ctrl('s')), Action::Submit);
        assert_eq!(
            app.request(),
            LearningRequest::new("good", LearningFunction::Definition)
        );
    }

    #[test]
    fn speed_toggle_resynthesizes_only_pronunciation_results() {
        let mut app = app();
        assert_eq!(app.handle_key(ctrl('o')), Action::None);
        assert_eq!(app.speed, Speed::Slow);

        app.apply_outcome(pronunciation_result(AudioState::NotRequested));
        assert_eq!(app.handle_key(ctrl('o')), Action::Resynthesize);
        assert_eq!(app.speed, Speed::Normal);
    }

    #[test]
    fn play_requires_ready_audio() {
        let mut app = app();
        assert_eq!(app.handle_key(ctrl('a')), Action::None);
        assert!(app.active_flash().is_some_and(|flash| flash.is_error));

        app.apply_outcome(pronunciation_result(AudioState::Ready(AudioArtifact {
            path: PathBuf::from("a.mp3"),
            speed: Speed::Normal,
        })));
        assert_eq!(app.handle_key(ctrl('a')), Action::Play);
        assert_eq!(app.audio_path(), Some(Path::new("a.mp3")));
    }

    #[test]
    fn raw_toggle_needs_a_result_and_resets_on_new_outcome() {
        let mut app = app();
        app.handle_key(ctrl('r'));
        assert!(!app.show_raw);

        app.apply_outcome(pronunciation_result(AudioState::NotRequested));
        app.handle_key(ctrl('r'));
        assert!(app.show_raw);

        app.apply_outcome(Outcome::Failed("boom".into()));
        assert!(!app.show_raw);
        assert!(app.result().is_none());
    }

    #[test]
    fn quiz_tab_grades_on_enter() {
        let mut app = App::new(QuizEngine::new(WEAK, StdRng::seed_from_u64(1)));
        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.tab, Tab::Quiz);

        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.quiz_feedback, Some(QuizOutcome::Empty));

        type_str(&mut app, "strong");
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(
            app.quiz_feedback,
            Some(QuizOutcome::Incorrect { answer: "weak" })
        );
        assert!(app.answer.is_blank());

        type_str(&mut app, " Weak ");
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.quiz_feedback, Some(QuizOutcome::Correct));
        assert_eq!(app.quiz.correct(), 1);
    }

    #[test]
    fn next_question_clears_feedback() {
        let mut app = app();
        app.handle_key(key(KeyCode::Tab));
        type_str(&mut app, "nope");
        app.handle_key(key(KeyCode::Enter));
        app.handle_key(ctrl('n'));
        assert!(app.quiz_feedback.is_none());
        assert!(app.answer.is_blank());
    }

    #[test]
    fn tabs_keep_their_own_input() {
        let mut app = app();
        type_str(&mut app, "good");
        app.handle_key(key(KeyCode::Tab));
        type_str(&mut app, "mice");
        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.input.content(), "good");
        assert_eq!(app.answer.content(), "mice");
    }
}
