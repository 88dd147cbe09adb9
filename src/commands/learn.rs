use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{
        self, Event, KeyEventKind, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Position, Rect},
    text::{Line, Span, Text},
    widgets::{Paragraph, Wrap},
};
use tracing::{info, warn};

use crate::app::{Action, App, Tab};
use crate::assistant::{Assistant, AudioState, Outcome, WORKING_MESSAGE};
use crate::function::LearningFunction;
use crate::llm::ModelClient;
use crate::quiz::{QuizEngine, QuizOutcome};
use crate::speech::SpeechSynthesizer;
use crate::tui::{Editor, Theme, Tone, render_markdown};
use crate::utils::pluralize;

type Term = Terminal<CrosstermBackend<io::Stdout>>;

pub async fn run<M, S>(assistant: Assistant<M, S>) -> Result<()>
where
    M: ModelClient,
    S: SpeechSynthesizer,
{
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_ALL_KEYS_AS_ESCAPE_CODES
                | KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
        )
    )
    .context("failed to configure terminal")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to start terminal")?;

    let mut app = App::new(QuizEngine::from_entropy());
    let loop_result = event_loop(&mut terminal, &mut app, &assistant).await;

    teardown_terminal(&mut terminal)?;
    loop_result
}

async fn event_loop<M, S>(
    terminal: &mut Term,
    app: &mut App,
    assistant: &Assistant<M, S>,
) -> Result<()>
where
    M: ModelClient,
    S: SpeechSynthesizer,
{
    loop {
        terminal
            .draw(|frame| draw(frame, app))
            .context("failed to render frame")?;

        if !event::poll(Duration::from_millis(16))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match app.handle_key(key) {
            Action::None => {}
            Action::Quit => break Ok(()),
            Action::Submit => {
                let request = app.request();
                redraw_busy(terminal, app)?;
                let outcome = assistant.process(&request, app.speed).await;
                app.busy = false;
                app.apply_outcome(outcome);
            }
            Action::Resynthesize => {
                let speed = app.speed;
                redraw_busy(terminal, app)?;
                if let Some(result) = app.result_mut() {
                    assistant.resynthesize(result, speed).await;
                }
                app.busy = false;
            }
            Action::Play => {
                if let Some(path) = app.audio_path().map(|path| path.to_path_buf()) {
                    info!(path = %path.display(), "playing audio");
                    if let Err(err) = open::that(&path) {
                        warn!(error = %err, "failed to open audio player");
                        app.set_flash(format!("Could not play audio: {err}"), true);
                    }
                }
            }
        }
    }
}

fn redraw_busy(terminal: &mut Term, app: &mut App) -> Result<()> {
    app.busy = true;
    terminal
        .draw(|frame| draw(frame, app))
        .context("failed to render frame")?;
    Ok(())
}

fn teardown_terminal(terminal: &mut Term) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(
        terminal.backend_mut(),
        PopKeyboardEnhancementFlags,
        LeaveAlternateScreen
    )
    .context("failed to restore terminal")?;
    terminal.show_cursor().context("failed to show cursor")?;
    Ok(())
}

fn draw(frame: &mut Frame, app: &mut App) {
    let area = frame.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(8),
            Constraint::Length(4),
        ])
        .split(area);

    frame.render_widget(Paragraph::new(tab_line(app.tab)), chunks[0]);
    match app.tab {
        Tab::Learn => draw_learn(frame, app, chunks[1]),
        Tab::Quiz => draw_quiz(frame, app, chunks[1]),
    }

    let footer = Paragraph::new(instructions_text(app))
        .block(Theme::controls_panel());
    frame.render_widget(footer, chunks[2]);
}

fn draw_learn(frame: &mut Frame, app: &mut App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(30), Constraint::Min(20)])
        .split(area);

    let sidebar = Paragraph::new(function_list(app))
        .block(Theme::panel("Choose a function"));
    frame.render_widget(sidebar, columns[0]);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(7), Constraint::Min(4)])
        .split(columns[1]);

    draw_editor(
        frame,
        &mut app.input,
        rows[0],
        "Enter a word, sentence, or paragraph",
        !app.busy,
    );

    let (title, text) = if app.busy {
        (
            app.function.title().to_string(),
            Text::from(Line::styled(WORKING_MESSAGE, Theme::tone(Tone::Info))),
        )
    } else {
        result_text(app)
    };
    let result = Paragraph::new(text)
        .block(Theme::focused_panel(title))
        .wrap(Wrap { trim: false });
    frame.render_widget(result, rows[1]);
}

fn draw_quiz(frame: &mut Frame, app: &mut App, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(3),
            Constraint::Min(3),
        ])
        .split(area);

    let score = format!(
        "🎯 Quiz • {} correct of {}",
        app.quiz.correct(),
        pluralize("answer", app.quiz.answered())
    );
    let question = Paragraph::new(Line::styled(
        app.quiz.current().question,
        Theme::emphasis(),
    ))
    .block(Theme::panel(score))
    .wrap(Wrap { trim: false });
    frame.render_widget(question, rows[0]);

    draw_editor(frame, &mut app.answer, rows[1], "Your answer", true);

    let feedback = Paragraph::new(quiz_feedback_lines(app.quiz_feedback.as_ref()))
        .block(Theme::panel("Feedback"))
        .wrap(Wrap { trim: false });
    frame.render_widget(feedback, rows[2]);
}

fn draw_editor(frame: &mut Frame, editor: &mut Editor, area: Rect, title: &str, focused: bool) {
    let view_height = area.height.saturating_sub(2) as usize;
    editor.ensure_cursor_visible(view_height);
    let scroll = editor.scroll_top() as u16;

    let widget = Paragraph::new(editor.content())
        .block(Theme::focused_panel(title))
        .scroll((scroll, 0));
    frame.render_widget(widget, area);

    if focused && let Some(position) = cursor_position(editor, area) {
        frame.set_cursor_position(position);
    }
}

/// Screen cell of the editor cursor inside its bordered panel, if it is visible.
fn cursor_position(editor: &Editor, area: Rect) -> Option<Position> {
    let (row, _) = editor.cursor();
    let x = u16::try_from(editor.cursor_width())
        .ok()?
        .checked_add(area.x + 1)?;
    let y = u16::try_from(row.checked_sub(editor.scroll_top())?)
        .ok()?
        .checked_add(area.y + 1)?;
    (x < area.right().saturating_sub(1) && y < area.bottom().saturating_sub(1))
        .then(|| Position::new(x, y))
}

fn tab_line(active: Tab) -> Line<'static> {
    Line::from(vec![
        Theme::styled(" English Learning Assistant ", Tone::Accent),
        Theme::bullet(),
        Theme::tab_chip("Learn", active == Tab::Learn),
        Theme::span(" "),
        Theme::tab_chip("Quiz", active == Tab::Quiz),
    ])
}

fn function_list(app: &App) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = LearningFunction::ALL
        .iter()
        .map(|function| {
            if *function == app.function {
                Line::styled(format!("› {}", function.label()), Theme::selected())
            } else {
                Line::from(format!("  {}", function.label()))
            }
        })
        .collect();

    if app.function.is_pronunciation() {
        lines.push(Line::default());
        lines.push(Line::from(vec![
            Theme::span("Speed: "),
            Theme::styled(app.speed.label(), Tone::Accent),
        ]));
    }
    lines
}

/// Title and body for the result panel in its current state.
fn result_text(app: &App) -> (String, Text<'static>) {
    match &app.outcome {
        None => (
            "Result".to_string(),
            Text::from(Line::styled(
                "Type some English text and press Ctrl+S.",
                Theme::dim(),
            )),
        ),
        Some(Outcome::Rejected(message)) => (
            "Result".to_string(),
            Text::from(Line::styled(message.clone(), Theme::tone(Tone::Warning))),
        ),
        Some(Outcome::Failed(message)) => (
            "Result".to_string(),
            Text::from(Line::styled(message.clone(), Theme::tone(Tone::Danger))),
        ),
        Some(Outcome::Rendered(result)) => {
            let mut text = if app.show_raw {
                Text::from(result.raw_reply.clone())
            } else if result.section_found {
                render_markdown(&result.body)
            } else {
                Text::from(Line::styled(result.body.clone(), Theme::tone(Tone::Warning)))
            };
            if let Some(line) = audio_line(&result.audio) {
                text.lines.push(Line::default());
                text.lines.push(line);
            }
            let title = if app.show_raw {
                format!("{} (raw reply)", result.title)
            } else {
                result.title.to_string()
            };
            (title, text)
        }
    }
}

fn audio_line(audio: &AudioState) -> Option<Line<'static>> {
    match audio {
        AudioState::NotRequested => None,
        AudioState::Ready(artifact) => Some(Line::from(vec![
            Span::styled(format!("🔊 Audio ready ({})", artifact.speed), Theme::tone(Tone::Success)),
            Theme::bullet(),
            Theme::key_chip("Ctrl+A"),
            Theme::span(" play"),
        ])),
        AudioState::Unavailable(message) => {
            Some(Line::styled(format!("🔇 {message}"), Theme::tone(Tone::Warning)))
        }
    }
}

fn quiz_feedback_lines(feedback: Option<&QuizOutcome>) -> Vec<Line<'static>> {
    match feedback {
        None => vec![Line::styled(
            "Type your answer and press Enter.",
            Theme::dim(),
        )],
        Some(QuizOutcome::Empty) => vec![Line::styled(
            "Please enter an answer.",
            Theme::tone(Tone::Warning),
        )],
        Some(QuizOutcome::Correct) => vec![Line::styled("✅ Correct!", Theme::tone(Tone::Success))],
        Some(QuizOutcome::Incorrect { answer }) => vec![Line::from(vec![
            Span::styled("❌ Incorrect. ", Theme::tone(Tone::Danger)),
            Theme::span("The correct answer is: "),
            Theme::styled(*answer, Tone::Accent),
        ])],
    }
}

fn instructions_text(app: &App) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let exit = [
        Theme::bullet(),
        Theme::key_chip("Tab"),
        Theme::span(" switch"),
        Theme::bullet(),
        Theme::key_chip("Esc"),
        Theme::span(" / "),
        Theme::key_chip("Ctrl+C"),
        Theme::span(" exit"),
    ];

    if app.busy {
        lines.push(Line::from(vec![Span::styled(WORKING_MESSAGE, Theme::tone(Tone::Info))]));
        return lines;
    }

    match app.tab {
        Tab::Learn => {
            let mut line = vec![
                Theme::key_chip("Ctrl+S"),
                Theme::span(" process"),
                Theme::bullet(),
                Theme::key_chip("Ctrl+N"),
                Theme::span(" / "),
                Theme::key_chip("Ctrl+P"),
                Theme::span(" function"),
            ];
            if app.function.is_pronunciation() {
                line.push(Theme::bullet());
                line.push(Theme::key_chip("Ctrl+O"));
                line.push(Theme::span(" speed"));
            }
            if app.result().is_some() {
                line.push(Theme::bullet());
                line.push(Theme::key_chip("Ctrl+R"));
                line.push(Theme::span(" raw"));
            }
            line.extend(exit);
            lines.push(Line::from(line));
        }
        Tab::Quiz => {
            let mut line = vec![
                Theme::key_chip("Enter"),
                Theme::span(" check"),
                Theme::bullet(),
                Theme::key_chip("Ctrl+N"),
                Theme::span(" next question"),
            ];
            line.extend(exit);
            lines.push(Line::from(line));
        }
    }

    if let Some(flash) = app.active_flash() {
        let style = if flash.is_error {
            Theme::tone(Tone::Danger)
        } else {
            Theme::tone(Tone::Success)
        };
        lines.push(Line::from(vec![Span::styled(flash.message.clone(), style)]));
    }

    lines
}
