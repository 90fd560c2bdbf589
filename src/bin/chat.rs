//! Terminal chat client for the NeuroPilot API
//!
//! Keeps the transcript locally and sends only the newest message per call.

use std::io;
use std::time::Duration;

use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use neuropilot::api::{ChatReply, ChatRequest};
use neuropilot::llm::MODEL_NAMES;
use neuropilot::system_prompt::DEFAULT_SYSTEM_PROMPT;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph, Wrap};
use ratatui::{DefaultTerminal, Frame};
use thiserror::Error;

#[derive(Parser, Debug)]
#[command(name = "neuropilot-chat", about = "Chat with a NeuroPilot server from the terminal")]
struct Args {
    /// Base URL of the API server
    #[arg(long, default_value = "http://127.0.0.1:8000")]
    server: String,

    /// Initial system prompt
    #[arg(long, default_value = DEFAULT_SYSTEM_PROMPT)]
    system_prompt: String,

    /// Initial model
    #[arg(long, value_parser = clap::builder::PossibleValuesParser::new(MODEL_NAMES))]
    model: Option<String>,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 300)]
    timeout: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Message,
    SystemPrompt,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Entry {
    User(String),
    Assistant(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Status {
    Info(String),
    Error(String),
}

/// Why a chat call produced no usable reply
#[derive(Debug, Error)]
enum SendError {
    #[error("Failed to connect to the server: {0}")]
    Transport(String),
    /// Non-2xx status, or a body that is neither `messages` nor `error`
    #[error("Failed to get a response. Please try again.")]
    UnexpectedReply,
}

impl From<ureq::Error> for SendError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(..) => SendError::UnexpectedReply,
            ureq::Error::Transport(t) => SendError::Transport(t.to_string()),
        }
    }
}

#[derive(Debug, PartialEq)]
enum Action {
    None,
    Quit,
    Send(ChatRequest),
}

struct App {
    model_index: usize,
    system_prompt: String,
    input: String,
    focus: Focus,
    transcript: Vec<Entry>,
    status: Option<Status>,
}

impl App {
    fn new(system_prompt: String, model: Option<&str>) -> Self {
        let model_index = model
            .and_then(|m| MODEL_NAMES.iter().position(|name| *name == m))
            .unwrap_or(0);
        Self {
            model_index,
            system_prompt,
            input: String::new(),
            focus: Focus::Message,
            transcript: Vec::new(),
            status: None,
        }
    }

    fn model(&self) -> &'static str {
        MODEL_NAMES[self.model_index]
    }

    fn handle_key(&mut self, key: KeyEvent) -> Action {
        if key.kind != KeyEventKind::Press {
            return Action::None;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Esc => return Action::Quit,
            KeyCode::Char('c') if ctrl => return Action::Quit,
            KeyCode::Char('l') if ctrl => self.clear(),
            KeyCode::Tab => {
                self.model_index = (self.model_index + 1) % MODEL_NAMES.len();
            }
            KeyCode::F(2) => {
                self.focus = match self.focus {
                    Focus::Message => Focus::SystemPrompt,
                    Focus::SystemPrompt => Focus::Message,
                };
            }
            KeyCode::Enter => match self.focus {
                Focus::Message => return self.submit(),
                Focus::SystemPrompt => self.focus = Focus::Message,
            },
            KeyCode::Backspace => {
                self.field_mut().pop();
            }
            KeyCode::Char(c) if !ctrl => self.field_mut().push(c),
            _ => {}
        }
        Action::None
    }

    fn field_mut(&mut self) -> &mut String {
        match self.focus {
            Focus::Message => &mut self.input,
            Focus::SystemPrompt => &mut self.system_prompt,
        }
    }

    fn submit(&mut self) -> Action {
        let text = self.input.trim().to_string();
        if text.is_empty() {
            self.status = Some(Status::Error("Please enter a message.".to_string()));
            return Action::None;
        }

        self.input.clear();
        self.transcript.push(Entry::User(text.clone()));
        self.status = Some(Status::Info("Thinking...".to_string()));
        Action::Send(ChatRequest {
            messages: vec![text],
            model_name: self.model().to_string(),
            system_prompt: self.system_prompt.clone(),
        })
    }

    fn apply_reply(&mut self, result: Result<ChatReply, SendError>) {
        match result {
            Ok(ChatReply::Success { messages }) => {
                if let Some(last) = messages.into_iter().last() {
                    self.transcript.push(Entry::Assistant(last.content));
                }
                self.status = None;
            }
            Ok(ChatReply::Failure { error }) => self.status = Some(Status::Error(error)),
            Err(e) => self.status = Some(Status::Error(e.to_string())),
        }
    }

    fn clear(&mut self) {
        self.transcript.clear();
        self.status = Some(Status::Info("Chat history cleared.".to_string()));
    }

    fn render(&self, frame: &mut Frame<'_>) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(36), Constraint::Min(20)])
            .split(frame.area());

        self.render_sidebar(frame, columns[0]);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(5), Constraint::Length(3), Constraint::Length(1)])
            .split(columns[1]);

        self.render_transcript(frame, rows[0]);

        let input = Paragraph::new(self.input.as_str())
            .block(focus_block("Message", self.focus == Focus::Message));
        frame.render_widget(input, rows[1]);

        let status = match &self.status {
            Some(Status::Error(msg)) => Line::styled(msg.clone(), Style::default().fg(Color::Red)),
            Some(Status::Info(msg)) => Line::styled(msg.clone(), Style::default().fg(Color::DarkGray)),
            None => Line::styled(
                "Enter send | Tab model | F2 prompt | Ctrl-L clear | Esc quit",
                Style::default().fg(Color::DarkGray),
            ),
        };
        frame.render_widget(Paragraph::new(status), rows[2]);
    }

    fn render_sidebar(&self, frame: &mut Frame<'_>, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(u16::try_from(MODEL_NAMES.len()).unwrap_or(u16::MAX).saturating_add(2)),
                Constraint::Min(3),
            ])
            .split(area);

        let items: Vec<ListItem<'_>> = MODEL_NAMES
            .iter()
            .enumerate()
            .map(|(i, name)| {
                if i == self.model_index {
                    ListItem::new(Line::from(vec![
                        Span::styled("> ", Style::default().fg(Color::Cyan)),
                        Span::styled(*name, Style::default().add_modifier(Modifier::BOLD)),
                    ]))
                } else {
                    ListItem::new(Line::from(format!("  {name}")))
                }
            })
            .collect();
        frame.render_widget(
            List::new(items).block(Block::default().title("Model").borders(Borders::ALL)),
            rows[0],
        );

        let prompt = Paragraph::new(self.system_prompt.as_str())
            .wrap(Wrap { trim: false })
            .block(focus_block("System prompt", self.focus == Focus::SystemPrompt));
        frame.render_widget(prompt, rows[1]);
    }

    fn render_transcript(&self, frame: &mut Frame<'_>, area: Rect) {
        let mut lines = Vec::new();
        for entry in &self.transcript {
            let (label, color, content) = match entry {
                Entry::User(text) => ("You:", Color::Green, text),
                Entry::Assistant(text) => ("Assistant:", Color::Cyan, text),
            };
            lines.push(Line::styled(
                label,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ));
            lines.extend(content.lines().map(|l| Line::from(l.to_string())));
            lines.push(Line::default());
        }

        let height = area.height.saturating_sub(2);
        let scroll = u16::try_from(lines.len())
            .unwrap_or(u16::MAX)
            .saturating_sub(height);
        let transcript = Paragraph::new(Text::from(lines))
            .wrap(Wrap { trim: false })
            .scroll((scroll, 0))
            .block(Block::default().title("Chat").borders(Borders::ALL));
        frame.render_widget(transcript, area);
    }
}

fn focus_block(title: &str, focused: bool) -> Block<'_> {
    let block = Block::default().title(title).borders(Borders::ALL);
    if focused {
        block.border_style(Style::default().fg(Color::Cyan))
    } else {
        block
    }
}

fn send(agent: &ureq::Agent, url: &str, request: &ChatRequest) -> Result<ChatReply, SendError> {
    decode(agent.post(url).send_json(request)?)
}

fn decode(response: ureq::Response) -> Result<ChatReply, SendError> {
    response
        .into_json::<ChatReply>()
        .map_err(|_| SendError::UnexpectedReply)
}

fn run(terminal: &mut DefaultTerminal, app: &mut App, agent: &ureq::Agent, url: &str) -> io::Result<()> {
    loop {
        terminal.draw(|frame| app.render(frame))?;

        if !event::poll(Duration::from_millis(100))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };

        match app.handle_key(key) {
            Action::None => {}
            Action::Quit => return Ok(()),
            Action::Send(request) => {
                terminal.draw(|frame| app.render(frame))?;
                let result = send(agent, url, &request);
                app.apply_reply(result);
            }
        }
    }
}

fn main() -> io::Result<()> {
    let args = Args::parse();
    let url = format!("{}/chat", args.server.trim_end_matches('/'));
    let agent = ureq::AgentBuilder::new()
        .timeout(Duration::from_secs(args.timeout))
        .build();
    let mut app = App::new(args.system_prompt, args.model.as_deref());

    let mut terminal = ratatui::init();
    let result = run(&mut terminal, &mut app, &agent, &url);
    ratatui::restore();
    result
}
