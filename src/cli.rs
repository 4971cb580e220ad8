//! Terminal front end — a stdin/stdout REPL over the mini-app screens.

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::api::MiniAppClient;
use crate::flow::{AnswerFlow, AnswerOutcome, Choice, Field, StartOutcome, SubmitOutcome};
use crate::view::{self, Tab};

pub const HELP: &str = "\
me                 your profile
insight <@user>    what people say about someone
rate <@user>       start answering about someone
1 | 2              pick an option for the current question
< | >              swipe the current question left / right
edit <field> <1|2> change an earlier answer
show               show the questions so far
submit             send your answers
cancel             drop the current answers
search <text>      find users
recent             people you answered about recently
note <text>        set your profile note
quit";

/// One parsed input line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Me,
    Insight(String),
    Rate(String),
    Tap(Choice),
    Swipe(Choice),
    Edit(Field, Choice),
    Show,
    Submit,
    Cancel,
    Search(String),
    Recent,
    Note(String),
    Help,
    Quit,
}

fn parse_choice(s: &str) -> Result<Choice, String> {
    match s {
        "1" => Ok(Choice::First),
        "2" => Ok(Choice::Second),
        other => Err(format!("Expected 1 or 2, got \"{other}\"")),
    }
}

/// Parse a REPL line.
pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((h, r)) => (h, r.trim()),
        None => (line, ""),
    };

    let need_arg = |name: &str| -> Result<String, String> {
        if rest.is_empty() {
            Err(format!("Usage: {name} <value>"))
        } else {
            Ok(rest.to_string())
        }
    };

    match head.to_lowercase().as_str() {
        "me" | "profile" => Ok(Command::Me),
        "insight" => need_arg("insight").map(Command::Insight),
        "rate" | "answer" => need_arg("rate").map(Command::Rate),
        "1" | "2" => parse_choice(head).map(Command::Tap),
        "<" => Ok(Command::Swipe(Choice::First)),
        ">" => Ok(Command::Swipe(Choice::Second)),
        "edit" => {
            let (field, choice) = rest
                .split_once(char::is_whitespace)
                .ok_or_else(|| "Usage: edit <field> <1|2>".to_string())?;
            let field: Field = field.trim().parse()?;
            Ok(Command::Edit(field, parse_choice(choice.trim())?))
        }
        "show" => Ok(Command::Show),
        "submit" | "send" => Ok(Command::Submit),
        "cancel" => Ok(Command::Cancel),
        "search" => need_arg("search").map(Command::Search),
        "recent" => Ok(Command::Recent),
        "note" => Ok(Command::Note(rest.to_string())),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" | "/quit" => Ok(Command::Quit),
        other => Err(format!("Unknown command: {other}. Type 'help'.")),
    }
}

/// REPL state: the backend client, the answer flow, and the active tab.
pub struct MiniAppCli {
    client: MiniAppClient,
    flow: AnswerFlow,
    tab: Tab,
}

impl MiniAppCli {
    pub fn new(client: MiniAppClient, flow: AnswerFlow) -> Self {
        Self {
            client,
            flow,
            tab: Tab::default(),
        }
    }

    /// Read commands from stdin until EOF or `quit`.
    pub async fn run(&mut self, prefill: Option<String>) -> std::io::Result<()> {
        if let Some(target) = prefill {
            println!("{}\n", self.execute(Command::Rate(target)).await);
        } else {
            println!("{}\n", self.execute(Command::Me).await);
        }

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        eprint!("{}> ", self.tab);

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                eprint!("{}> ", self.tab);
                continue;
            }
            match parse_command(&line) {
                Ok(Command::Quit) => break,
                Ok(command) => println!("\n{}\n", self.execute(command).await),
                Err(e) => eprintln!("{e}"),
            }
            eprint!("{}> ", self.tab);
        }
        Ok(())
    }

    /// Run one command and return the text to show.
    pub async fn execute(&mut self, command: Command) -> String {
        match command {
            Command::Me => {
                self.tab = Tab::Profile;
                match self.client.me().await {
                    Ok(data) => view::render_my_profile(&data),
                    Err(e) => format!("Error: {e}"),
                }
            }
            Command::Insight(target) => {
                self.tab = Tab::Insight;
                match self.client.insight(&target).await {
                    Ok(insight) => view::render_insight(&insight),
                    Err(e) => format!("Error: {e}"),
                }
            }
            Command::Rate(target) => {
                self.tab = Tab::Answer;
                match self.flow.open(&target, &self.client).await {
                    StartOutcome::Cleared => "Enter a @username to answer about.".to_string(),
                    StartOutcome::Unchanged | StartOutcome::Started => self.flow_screen(),
                }
            }
            Command::Tap(choice) => {
                let Some(field) = self.flow.state().current_field() else {
                    return self.nothing_to_answer();
                };
                self.flow.answer(field, choice);
                self.flow_screen()
            }
            Command::Swipe(choice) => {
                if !self.flow.swipe_start(0.0) {
                    return self.nothing_to_answer();
                }
                // A keyboard swipe always travels past the threshold.
                let distance = self.flow.swipe_threshold() + 1.0;
                let x = match choice {
                    Choice::First => -distance,
                    Choice::Second => distance,
                };
                self.flow.swipe_move(x);
                self.flow.swipe_end();
                self.flow_screen()
            }
            Command::Edit(field, choice) => match self.flow.answer(field, choice) {
                AnswerOutcome::Rejected => format!("\"{field}\" isn't open yet."),
                _ => self.flow_screen(),
            },
            Command::Show => {
                self.tab = Tab::Answer;
                self.flow_screen()
            }
            Command::Submit => match self.flow.submit(&self.client).await {
                SubmitOutcome::Sent(receipt) => receipt.message,
                SubmitOutcome::Invalid(e) => format!("Can't send yet: {e}"),
                SubmitOutcome::Failed(message) => format!("Error: {message}"),
            },
            Command::Cancel => {
                self.flow.cancel();
                "Answers dropped.".to_string()
            }
            Command::Search(query) => match self.client.search_users(&query).await {
                Ok(items) if items.is_empty() => "No one found.".to_string(),
                Ok(items) => items.join("\n"),
                Err(e) => format!("Error: {e}"),
            },
            Command::Recent => match self.client.recent_targets().await {
                Ok(items) if items.is_empty() => "No recent answers.".to_string(),
                Ok(items) => items.join("\n"),
                Err(e) => format!("Error: {e}"),
            },
            Command::Note(note) => match self.client.set_profile_note(&note).await {
                Ok(saved) if saved.is_empty() => "Note cleared.".to_string(),
                Ok(saved) => format!("Note saved: {saved}"),
                Err(e) => format!("Error: {e}"),
            },
            Command::Help => HELP.to_string(),
            Command::Quit => String::new(),
        }
    }

    fn nothing_to_answer(&self) -> String {
        if self.flow.state().is_ready() {
            "All questions answered. Type 'submit'.".to_string()
        } else {
            "Start with 'rate <@user>'.".to_string()
        }
    }

    fn flow_screen(&self) -> String {
        let mut text = String::new();
        if let Some(display) = self.flow.display() {
            text.push_str(&format!("About {}\n\n", display.name));
        }
        text.push_str(&view::render_flow(self.flow.state()));
        if let Some(status) = self.flow.status_line() {
            text.push_str(&format!("\n{status}"));
        }
        text
    }
}
