use anyhow::Result;
use std::io::{self, BufRead, Write};

use crate::agent::ChatAgent;
use crate::llm::provider::ChatProvider;
use crate::notify::Notify;

const GREETING: &str = "Welcome to NeuraVis Technologies! Ask about our mission, services, or \
                        team, or leave your contact details if you'd like to work with us.\n\
                        Type /help for commands.";

const HELP_TEXT: &str = "Available commands:\n  /help   Show this command list\n  /quit   Leave the chat";

#[derive(Debug, Clone, PartialEq, Eq)]
enum ReplAction {
    Help,
    Quit,
    Unknown(String),
    Say(String),
    Skip,
}

/// Minimal line-oriented chat surface. The REPL owns the history pairs; the
/// agent itself stays stateless between turns.
pub async fn run_repl<P: ChatProvider, N: Notify>(agent: &ChatAgent<P, N>) -> Result<()> {
    println!("{GREETING}");
    let mut history: Vec<(String, String)> = Vec::new();

    loop {
        print!("you> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            break;
        }

        match classify_line(&line) {
            ReplAction::Skip => {}
            ReplAction::Help => println!("{HELP_TEXT}"),
            ReplAction::Quit => break,
            ReplAction::Unknown(name) => println!("unknown command '/{name}'. Try /help"),
            ReplAction::Say(message) => {
                let reply = agent.reply(&message, &history).await;
                println!("frontdesk> {reply}");
                history.push((message, reply));
            }
        }
    }

    Ok(())
}

fn classify_line(line: &str) -> ReplAction {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return ReplAction::Skip;
    }

    match trimmed {
        "/help" => ReplAction::Help,
        "/quit" | "/exit" => ReplAction::Quit,
        _ => match trimmed.strip_prefix('/') {
            Some(rest) => {
                let name = rest.split_whitespace().next().unwrap_or("").to_string();
                ReplAction::Unknown(name)
            }
            None => ReplAction::Say(trimmed.to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::{ReplAction, classify_line};

    #[test]
    fn blank_lines_are_skipped() {
        assert_eq!(classify_line("   \n"), ReplAction::Skip);
    }

    #[test]
    fn known_commands_are_recognized() {
        assert_eq!(classify_line("/help\n"), ReplAction::Help);
        assert_eq!(classify_line("/quit"), ReplAction::Quit);
        assert_eq!(classify_line("/exit"), ReplAction::Quit);
    }

    #[test]
    fn unknown_commands_report_their_name() {
        assert_eq!(
            classify_line("/mode ai"),
            ReplAction::Unknown("mode".to_string())
        );
    }

    #[test]
    fn anything_else_is_sent_to_the_agent() {
        assert_eq!(
            classify_line("what services do you offer?\n"),
            ReplAction::Say("what services do you offer?".to_string())
        );
    }
}
