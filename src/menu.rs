//! Top-level menu loop and API key setup

use dialoguer::{Confirm, Input};

use crate::session::Session;
use crate::store::Credential;
use crate::Result;

/// One entry of the main menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    /// 1. Play a round
    Play,
    /// 2. Display score
    ShowScore,
    /// 3. Reset score
    ResetScore,
    /// 4. View favorite questions
    ShowFavorites,
    /// 5. Setup API key
    SetupCredential,
    /// 6. Exit game
    Exit,
}

impl MenuChoice {
    /// Parse a typed choice, `1` through `6`
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(Self::Play),
            "2" => Some(Self::ShowScore),
            "3" => Some(Self::ResetScore),
            "4" => Some(Self::ShowFavorites),
            "5" => Some(Self::SetupCredential),
            "6" => Some(Self::Exit),
            _ => None,
        }
    }
}

/// Source of typed console input
pub trait Prompter {
    /// Read the raw menu choice
    ///
    /// # Errors
    ///
    /// Returns error if the terminal cannot be read
    fn choice(&mut self) -> Result<String>;

    /// Ask a yes/no question
    ///
    /// # Errors
    ///
    /// Returns error if the terminal cannot be read
    fn confirm(&mut self, prompt: &str) -> Result<bool>;

    /// Read a new API key, possibly blank
    ///
    /// # Errors
    ///
    /// Returns error if the terminal cannot be read
    fn input_key(&mut self) -> Result<String>;
}

/// Terminal prompts via `dialoguer`
#[derive(Debug, Default)]
pub struct DialoguerPrompter;

impl Prompter for DialoguerPrompter {
    fn choice(&mut self) -> Result<String> {
        let input: String = Input::new()
            .with_prompt("Enter your choice (1-6)")
            .allow_empty(true)
            .interact_text()?;
        Ok(input)
    }

    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        Ok(Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()?)
    }

    fn input_key(&mut self) -> Result<String> {
        let key: String = Input::new()
            .with_prompt("Enter your OpenRouter API key")
            .allow_empty(true)
            .interact_text()?;
        Ok(key)
    }
}

fn print_menu() {
    println!("\n===== You or Me? Game =====");
    println!("1. Play a round");
    println!("2. Display score");
    println!("3. Reset score");
    println!("4. View favorite questions");
    println!("5. Setup API key");
    println!("6. Exit game");
    println!("===========================\n");
}

/// Interactive API key setup
///
/// With a key already set, shows it masked and only asks for a new one if
/// the player wants to change it. Returns `false` when a new key was asked
/// for and left blank; the old key, if any, is kept.
///
/// # Errors
///
/// Returns error if console input fails
pub fn setup_credential(session: &mut Session, prompter: &mut dyn Prompter) -> Result<bool> {
    println!("\n=== API Key Setup ===");
    println!("You need an OpenRouter API key to play this game.");
    println!("Get one at: https://openrouter.ai/");

    if let Some(current) = session.credential() {
        println!("Current API key: {}", current.masked());
        if !prompter.confirm("Do you want to change it?")? {
            return Ok(true);
        }
    }

    let Some(credential) = Credential::new(&prompter.input_key()?) else {
        println!("API key is required to play the game.");
        return Ok(false);
    };

    match session.set_credential(credential) {
        Ok(()) => println!("Configuration saved successfully!"),
        Err(e) => {
            tracing::warn!(error = %e, "failed to save credential");
            println!("Error saving config: {e}");
        }
    }
    Ok(true)
}

/// Run the game until the player exits
///
/// Without a stored key, setup runs first; leaving it blank ends the game
/// before the menu is shown. Closed console input (Ctrl-D) counts as
/// choosing to exit.
pub async fn run(session: &mut Session, prompter: &mut dyn Prompter) {
    println!("Welcome to 'You or Me?' Game!");
    session.speak("Welcome to You or Me Game!").await;

    if session.credential().is_none() {
        let accepted = setup_credential(session, prompter).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "console input closed during setup");
            false
        });
        if !accepted {
            println!("Cannot continue without an API key. Exiting...");
            return;
        }
    }

    loop {
        print_menu();
        session.speak("Please choose an option from the menu.").await;

        let choice = match prompter.choice() {
            Ok(input) => {
                let Some(choice) = MenuChoice::parse(&input) else {
                    tracing::debug!(input = %input, "invalid menu choice");
                    session.say("Invalid choice. Please try again.").await;
                    continue;
                };
                choice
            }
            Err(e) => {
                tracing::warn!(error = %e, "console input closed, exiting");
                MenuChoice::Exit
            }
        };

        tracing::debug!(?choice, "menu choice");
        match choice {
            MenuChoice::Play => {
                let outcome = session.play_round().await;
                tracing::debug!(?outcome, "round finished");
            }
            MenuChoice::ShowScore => {
                let score = session.display_score();
                session.say(&score).await;
            }
            MenuChoice::ResetScore => {
                let reset = session.reset_score();
                session.say(&reset).await;
            }
            MenuChoice::ShowFavorites => {
                println!("{}", session.display_favorites());
                session.speak("Here are your favorite questions.").await;
            }
            MenuChoice::SetupCredential => {
                if let Err(e) = setup_credential(session, prompter) {
                    tracing::warn!(error = %e, "API key setup aborted");
                }
            }
            MenuChoice::Exit => {
                println!("Thank you for playing 'You or Me?' Game!");
                session
                    .speak("Thank you for playing You or Me Game! Goodbye!")
                    .await;
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_six_choices() {
        let expected = [
            ("1", MenuChoice::Play),
            ("2", MenuChoice::ShowScore),
            ("3", MenuChoice::ResetScore),
            ("4", MenuChoice::ShowFavorites),
            ("5", MenuChoice::SetupCredential),
            (" 6 ", MenuChoice::Exit),
        ];
        for (input, choice) in expected {
            assert_eq!(MenuChoice::parse(input), Some(choice));
        }
    }

    #[test]
    fn rejects_anything_else() {
        for input in ["", "0", "7", "play", "1.", "12"] {
            assert_eq!(MenuChoice::parse(input), None, "{input:?}");
        }
    }
}
