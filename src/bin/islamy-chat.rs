//! Terminal chat client for the Islamy relay
//!
//! Type a question and press enter. Commands:
//! `/lang en|ar`, `/suggest`, `/use N` (then an empty line to send), `/quit`.
//! Ctrl-C cancels a send in flight and exits at the prompt.

use islamy::config::ClientConfig;
use islamy::conversation::Role;
use islamy::locale::{text, FilePreferences, Locale, LocaleStore, TranslationKey};
use islamy::session::{ChatSession, SendOutcome};
use islamy::transport::{HttpTransport, Transport};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so they don't interleave with the conversation
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "islamy=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = ClientConfig::from_env();
    tracing::info!(server = %config.server_url, prefs = %config.prefs_path.display(), "Starting chat client");

    let prefs = Arc::new(FilePreferences::open(config.prefs_path.clone()));
    let locale = LocaleStore::new(prefs);
    let _sync = locale.spawn_sync();
    locale.on_change(|new_locale| {
        println!(
            "[{} / {}]",
            new_locale.native_name(),
            new_locale.direction().as_str()
        );
    });

    let transport = HttpTransport::new(&config.server_url)?;
    let session = ChatSession::new(transport, Arc::clone(&locale))
        .with_send_timeout(config.send_timeout);

    print_welcome(&session);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else { break };

        match Command::parse(&line) {
            Command::Quit => break,
            Command::Language(code) => {
                if !locale.set_raw(code) {
                    println!("en | ar");
                }
            }
            Command::Suggest => print_suggestions(&session),
            Command::UseSuggestion(index) => {
                match index.checked_sub(1).and_then(|i| session.select_suggestion(i)) {
                    Some(prompt) => println!("> {prompt}"),
                    None => print_suggestions(&session),
                }
            }
            Command::Send(input) => {
                // A bare enter sends whatever a suggestion put in the input
                if !input.is_empty() {
                    session.set_input(input);
                }
                send(&session).await;
            }
        }
    }

    Ok(())
}

enum Command<'a> {
    Quit,
    Language(&'a str),
    Suggest,
    UseSuggestion(usize),
    Send(&'a str),
}

impl<'a> Command<'a> {
    fn parse(line: &'a str) -> Self {
        let trimmed = line.trim();
        let mut words = trimmed.split_whitespace();
        match words.next() {
            Some("/quit") => Command::Quit,
            Some("/lang") => Command::Language(words.next().unwrap_or_default()),
            Some("/suggest") => Command::Suggest,
            Some("/use") => {
                Command::UseSuggestion(words.next().and_then(|n| n.parse().ok()).unwrap_or(0))
            }
            _ => Command::Send(trimmed),
        }
    }
}

async fn send<T: Transport + 'static>(session: &ChatSession<T>) {
    let locale = session.locale().get();
    println!("{}", text(TranslationKey::LoadingMessage, locale));

    let submit = session.submit_input();
    tokio::pin!(submit);
    let finished = tokio::select! {
        result = &mut submit => Some(result),
        _ = tokio::signal::ctrl_c() => None,
    };
    let result = match finished {
        Some(result) => result,
        None => {
            session.cancel();
            submit.await
        }
    };

    // Re-read: the locale may have changed while waiting
    let locale = session.locale().get();
    match result {
        Ok(SendOutcome::Replied) => {
            if let Some(message) = session.conversation().last() {
                print_message(message.role(), message.content(), locale);
            }
        }
        Ok(SendOutcome::Failed(error)) => {
            let (title, description) = error.render(locale);
            println!("{title}: {description}");
        }
        Err(e) => match e.render(locale) {
            Some((title, description)) => println!("{title}: {description}"),
            None => tracing::debug!(error = %e, "Submit rejected"),
        },
    }
}

fn print_welcome<T: Transport + 'static>(session: &ChatSession<T>) {
    let locale = session.locale().get();
    for line in welcome_header(locale) {
        println!("{line}");
    }
    print_suggestions(session);
    println!("{}", input_hint(locale));
}

/// Lines shown above the suggested questions
fn welcome_header(locale: Locale) -> [&'static str; 6] {
    [
        text(TranslationKey::WelcomeTitle, locale),
        text(TranslationKey::WelcomeSubtitle, locale),
        "",
        text(TranslationKey::ChatTitle, locale),
        text(TranslationKey::ChatWelcome, locale),
        text(TranslationKey::EmptyMessage, locale),
    ]
}

/// Input prompt; enter acts as the send button
fn input_hint(locale: Locale) -> String {
    format!(
        "{} [\u{21b5} {}]",
        text(TranslationKey::ChatPlaceholder, locale),
        text(TranslationKey::SendButton, locale)
    )
}

fn print_suggestions<T: Transport + 'static>(session: &ChatSession<T>) {
    for (i, prompt) in session.suggested_prompts().iter().enumerate() {
        println!("  {}. {prompt}", i + 1);
    }
}

fn print_message(role: Role, content: &str, locale: Locale) {
    let initial = match role {
        Role::User => text(TranslationKey::UserInitial, locale),
        Role::Assistant => text(TranslationKey::AssistantInitial, locale),
    };
    println!("{initial}: {content}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_welcome_shows_chat_title() {
        let english = welcome_header(Locale::En);
        assert_eq!(english[0], "Islamy");
        assert!(english.contains(&"Ask about Islamic knowledge"));

        let arabic = welcome_header(Locale::Ar);
        assert_eq!(arabic[0], "إسلامي");
        assert!(arabic.contains(&"اسأل عن المعرفة الإسلامية"));
    }

    #[test]
    fn test_input_hint_names_send_action() {
        assert_eq!(input_hint(Locale::En), "Ask a question about Islam... [\u{21b5} Send]");
        let arabic = input_hint(Locale::Ar);
        assert!(arabic.starts_with("اسأل سؤالاً عن الإسلام..."));
        assert!(arabic.ends_with("إرسال]"));
    }

    #[test]
    fn test_command_parse() {
        assert!(matches!(Command::parse(" /quit "), Command::Quit));
        assert!(matches!(Command::parse("/lang ar"), Command::Language("ar")));
        assert!(matches!(Command::parse("/use 2"), Command::UseSuggestion(2)));
        assert!(matches!(Command::parse("/use x"), Command::UseSuggestion(0)));
        assert!(matches!(Command::parse("What is Hajj?"), Command::Send("What is Hajj?")));
    }
}
