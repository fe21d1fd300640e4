mod common;

use std::io::Cursor;
use std::sync::Arc;

use cinesleuth::console::{Console, YesNo};
use cinesleuth::game::{GameStatus, SessionController};
use cinesleuth::history::HistoryLog;
use cinesleuth::llm::{CredentialPool, ProviderError, RotatingClient};
use common::{controller, keys, quota, ScriptedBackend};
use tempfile::TempDir;
use tokio::sync::mpsc;

fn console(input: &str) -> Console<Cursor<Vec<u8>>, Vec<u8>> {
    Console::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
}

fn output(console: Console<Cursor<Vec<u8>>, Vec<u8>>) -> String {
    String::from_utf8(console.into_output()).unwrap()
}

#[tokio::test]
async fn test_exit_at_start_prompt() {
    let backend = Arc::new(ScriptedBackend::new());
    let mut controller = controller(&backend, &["key"]);
    let mut console = console("exit\n");

    let session = console.run(&mut controller, 20).await.unwrap();

    assert_eq!(session.status(), GameStatus::Aborted);
    assert_eq!(backend.call_count(), 0);
    let out = output(console);
    assert!(out.contains("Welcome to Cine-Sleuth!"));
    assert!(out.contains("up to 20 questions"));
    assert!(out.contains("Goodbye!"));
}

#[tokio::test]
async fn test_correct_guess_is_recorded() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let log_path = dir.path().join("logs").join("log.txt");

    let backend = Arc::new(
        ScriptedBackend::new().replies("key", &["Is it animated?", "FINAL GUESS: Toy Story"]),
    );
    let mut controller = controller(&backend, &["key"]);
    let mut console = console("start\nyes\nyes\n").with_history(HistoryLog::new(&log_path));

    let session = console.run(&mut controller, 20).await.unwrap();

    assert_eq!(session.status(), GameStatus::Guessed);
    let out = output(console);
    assert!(out.contains("AI Question 1: Is it animated?"));
    assert!(out.contains("I think your movie is: Toy Story"));
    assert!(out.contains("I guessed it!"));

    let log = std::fs::read_to_string(&log_path).unwrap();
    assert!(log.contains("Movie: Toy Story"));
    assert!(log.contains("Result: AI Won"));
    assert!(log.contains("Q: Is it animated?\nA: yes"));
}

#[tokio::test]
async fn test_out_of_questions_asks_for_the_movie() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let log_path = dir.path().join("log.txt");

    let backend = Arc::new(ScriptedBackend::new().replies(
        "key",
        &[
            "Is it a comedy?",
            "Is it a western?",
            "I need more questions",
            "*Because* you said comedy.",
        ],
    ));
    let mut controller = controller(&backend, &["key"]);
    let mut console = console("start\nno\nyes\nHeat\n").with_history(HistoryLog::new(&log_path));

    let session = console.run(&mut controller, 2).await.unwrap();

    assert_eq!(session.status(), GameStatus::Exhausted);
    assert_eq!(session.question_count(), 2);
    let out = output(console);
    assert!(out.contains("AI Question 1: Is it a comedy?"));
    assert!(out.contains("AI Question 2: Is it a western?"));
    assert!(!out.contains("I think your movie is"));
    assert!(out.contains("You win this time!"));
    assert!(out.contains("AI Response: Because you said comedy."));

    let log = std::fs::read_to_string(&log_path).unwrap();
    assert!(log.contains("Movie: Heat"));
    assert!(log.contains("Result: Player Won"));
    assert!(log.contains("Questions Asked: 2"));
    assert!(log.contains("Q: Is it a western?\nA: yes"));
}

#[tokio::test]
async fn test_every_question_is_answered_before_the_last_guess() {
    let backend = Arc::new(
        ScriptedBackend::new().replies("key", &["Q1?", "Q2?", "Q3?", "\"Heat\""]),
    );
    let mut controller = controller(&backend, &["key"]);
    let mut console = console("start\na1\na2\na3\nyes\n");

    let session = console.run(&mut controller, 3).await.unwrap();

    assert_eq!(
        session.qa_pairs(),
        vec![("Q1?", "a1"), ("Q2?", "a2"), ("Q3?", "a3"), ("FINAL GUESS: Heat", "")]
    );
    assert_eq!(session.question_count(), 3);
    assert_eq!(session.status(), GameStatus::Guessed);
    assert_eq!(backend.call_count(), 4);

    let out = output(console);
    assert!(out.contains("AI Question 3: Q3?"));
    assert!(out.contains("I think your movie is: Heat"));
    assert!(out.contains("I guessed it!"));
}

#[tokio::test]
async fn test_rejected_last_guess_ends_the_game() {
    let backend = Arc::new(ScriptedBackend::new().replies(
        "key",
        &["Q1?", "FINAL GUESS: Alien", "Sorry, I was sure it was Alien."],
    ));
    let mut controller = controller(&backend, &["key"]);
    let mut console = console("start\nyes\nno\nAliens\n");

    let session = console.run(&mut controller, 1).await.unwrap();

    assert_eq!(session.status(), GameStatus::Exhausted);
    let out = output(console);
    assert!(out.contains("AI Question 1: Q1?"));
    assert!(out.contains("I think your movie is: Alien"));
    assert!(out.contains("You win this time!"));
    assert!(out.contains("AI Response: Sorry, I was sure it was Alien."));
    assert_eq!(backend.call_count(), 3);
}

#[tokio::test]
async fn test_wrong_guess_keeps_asking() {
    let backend = Arc::new(ScriptedBackend::new().replies(
        "key",
        &["Q1?", "FINAL GUESS: Alien", "Is it a sequel?"],
    ));
    let mut controller = controller(&backend, &["key"]);
    let mut console = console("start\nyes\nno\nexit\n");

    let session = console.run(&mut controller, 20).await.unwrap();

    assert_eq!(session.status(), GameStatus::Aborted);
    let out = output(console);
    assert!(out.contains("maybe I need more questions"));
    assert!(out.contains("AI Question 3: Is it a sequel?"));
    assert!(out.contains("Thanks for playing!"));
}

#[tokio::test]
async fn test_connection_error_can_be_retried() {
    let backend = Arc::new(
        ScriptedBackend::new()
            .fail("key", ProviderError::Connection("service unavailable".into()))
            .reply("key", "Is it black and white?"),
    );
    let mut controller = controller(&backend, &["key"]);
    let mut console = console("start\n\nexit\n");

    console.run(&mut controller, 20).await.unwrap();

    let out = output(console);
    assert!(out.contains("connection error: service unavailable"));
    assert!(out.contains("AI Question 1: Is it black and white?"));
    assert_eq!(backend.call_count(), 2);
}

#[tokio::test]
async fn test_fatal_error_ends_the_game() {
    let backend = Arc::new(ScriptedBackend::new().always("key", Err(quota())));
    let mut controller = controller(&backend, &["key"]);
    let mut console = console("start\n");

    let session = console.run(&mut controller, 20).await.unwrap();

    assert_eq!(session.question_count(), 0);
    assert_eq!(session.status(), GameStatus::Aborted);
    let out = output(console);
    assert!(out.contains("have exceeded their quota"));
}

#[tokio::test]
async fn test_running_out_of_keys_is_announced() {
    let backend = Arc::new(
        ScriptedBackend::new()
            .fail("a", quota())
            .fail("b", quota()),
    );
    let (tx, rx) = mpsc::unbounded_channel();
    let client =
        RotatingClient::new(backend.clone(), CredentialPool::new(keys(&["a", "b"]))).with_events(tx);
    let mut controller = SessionController::new(client);
    let mut console = console("start\n").with_events(rx);

    let session = console.run(&mut controller, 20).await.unwrap();

    assert!(session.is_finished());
    let out = output(console);
    assert!(out.contains("(switched to backup API key #1)"));
    assert!(out.contains("(all 2 API key(s) are over quota)"));
}

#[tokio::test]
async fn test_key_switch_is_announced() {
    let backend = Arc::new(ScriptedBackend::new().fail("a", quota()).reply("b", "Q1?"));
    let (tx, rx) = mpsc::unbounded_channel();
    let client =
        RotatingClient::new(backend.clone(), CredentialPool::new(keys(&["a", "b"]))).with_events(tx);
    let mut controller = SessionController::new(client);
    let mut console = console("start\nexit\n").with_events(rx);

    console.run(&mut controller, 20).await.unwrap();

    let out = output(console);
    assert!(out.contains("(switched to backup API key #1)"));
}

#[test]
fn test_ask_yes_no_reprompts() {
    let mut console = console("maybe\n  YES \n");
    assert_eq!(console.ask_yes_no("? ").unwrap(), YesNo::Yes);
    let out = output(console);
    assert!(out.contains("Please answer 'yes', 'no', or 'exit'."));
}

#[test]
fn test_ask_yes_no_end_of_input_is_exit() {
    let mut console = console("");
    assert_eq!(console.ask_yes_no("? ").unwrap(), YesNo::Exit);
}

#[test]
fn test_ask_yes_no_accepts_exit_any_case() {
    let mut console = console("Exit\n");
    assert_eq!(console.ask_yes_no("? ").unwrap(), YesNo::Exit);
}
