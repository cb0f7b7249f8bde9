//! Shared fixtures for the integration tests

#![allow(dead_code)]

use std::collections::VecDeque;

use emptrack::engine::sqlite::SqliteEngine;
use emptrack::{Prompter, Result};

const SCHEMA: &str = include_str!("../../db/schema.sqlite.sql");
const SEEDS: &str = include_str!("../../db/seeds.sql");

/// Fresh in-memory database with the schema applied and no rows
pub fn empty_db() -> SqliteEngine {
    let db = SqliteEngine::open_in_memory().expect("open in-memory database");
    db.execute_batch(SCHEMA).expect("apply schema");
    db
}

/// Fresh in-memory database loaded with the sample data
pub fn seeded_db() -> SqliteEngine {
    let db = empty_db();
    db.execute_batch(SEEDS).expect("apply seeds");
    db
}

/// One scripted answer
#[derive(Debug, Clone)]
pub enum Answer {
    /// Choose the item with this label; main menu items match on the label after the group
    Pick(&'static str),
    /// Return this raw index, whatever was offered
    Index(usize),
    Text(&'static str),
    Yes,
    No,
}

/// Prompter that replays a fixed script
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<Answer>,
}

impl ScriptedPrompter {
    pub fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
        Self { answers: answers.into_iter().collect() }
    }

    fn next(&mut self, prompt: &str) -> Answer {
        self.answers
            .pop_front()
            .unwrap_or_else(|| panic!("script exhausted at prompt {prompt:?}"))
    }
}

impl Prompter for ScriptedPrompter {
    fn select(&mut self, prompt: &str, items: &[String]) -> Result<usize> {
        match self.next(prompt) {
            Answer::Pick(label) => {
                let grouped = format!("] {label}");
                let idx = items
                    .iter()
                    .position(|item| item == label)
                    .or_else(|| items.iter().position(|item| item.ends_with(&grouped)))
                    .unwrap_or_else(|| panic!("{label:?} not offered at {prompt:?}: {items:?}"));
                Ok(idx)
            }
            Answer::Index(idx) => Ok(idx),
            other => panic!("expected a pick at {prompt:?}, script has {other:?}"),
        }
    }

    fn input(&mut self, prompt: &str) -> Result<String> {
        match self.next(prompt) {
            Answer::Text(text) => Ok(text.to_string()),
            other => panic!("expected text at {prompt:?}, script has {other:?}"),
        }
    }

    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        match self.next(prompt) {
            Answer::Yes => Ok(true),
            Answer::No => Ok(false),
            other => panic!("expected yes/no at {prompt:?}, script has {other:?}"),
        }
    }

    fn pause(&mut self) -> Result<()> {
        Ok(())
    }
}

impl Drop for ScriptedPrompter {
    fn drop(&mut self) {
        if !std::thread::panicking() {
            assert!(self.answers.is_empty(), "unused answers: {:?}", self.answers);
        }
    }
}
