//! Username generation.

use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
    sync::Arc,
};

use rand::{Rng, seq::IteratorRandom};
use thiserror::Error;

const DEFAULT_ADJECTIVES: &[&str] = &[
    "agile", "bold", "brave", "calm", "clever", "daring", "eager", "fancy", "gentle", "happy",
    "jolly", "keen", "lively", "merry", "nimble", "plucky", "quiet", "rapid", "sunny", "tidy",
    "witty", "zesty",
];

const DEFAULT_ANIMALS: &[&str] = &[
    "aardvark", "badger", "beaver", "cheetah", "dolphin", "eagle", "falcon", "gecko", "hedgehog",
    "jaguar", "koala", "lemur", "meerkat", "newt", "panda", "quokka", "raccoon", "sloth", "tapir",
    "walrus", "zebra",
];

/// Name generation error.
#[derive(Debug, Error)]
pub enum NameError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("No adjective shares a first letter with any animal")]
    NoPairs,
}

/// Break a reader into lowercase lines, skipping blank ones.
pub fn get_lines(reader: impl BufRead) -> Vec<String> {
    reader
        .lines()
        .map_while(Result::ok)
        .map(|line| line.trim().to_lowercase())
        .filter(|line| !line.is_empty())
        .collect()
}

/// Picks an adjective and an animal that start with the same letter.
#[derive(Debug, Clone)]
pub struct NameGenerator {
    adjectives: Arc<Vec<String>>,
    animals: Arc<Vec<String>>,
}

impl Default for NameGenerator {
    fn default() -> Self {
        Self::new(
            DEFAULT_ADJECTIVES.iter().map(ToString::to_string).collect(),
            DEFAULT_ANIMALS.iter().map(ToString::to_string).collect(),
        )
    }
}

impl NameGenerator {
    /// Create a generator from word lists.
    #[must_use]
    pub fn new(adjectives: Vec<String>, animals: Vec<String>) -> Self {
        Self {
            adjectives: Arc::new(adjectives),
            animals: Arc::new(animals),
        }
    }

    /// Load `adjectives.txt` and `animals.txt` from `dir`.
    ///
    /// # Errors
    /// Returns error if either file cannot be opened.
    pub fn from_dir(dir: &Path) -> Result<Self, NameError> {
        let load = |name: &str| -> Result<Vec<String>, NameError> {
            let path = dir.join(name);
            let file = File::open(&path).map_err(|source| NameError::Io {
                path: path.display().to_string(),
                source,
            })?;
            Ok(get_lines(BufReader::new(file)))
        };
        Ok(Self::new(load("adjectives.txt")?, load("animals.txt")?))
    }

    /// Generate a name using the thread-local RNG.
    ///
    /// # Errors
    /// Returns error if no adjective/animal pair can be formed.
    pub fn get_name(&self) -> Result<String, NameError> {
        self.get_name_with(&mut rand::thread_rng())
    }

    /// Generate a name using `rng`.
    ///
    /// # Errors
    /// Returns error if no adjective/animal pair can be formed.
    pub fn get_name_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<String, NameError> {
        // Only animals with at least one matching adjective are candidates.
        let animal = self
            .animals
            .iter()
            .filter(|animal| self.matching_adjectives(animal).next().is_some())
            .choose(rng)
            .ok_or(NameError::NoPairs)?;
        let adjective = self
            .matching_adjectives(animal)
            .choose(rng)
            .ok_or(NameError::NoPairs)?;
        Ok(format!("{adjective} {animal}"))
    }

    fn matching_adjectives<'a>(&'a self, animal: &'a str) -> impl Iterator<Item = &'a String> {
        let initial = animal.chars().next();
        self.adjectives
            .iter()
            .filter(move |adjective| adjective.chars().next() == initial)
    }
}
