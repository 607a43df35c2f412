//! The analysis pipeline: Text → tagged tokens → candidates → blanks.
//!
//! Wires together the tagger adapter, candidate extraction, blank
//! selection and the title heuristic. Reconstruction is driven by the
//! caller (usually a [`Session`](crate::core::session::Session)) once
//! replacements are known.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use crate::core::extract::{extract, ExtractOptions};
use crate::core::lexicon::{Lexicon, LexiconError, LexiconTagger};
use crate::core::reconstruct::{self, Emphasis};
use crate::core::select::{select, SelectionConfig};
use crate::core::tagger::{CompromiseTagPolicy, TagPolicy, Tagger, TaggerAdapter, TaggerError, DEFAULT_MIN_WORD_LEN};
use crate::core::title::title_for;
use crate::schema::blank::{BlankSelection, ReplacementMap};
use crate::schema::token::CandidateSet;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("could not analyze this text: {0}")]
    Tagger(#[from] TaggerError),
    #[error("lexicon error: {0}")]
    Lexicon(#[from] LexiconError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// Engine settings, loadable from RON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub selection: SelectionConfig,
    /// Words shorter than this (in word characters) never become candidates.
    #[serde(default = "default_min_word_len")]
    pub min_word_len: usize,
    #[serde(default = "default_include_adverbs")]
    pub include_adverbs: bool,
    #[serde(default)]
    pub emphasis: Emphasis,
    /// RNG seed; the builder's `seed` takes precedence.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_min_word_len() -> usize {
    DEFAULT_MIN_WORD_LEN
}

fn default_include_adverbs() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            selection: SelectionConfig::default(),
            min_word_len: default_min_word_len(),
            include_adverbs: default_include_adverbs(),
            emphasis: Emphasis::default(),
            seed: None,
        }
    }
}

impl EngineConfig {
    pub fn load_from_ron(path: &Path) -> Result<EngineConfig, PipelineError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    pub fn parse_ron(input: &str) -> Result<EngineConfig, PipelineError> {
        Ok(ron::from_str(input)?)
    }
}

/// Result of analyzing one text. Recomputed from scratch on every pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub text: String,
    pub candidates: CandidateSet,
    pub selection: BlankSelection,
    pub title: String,
}

impl Analysis {
    pub fn has_blanks(&self) -> bool {
        !self.selection.is_empty()
    }

    pub fn story(&self, replacements: &ReplacementMap) -> String {
        reconstruct::story(&self.text, &self.selection, replacements)
    }

    pub fn highlighted(&self, replacements: &ReplacementMap, emphasis: &Emphasis) -> String {
        reconstruct::highlighted(&self.text, &self.selection, replacements, emphasis)
    }

    pub fn template(&self) -> String {
        reconstruct::template(&self.text, &self.selection)
    }
}

/// The top-level story engine. Built via `StoryEngine::builder()`.
pub struct StoryEngine {
    tagger: Box<dyn Tagger>,
    policy: Box<dyn TagPolicy>,
    config: EngineConfig,
    seed: u64,
    generation_count: u64,
}

/// Builder for constructing a `StoryEngine`.
pub struct StoryEngineBuilder {
    config_path: Option<String>,
    lexicon_path: Option<String>,
    seed: Option<u64>,
    /// Directly provided config (for testing without files).
    config: Option<EngineConfig>,
    selection: Option<SelectionConfig>,
    include_adverbs: Option<bool>,
    min_word_len: Option<usize>,
    tagger: Option<Box<dyn Tagger>>,
    policy: Option<Box<dyn TagPolicy>>,
}

impl StoryEngine {
    pub fn builder() -> StoryEngineBuilder {
        StoryEngineBuilder {
            config_path: None,
            lexicon_path: None,
            seed: None,
            config: None,
            selection: None,
            include_adverbs: None,
            min_word_len: None,
            tagger: None,
            policy: None,
        }
    }

    /// Tag, extract and select blanks for `text`.
    ///
    /// Each call draws from a fresh RNG seeded with `seed + n`, where `n`
    /// counts previous analyses, so a given engine seed replays the same
    /// sequence of selections.
    pub fn analyze(&mut self, text: &str) -> Result<Analysis, PipelineError> {
        let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(self.generation_count));

        let tagged = TaggerAdapter::new(self.tagger.as_ref(), self.policy.as_ref())
            .min_word_len(self.config.min_word_len)
            .tag(text)?;
        let candidates = extract(
            tagged,
            ExtractOptions {
                include_adverbs: self.config.include_adverbs,
            },
        );
        let selection = select(&candidates, &self.config.selection, &mut rng);
        let title = title_for(text, &mut rng);

        self.generation_count += 1;
        debug!(
            chars = text.len(),
            candidates = candidates.len(),
            blanks = selection.len(),
            %title,
            "analyzed text"
        );

        Ok(Analysis {
            text: text.to_string(),
            candidates,
            selection,
            title,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn emphasis(&self) -> &Emphasis {
        &self.config.emphasis
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl StoryEngineBuilder {
    /// Load engine settings from a RON file at build time.
    pub fn config_path(mut self, path: &str) -> Self {
        self.config_path = Some(path.to_string());
        self
    }

    /// Merge a RON lexicon file over the built-in lexicon. Ignored when a
    /// custom tagger is supplied.
    pub fn lexicon_path(mut self, path: &str) -> Self {
        self.lexicon_path = Some(path.to_string());
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn selection(mut self, selection: SelectionConfig) -> Self {
        self.selection = Some(selection);
        self
    }

    pub fn include_adverbs(mut self, include: bool) -> Self {
        self.include_adverbs = Some(include);
        self
    }

    pub fn min_word_len(mut self, len: usize) -> Self {
        self.min_word_len = Some(len);
        self
    }

    /// Use an external tagger instead of the built-in lexicon tagger.
    pub fn tagger<T: Tagger + 'static>(mut self, tagger: T) -> Self {
        self.tagger = Some(Box::new(tagger));
        self
    }

    /// Use a different mapping from tag names to word classes.
    pub fn tag_policy<P: TagPolicy + 'static>(mut self, policy: P) -> Self {
        self.policy = Some(Box::new(policy));
        self
    }

    /// Provide config directly (for testing without files).
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn build(self) -> Result<StoryEngine, PipelineError> {
        let mut config = match (self.config, &self.config_path) {
            (Some(config), _) => config,
            (None, Some(path)) => EngineConfig::load_from_ron(Path::new(path))?,
            (None, None) => EngineConfig::default(),
        };
        if let Some(selection) = self.selection {
            config.selection = selection;
        }
        if let Some(include) = self.include_adverbs {
            config.include_adverbs = include;
        }
        if let Some(len) = self.min_word_len {
            config.min_word_len = len;
        }

        let tagger: Box<dyn Tagger> = match self.tagger {
            Some(tagger) => tagger,
            None => {
                let mut lexicon = Lexicon::builtin()?;
                if let Some(ref path) = self.lexicon_path {
                    lexicon.merge(Lexicon::load_from_ron(Path::new(path))?);
                }
                Box::new(LexiconTagger::new(lexicon))
            }
        };
        let policy: Box<dyn TagPolicy> = match self.policy {
            Some(policy) => policy,
            None => Box::new(CompromiseTagPolicy),
        };
        let seed = self.seed.or(config.seed).unwrap_or(0);

        Ok(StoryEngine {
            tagger,
            policy,
            config,
            seed,
            generation_count: 0,
        })
    }
}
