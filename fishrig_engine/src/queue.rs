//! The reward queue: one full read-annotate-rewrite pass per request.
//!
//! Each call rebuilds everything from the file. Comment and blank lines pass
//! through untouched. Every descriptor line is parsed and validated so the
//! human editing the file gets feedback on all of it, but at most one line
//! is taken out per call. Lines that fail stay where they are, annotated,
//! and are re-checked on the next call once the human has fixed them.

use fishrig_data::Reward;
use log::{debug, info, warn};
use serde::Deserialize;
use thiserror::Error;
use variantly::Variantly;

use crate::catalog::Catalog;
use crate::descriptor::{ParseError, parse_descriptor};
use crate::line::{QueueLine, SourceLine, annotate, classify};
use crate::modifier::{ModifierRegistry, TableModifiers};
use crate::scaffold::scaffold_lines;
use crate::storage::{QueueStorage, StorageError};
use crate::validator::{ValidationError, validate};

/// Why a descriptor line was annotated instead of accepted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Why a dequeue produced no reward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentinelReason {
    /// No descriptor line in the file.
    QueueEmpty,
    /// Descriptor lines exist but none could be handed out; the offending lines were annotated in place.
    FrontInvalid,
    /// The queue file couldn't be read or the new content couldn't be written.
    StorageUnavailable,
}

/// Result of asking the queue for its next reward.
#[derive(Debug, Clone, PartialEq, Eq, Variantly)]
pub enum Dequeued {
    Reward(Reward),
    Sentinel(SentinelReason),
}

impl Dequeued {
    /// The reward, or the barrier placeholder the game hands out when the file needs fixing.
    pub fn into_reward_or_barrier(self) -> Reward {
        match self {
            Dequeued::Reward(reward) => reward,
            Dequeued::Sentinel(_) => Reward::barrier(),
        }
    }
}

/// Which descriptor line a dequeue may take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrontPolicy {
    /// The first descriptor line that parses and validates. Invalid lines ahead of it stay, annotated.
    #[default]
    FirstValid,
    /// Only the very first descriptor line. An invalid first line blocks the whole queue.
    FirstLine,
}

/// Summary of a [`QueueEngine::check`] pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CheckReport {
    pub descriptors: usize,
    pub annotated: usize,
    /// The first descriptor line parses and validates.
    pub front_valid: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PassMode {
    Dequeue,
    CheckOnly,
}

/// Accumulator for the per-line fold.
struct Pass {
    output: Vec<String>,
    taken: Option<Reward>,
    /// No later line may be taken any more.
    settled: bool,
    front_valid: bool,
    descriptors: usize,
    annotated: usize,
}

/// Reward queue over a storage backend, a catalog, and a modifier registry.
pub struct QueueEngine<S, M = TableModifiers> {
    storage: S,
    catalog: Catalog,
    modifiers: M,
    scaffold_missing: bool,
    policy: FrontPolicy,
}

impl<S: QueueStorage, M: ModifierRegistry> QueueEngine<S, M> {
    pub fn new(storage: S, catalog: Catalog, modifiers: M) -> Self {
        Self {
            storage,
            catalog,
            modifiers,
            scaffold_missing: true,
            policy: FrontPolicy::default(),
        }
    }

    /// Whether a missing queue file gets scaffold content written on first use.
    #[must_use]
    pub fn with_scaffold(mut self, enabled: bool) -> Self {
        self.scaffold_missing = enabled;
        self
    }

    #[must_use]
    pub fn with_front_policy(mut self, policy: FrontPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Write the scaffold if the queue file is missing. Returns whether it was written.
    ///
    /// # Errors
    /// Storage read or write failures.
    pub fn ensure_file(&mut self) -> Result<bool, StorageError> {
        if self.storage.read_lines()?.is_some() {
            return Ok(false);
        }
        let lines = scaffold_lines(&self.catalog);
        self.storage.write_lines(&lines)?;
        info!("created queue file scaffold with {} catalog entries", self.catalog.len());
        Ok(true)
    }

    /// True when at least one descriptor line exists. Nothing is parsed or validated.
    pub fn is_active(&self) -> bool {
        match self.storage.read_lines() {
            Ok(Some(lines)) => lines.iter().any(|line| classify(line).is_descriptor()),
            Ok(None) => false,
            Err(err) => {
                warn!("could not read queue file: {err}");
                false
            },
        }
    }

    /// Take the reward at the front of the queue and rewrite the file.
    ///
    /// Never fails: every problem ends up either as an annotation in the file
    /// or as a [`Dequeued::Sentinel`].
    pub fn dequeue_front(&mut self) -> Dequeued {
        let Some(lines) = self.load_lines() else {
            return Dequeued::Sentinel(SentinelReason::StorageUnavailable);
        };
        let pass = self.scan(&lines, PassMode::Dequeue);

        if let Err(err) = self.persist(&lines, &pass.output) {
            warn!("could not write queue file, nothing dequeued: {err}");
            return Dequeued::Sentinel(SentinelReason::StorageUnavailable);
        }

        match pass.taken {
            Some(reward) => {
                info!("dequeued {} (file now has {} lines)", reward.item, pass.output.len());
                Dequeued::Reward(reward)
            },
            None if pass.descriptors == 0 => Dequeued::Sentinel(SentinelReason::QueueEmpty),
            None => Dequeued::Sentinel(SentinelReason::FrontInvalid),
        }
    }

    /// Annotate every invalid line without taking anything out of the queue.
    ///
    /// # Errors
    /// Storage read or write failures.
    pub fn check(&mut self) -> Result<CheckReport, StorageError> {
        let lines = self.storage.read_lines()?.unwrap_or_default();
        let pass = self.scan(&lines, PassMode::CheckOnly);
        self.persist(&lines, &pass.output)?;
        Ok(CheckReport {
            descriptors: pass.descriptors,
            annotated: pass.annotated,
            front_valid: pass.front_valid,
        })
    }

    /// Parse and validate one descriptor line, building its reward on success.
    ///
    /// # Errors
    /// The [`LineError`] to annotate the line with.
    pub fn evaluate(&self, source: &SourceLine) -> Result<Reward, LineError> {
        let descriptor = parse_descriptor(source.body(), &self.modifiers)?;
        let entry = validate(&descriptor, &self.catalog, &self.modifiers)?;
        Ok(entry
            .template
            .instantiate(descriptor.attribute, descriptor.modifier_levels().as_ref()))
    }

    /// Current lines, scaffolding a missing file first. `None` on read failure.
    fn load_lines(&mut self) -> Option<Vec<String>> {
        match self.storage.read_lines() {
            Ok(Some(lines)) => Some(lines),
            Ok(None) if self.scaffold_missing => {
                let lines = scaffold_lines(&self.catalog);
                match self.storage.write_lines(&lines) {
                    Ok(()) => info!("queue file was missing, wrote scaffold"),
                    Err(err) => warn!("queue file was missing and the scaffold could not be written: {err}"),
                }
                Some(lines)
            },
            Ok(None) => Some(Vec::new()),
            Err(err) => {
                warn!("could not read queue file: {err}");
                None
            },
        }
    }

    /// Replace the file only when the pass changed something.
    fn persist(&mut self, before: &[String], after: &[String]) -> Result<(), StorageError> {
        if before == after {
            debug!("queue file unchanged, skipping write");
            return Ok(());
        }
        self.storage.write_lines(after)
    }

    fn scan(&self, lines: &[String], mode: PassMode) -> Pass {
        let start = Pass {
            output: Vec::with_capacity(lines.len()),
            taken: None,
            settled: false,
            front_valid: false,
            descriptors: 0,
            annotated: 0,
        };
        lines
            .iter()
            .enumerate()
            .fold(start, |pass, (idx, raw)| self.step(pass, idx + 1, classify(raw), mode))
    }

    /// Fold step: passthrough, annotate, or dequeue one line.
    fn step(&self, mut pass: Pass, line_no: usize, line: QueueLine, mode: PassMode) -> Pass {
        let QueueLine::Descriptor(source) = line else {
            pass.output.push(line.passthrough_text().to_string());
            return pass;
        };
        pass.descriptors += 1;
        let first = pass.descriptors == 1;

        match self.evaluate(&source) {
            Err(err) => {
                warn!("queue line {line_no}: {err}");
                pass.output.push(annotate(&source.original, &err.to_string()));
                pass.annotated += 1;
                if self.policy == FrontPolicy::FirstLine {
                    pass.settled = true;
                }
            },
            Ok(reward) if !pass.settled && mode == PassMode::Dequeue => {
                pass.taken = Some(reward);
                pass.settled = true;
            },
            Ok(_) => {
                pass.front_valid |= first;
                pass.settled = true;
                pass.output.push(source.original);
            },
        }
        pass
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use std::io;
    use std::path::PathBuf;

    fn engine(lines: &[&str]) -> QueueEngine<MemoryStorage> {
        let (catalog, modifiers) = Catalog::builtin();
        QueueEngine::new(MemoryStorage::with_lines(lines.iter().copied()), catalog, modifiers)
    }

    fn file(engine: &QueueEngine<MemoryStorage>) -> Vec<String> {
        engine.storage().lines().unwrap_or_default().to_vec()
    }

    /// Storage that holds fixed lines and fails either every read or every write.
    struct Broken {
        lines: Vec<String>,
        fail_reads: bool,
    }

    impl Broken {
        fn engine(lines: &[&str], fail_reads: bool) -> QueueEngine<Broken> {
            let (catalog, modifiers) = Catalog::builtin();
            let storage = Broken {
                lines: lines.iter().map(ToString::to_string).collect(),
                fail_reads,
            };
            QueueEngine::new(storage, catalog, modifiers)
        }
    }

    impl QueueStorage for Broken {
        fn read_lines(&self) -> Result<Option<Vec<String>>, StorageError> {
            if self.fail_reads {
                return Err(StorageError::Read {
                    path: PathBuf::from("fishrig.txt"),
                    source: io::Error::other("device gone"),
                });
            }
            Ok(Some(self.lines.clone()))
        }

        fn write_lines(&mut self, _lines: &[String]) -> Result<(), StorageError> {
            Err(StorageError::Write {
                path: PathBuf::from("fishrig.txt"),
                source: io::Error::other("read-only file system"),
            })
        }
    }

    #[test]
    fn failed_write_hands_out_nothing() {
        let mut engine = Broken::engine(&["cod", "salmon"], false);
        assert_eq!(engine.dequeue_front(), Dequeued::Sentinel(SentinelReason::StorageUnavailable));
        // the reward is still queued, so the next successful pass can grant it once
        assert_eq!(engine.storage().lines, ["cod", "salmon"]);
        assert_eq!(engine.dequeue_front(), Dequeued::Sentinel(SentinelReason::StorageUnavailable));
    }

    #[test]
    fn failed_write_of_annotations_is_storage_unavailable() {
        let mut engine = Broken::engine(&["bogus"], false);
        assert_eq!(engine.dequeue_front(), Dequeued::Sentinel(SentinelReason::StorageUnavailable));
        assert_eq!(engine.storage().lines, ["bogus"]);
        assert!(engine.check().is_err());
    }

    #[test]
    fn unchanged_file_needs_no_write() {
        let mut engine = Broken::engine(&["#only", "", "# comments"], false);
        assert_eq!(engine.dequeue_front(), Dequeued::Sentinel(SentinelReason::QueueEmpty));
    }

    #[test]
    fn failed_read_is_storage_unavailable() {
        let mut engine = Broken::engine(&["cod"], true);
        assert!(!engine.is_active());
        assert_eq!(engine.dequeue_front(), Dequeued::Sentinel(SentinelReason::StorageUnavailable));
        assert!(engine.dequeue_front().into_reward_or_barrier().is_barrier());
        assert!(matches!(engine.check(), Err(StorageError::Read { .. })));
        assert!(matches!(engine.ensure_file(), Err(StorageError::Read { .. })));
    }

    #[test]
    fn comment_only_file_is_left_alone() {
        let mut engine = engine(&["#comment", "", "   ", "# another"]);
        assert_eq!(engine.dequeue_front(), Dequeued::Sentinel(SentinelReason::QueueEmpty));
        assert_eq!(engine.storage().writes(), 0);
        assert_eq!(file(&engine), ["#comment", "", "   ", "# another"]);
    }

    #[test]
    fn invalid_lines_ahead_of_a_valid_one_stay_annotated() {
        let mut engine = engine(&["#comment", "unknown_item;damage:0", "cod"]);
        let Dequeued::Reward(reward) = engine.dequeue_front() else {
            panic!("expected a reward");
        };
        assert_eq!(reward.item, "minecraft:fish");
        assert_eq!(reward.variant, 0);
        assert_eq!(
            file(&engine),
            [
                "#comment",
                "Mistake in this line: Couldn't find this in the list of possible items -> unknown_item;damage:0",
            ]
        );
    }

    #[test]
    fn first_line_policy_blocks_on_an_invalid_front() {
        let mut engine =
            engine(&["#comment", "unknown_item;damage:0", "cod"]).with_front_policy(FrontPolicy::FirstLine);
        assert_eq!(engine.dequeue_front(), Dequeued::Sentinel(SentinelReason::FrontInvalid));
        assert_eq!(
            file(&engine),
            [
                "#comment",
                "Mistake in this line: Couldn't find this in the list of possible items -> unknown_item;damage:0",
                "cod",
            ]
        );
    }

    #[test]
    fn all_invalid_lines_yield_a_sentinel() {
        let mut engine = engine(&["bogus", "cod;damage:1"]);
        assert_eq!(engine.dequeue_front(), Dequeued::Sentinel(SentinelReason::FrontInvalid));
        assert_eq!(file(&engine).len(), 2);
        assert!(file(&engine).iter().all(|l| l.starts_with("Mistake in this line: ")));
    }

    #[test]
    fn valid_front_is_consumed() {
        let mut engine = engine(&["# header", "salmon # first", "", "cod", "leather_boots;damage:3"]);
        let Dequeued::Reward(reward) = engine.dequeue_front() else {
            panic!("expected a reward");
        };
        assert_eq!(reward.item, "minecraft:fish");
        assert_eq!(reward.variant, 1);
        assert_eq!(file(&engine), ["# header", "", "cod", "leather_boots;damage:3"]);
    }

    #[test]
    fn later_lines_get_annotated_but_stay_in_order() {
        let mut engine = engine(&["cod", "bow;damage:0", "salmon", "pufferfish;damage:2"]);
        assert!(engine.dequeue_front().is_reward());
        assert_eq!(
            file(&engine),
            [
                "Mistake in this line: The enchantment property is mandatory for this item -> bow;damage:0",
                "salmon",
                "Mistake in this line: This item doesn't accept a damage property -> pufferfish;damage:2",
            ]
        );
    }

    #[test]
    fn fixed_lines_are_reaccepted() {
        let stale = annotate("cod", "Couldn't find this in the list of possible items");
        let mut engine = engine(&[stale.as_str(), "salmon"]);
        let Dequeued::Reward(reward) = engine.dequeue_front() else {
            panic!("expected a reward");
        };
        assert_eq!(reward.variant, 0);
        assert_eq!(file(&engine), ["salmon"]);
    }

    #[test]
    fn reannotation_never_nests() {
        let mut engine = engine(&["cod;damage:1"]);
        assert!(engine.dequeue_front().is_sentinel());
        let first = file(&engine);
        assert!(engine.dequeue_front().is_sentinel());
        assert_eq!(file(&engine), first);
        assert_eq!(engine.storage().writes(), 1);
    }

    #[test]
    fn parse_errors_are_annotated() {
        let mut engine = engine(&["book;enchant:sharpnes[1]"]);
        engine.dequeue_front();
        assert_eq!(
            file(&engine),
            ["Mistake in this line: Can't read enchantment: sharpnes -> book;enchant:sharpnes[1]"]
        );
    }

    #[test]
    fn modifier_names_are_case_insensitive() {
        let mut engine = engine(&["book;enchant:Lure[1]"]);
        let reward = engine.dequeue_front().into_reward_or_barrier();
        assert_eq!(reward.item, "minecraft:enchanted_book");
        assert_eq!(reward.enchantments.get("lure"), Some(&1));
        assert_eq!(file(&engine), Vec::<String>::new());
    }

    #[test]
    fn enchanted_rewards_carry_damage_and_levels() {
        let mut engine = engine(&["fishing_rod_treasure;damage:12;enchant:unbreaking[1],lure[3]"]);
        let reward = engine.dequeue_front().into_reward_or_barrier();
        assert_eq!(reward.item, "minecraft:fishing_rod");
        assert_eq!(reward.damage, Some(12));
        assert_eq!(reward.enchantments.get("lure"), Some(&3));
        assert_eq!(reward.enchantments.get("unbreaking"), Some(&1));
    }

    #[test]
    fn sentinel_turns_into_barrier() {
        let mut engine = engine(&["nope"]);
        assert!(engine.dequeue_front().into_reward_or_barrier().is_barrier());
    }

    #[test]
    fn missing_file_is_scaffolded() {
        let (catalog, modifiers) = Catalog::builtin();
        let mut engine = QueueEngine::new(MemoryStorage::absent(), catalog, modifiers);
        assert!(!engine.is_active());
        assert_eq!(engine.dequeue_front(), Dequeued::Sentinel(SentinelReason::QueueEmpty));
        let lines = file(&engine);
        assert!(lines.iter().any(|l| l == "#cod"));
        assert!(!engine.is_active());
    }

    #[test]
    fn scaffolding_can_be_disabled() {
        let (catalog, modifiers) = Catalog::builtin();
        let mut engine = QueueEngine::new(MemoryStorage::absent(), catalog, modifiers).with_scaffold(false);
        assert!(engine.dequeue_front().is_sentinel());
        assert_eq!(engine.storage().lines(), None);
    }

    #[test]
    fn ensure_file_only_writes_once() -> Result<(), StorageError> {
        let (catalog, modifiers) = Catalog::builtin();
        let mut engine = QueueEngine::new(MemoryStorage::absent(), catalog, modifiers);
        assert!(engine.ensure_file()?);
        assert!(!engine.ensure_file()?);
        assert_eq!(engine.storage().writes(), 1);
        Ok(())
    }

    #[test]
    fn is_active_needs_a_descriptor_line() {
        assert!(!engine(&["#cod", "", "  "]).is_active());
        assert!(engine(&["#cod", "not even valid"]).is_active());
    }

    #[test]
    fn check_annotates_without_dequeuing() -> Result<(), StorageError> {
        let mut engine = engine(&["bogus", "cod", "salmon"]);
        let report = engine.check()?;
        assert_eq!(
            report,
            CheckReport {
                descriptors: 3,
                annotated: 1,
                front_valid: false,
            }
        );
        assert!(file(&engine)[0].starts_with("Mistake in this line: "));
        assert_eq!(file(&engine)[1..].to_vec(), ["cod", "salmon"]);
        Ok(())
    }
}
