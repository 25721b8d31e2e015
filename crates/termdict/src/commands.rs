//! Subcommands and their execution against injected collaborators.

use std::io::Write;

use anyhow::{bail, Context as _};
use clap::{Args, Subcommand};
use rand::Rng;
use rayon::prelude::*;
use termdict_core::Definer;
use termdict_vocab::VocabRepo;

use crate::output::{print_definitions, OutputFormat};

const EMPTY_LIST: &str = "no words in vocab list";

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Look up the definition of a word
    Define(DefineArgs),
    /// Define a random word from your vocab list
    Random(PrintArgs),
    /// Add words to your vocab list
    Add(AddArgs),
    /// Remove words from your vocab list
    Remove(RemoveArgs),
    /// List the words in your vocab list
    List {
        #[command(subcommand)]
        action: Option<ListAction>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ListAction {
    /// Add words to your vocab list
    Add(AddArgs),
    /// Remove words from your vocab list
    Remove(RemoveArgs),
}

#[derive(Args, Debug)]
pub struct DefineArgs {
    /// Word to define
    #[arg(required_unless_present = "random", conflicts_with = "random")]
    pub word: Option<String>,
    /// Define a random word from your vocab list
    #[arg(long)]
    pub random: bool,
    #[command(flatten)]
    pub print: PrintArgs,
}

#[derive(Args, Debug, Default)]
pub struct PrintArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,
    /// Maximum number of senses to show in text output (0 = all)
    #[arg(long, default_value_t = 0)]
    pub limit: usize,
}

#[derive(Args, Debug)]
pub struct AddArgs {
    #[arg(required = true)]
    pub words: Vec<String>,
    /// Don't check that words can be defined before adding
    #[arg(short, long)]
    pub no_check: bool,
}

#[derive(Args, Debug)]
pub struct RemoveArgs {
    #[arg(required = true)]
    pub words: Vec<String>,
}

/// Everything a command needs: where to print, the word list, the definer
/// and a randomness source.
pub struct Context<'a, W, R> {
    pub out: W,
    pub vocab: &'a dyn VocabRepo,
    pub dict: &'a dyn Definer,
    pub rng: R,
}

impl<'a, W: Write, R: Rng> Context<'a, W, R> {
    pub fn execute(&mut self, command: Command) -> anyhow::Result<()> {
        match command {
            Command::Define(args) => self.define(args),
            Command::Random(print) => self.random(&print),
            Command::Add(args) | Command::List { action: Some(ListAction::Add(args)) } => self.add(args),
            Command::Remove(args) | Command::List { action: Some(ListAction::Remove(args)) } => {
                self.remove(args)
            }
            Command::List { action: None } => self.list(),
        }
    }

    fn define(&mut self, args: DefineArgs) -> anyhow::Result<()> {
        let word = match args.word {
            Some(word) if !args.random => word,
            _ => match self.pick_random()? {
                Some(word) => word,
                None => bail!("{}", EMPTY_LIST),
            },
        };
        self.define_and_print(&word, &args.print)
    }

    fn random(&mut self, print: &PrintArgs) -> anyhow::Result<()> {
        match self.pick_random()? {
            Some(word) => self.define_and_print(&word, print),
            None => {
                writeln!(self.out, "{}", EMPTY_LIST)?;
                Ok(())
            }
        }
    }

    fn add(&mut self, args: AddArgs) -> anyhow::Result<()> {
        if !args.no_check {
            let dict = self.dict;
            args.words.par_iter().try_for_each(|word| {
                dict.define(word)
                    .map(|_| ())
                    .with_context(|| format!("define word {:?} to be added to list", word))
            })?;
        }

        let added = self
            .vocab
            .add_words(&args.words)
            .context("add words to list")?;
        for word in added {
            writeln!(self.out, "Added word {:?}", word)?;
        }
        Ok(())
    }

    fn remove(&mut self, args: RemoveArgs) -> anyhow::Result<()> {
        let removed = self
            .vocab
            .remove_words(&args.words)
            .context("remove words from list")?;
        for word in removed {
            writeln!(self.out, "Removed word {:?}", word)?;
        }
        Ok(())
    }

    fn list(&mut self) -> anyhow::Result<()> {
        let words = self.vocab.list_words().context("list words")?;
        if words.is_empty() {
            writeln!(self.out, "{}", EMPTY_LIST)?;
            return Ok(());
        }
        for word in words {
            writeln!(self.out, "{}", word)?;
        }
        Ok(())
    }

    fn pick_random(&mut self) -> anyhow::Result<Option<String>> {
        let words = self.vocab.list_words().context("list words")?;
        if words.is_empty() {
            return Ok(None);
        }
        let idx = self.rng.gen_range(0..words.len());
        Ok(words.into_iter().nth(idx))
    }

    fn define_and_print(&mut self, word: &str, print: &PrintArgs) -> anyhow::Result<()> {
        let defs = self.dict.define(word)?;
        print_definitions(&mut self.out, print.output, print.limit, word, &defs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use parking_lot::Mutex;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use termdict_cache::{CachedDefiner, DefinitionCache, MemoryCache};
    use termdict_core::{normalize, DictError, Definition, ErrorKind, Result};
    use termdict_vocab::VocabList;

    #[derive(Default)]
    struct MemoryVocab {
        list: Mutex<VocabList>,
        fail: bool,
        adds: AtomicUsize,
    }

    impl MemoryVocab {
        fn with(words: &[&str]) -> Self {
            let vocab = Self::default();
            for w in words {
                vocab.list.lock().add(w);
            }
            vocab
        }
    }

    impl VocabRepo for MemoryVocab {
        fn add_words(&self, words: &[String]) -> Result<Vec<String>> {
            self.adds.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(DictError::io(
                    "vocab",
                    std::io::Error::new(std::io::ErrorKind::Other, "failure"),
                ));
            }
            let mut list = self.list.lock();
            Ok(words.iter().filter_map(|w| list.add(w)).collect())
        }

        fn remove_words(&self, words: &[String]) -> Result<Vec<String>> {
            let mut list = self.list.lock();
            Ok(words.iter().filter_map(|w| list.remove(w)).collect())
        }

        fn list_words(&self) -> Result<Vec<String>> {
            Ok(self.list.lock().sorted())
        }
    }

    #[derive(Default)]
    struct MapDefiner {
        words: HashMap<String, Vec<Definition>>,
        calls: AtomicUsize,
    }

    impl MapDefiner {
        fn with(words: &[&str]) -> Self {
            Self {
                words: words
                    .iter()
                    .map(|w| (w.to_string(), sample_defs()))
                    .collect(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl Definer for MapDefiner {
        fn define(&self, word: &str) -> Result<Vec<Definition>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.words
                .get(&normalize(word))
                .cloned()
                .ok_or_else(|| DictError::not_found(word))
        }
    }

    fn sample_defs() -> Vec<Definition> {
        vec![
            Definition::new("verb", "to foo"),
            Definition::new("verb", "to bar"),
        ]
    }

    fn words(ws: &[&str]) -> Vec<String> {
        ws.iter().map(|w| w.to_string()).collect()
    }

    /// Run a command and return (result, stdout).
    fn run(vocab: &dyn VocabRepo, dict: &dyn Definer, command: Command) -> (anyhow::Result<()>, String) {
        let mut out = Vec::new();
        let result = Context {
            out: &mut out,
            vocab,
            dict,
            rng: StdRng::seed_from_u64(7),
        }
        .execute(command);
        (result, String::from_utf8(out).unwrap())
    }

    fn add(ws: &[&str], no_check: bool) -> Command {
        Command::Add(AddArgs {
            words: words(ws),
            no_check,
        })
    }

    #[test]
    fn add_word_that_can_be_defined() {
        let vocab = MemoryVocab::default();
        let dict = MapDefiner::with(&["fortitude"]);

        let (result, out) = run(&vocab, &dict, add(&["Fortitude"], false));
        result.unwrap();
        assert_eq!(out, "Added word \"fortitude\"\n");
        assert_eq!(dict.calls.load(Ordering::SeqCst), 1);
        assert_eq!(vocab.list_words().unwrap(), words(&["fortitude"]));
    }

    #[test]
    fn add_word_that_cannot_be_defined() {
        let vocab = MemoryVocab::default();
        let dict = MapDefiner::default();

        let (result, out) = run(&vocab, &dict, add(&["foo"], false));
        let err = result.unwrap_err();
        assert!(err.to_string().contains("\"foo\""));
        assert_eq!(
            err.root_cause().downcast_ref::<DictError>().map(|e| e.kind()),
            Some(ErrorKind::NotFound)
        );
        assert!(out.is_empty());
        assert_eq!(vocab.adds.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn add_with_no_check_skips_definer() {
        let vocab = MemoryVocab::default();
        let dict = MapDefiner::default();

        let (result, _) = run(&vocab, &dict, add(&["omg"], true));
        result.unwrap();
        assert_eq!(dict.calls.load(Ordering::SeqCst), 0);
        assert_eq!(vocab.list_words().unwrap(), words(&["omg"]));
    }

    #[test]
    fn add_multiple_with_one_undefined_adds_nothing() {
        let vocab = MemoryVocab::default();
        let dict = MapDefiner::with(&["erudite"]);

        let (result, _) = run(&vocab, &dict, add(&["erudite", "sanguine"], false));
        assert!(result.is_err());
        assert_eq!(vocab.adds.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn add_reports_storage_failure() {
        let vocab = MemoryVocab {
            fail: true,
            ..Default::default()
        };
        let dict = MapDefiner::with(&["foo"]);

        let (result, _) = run(&vocab, &dict, add(&["foo"], false));
        assert!(result.unwrap_err().to_string().contains("add words to list"));
    }

    #[test]
    fn add_only_prints_new_words() {
        let vocab = MemoryVocab::with(&["porter"]);
        let dict = MapDefiner::with(&["porter", "placate"]);

        let (result, out) = run(&vocab, &dict, add(&["porter", "placate"], false));
        result.unwrap();
        assert_eq!(out, "Added word \"placate\"\n");
    }

    #[test]
    fn add_populates_cache_once() {
        let vocab = MemoryVocab::default();
        let dict = CachedDefiner::new(MemoryCache::new(), MapDefiner::with(&["porter", "placate"]));

        run(&vocab, &dict, add(&["porter", "placate"], false)).0.unwrap();
        let (result, out) = run(
            &vocab,
            &dict,
            Command::Define(DefineArgs {
                word: Some("Porter".into()),
                random: false,
                print: PrintArgs::default(),
            }),
        );
        result.unwrap();
        assert!(out.starts_with("Porter\n[verb] to foo\n"));
        assert_eq!(dict.fallback().calls.load(Ordering::SeqCst), 2);
        assert!(dict.cache().contains("placate").unwrap());
    }

    #[test]
    fn remove_prints_removed_words() {
        let vocab = MemoryVocab::with(&["efficacy", "elegy", "chide"]);
        let dict = MapDefiner::default();

        let (result, out) = run(
            &vocab,
            &dict,
            Command::List {
                action: Some(ListAction::Remove(RemoveArgs {
                    words: words(&["Elegy", "chide", "absent"]),
                })),
            },
        );
        result.unwrap();
        assert_eq!(out, "Removed word \"elegy\"\nRemoved word \"chide\"\n");
        assert_eq!(vocab.list_words().unwrap(), words(&["efficacy"]));
    }

    #[test]
    fn list_sorted_or_empty_message() {
        let dict = MapDefiner::default();

        let (result, out) = run(&MemoryVocab::default(), &dict, Command::List { action: None });
        result.unwrap();
        assert_eq!(out, "no words in vocab list\n");

        let vocab = MemoryVocab::with(&["zeal", "apple", "mango"]);
        let (result, out) = run(&vocab, &dict, Command::List { action: None });
        result.unwrap();
        assert_eq!(out, "apple\nmango\nzeal\n");
    }

    #[test]
    fn define_prints_json() {
        let dict = MapDefiner::with(&["organic"]);
        let (result, out) = run(
            &MemoryVocab::default(),
            &dict,
            Command::Define(DefineArgs {
                word: Some("organic".into()),
                random: false,
                print: PrintArgs {
                    output: OutputFormat::Json,
                    limit: 0,
                },
            }),
        );
        result.unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["word"], "organic");
        assert_eq!(value["definitions"][0]["meaning"], "to foo");
    }

    #[test]
    fn define_unknown_word_fails() {
        let (result, out) = run(
            &MemoryVocab::default(),
            &MapDefiner::default(),
            Command::Define(DefineArgs {
                word: Some("platypus".into()),
                random: false,
                print: PrintArgs::default(),
            }),
        );
        assert!(result.is_err());
        assert!(out.is_empty());
    }

    #[test]
    fn define_random_from_empty_list_fails() {
        let (result, _) = run(
            &MemoryVocab::default(),
            &MapDefiner::default(),
            Command::Define(DefineArgs {
                word: None,
                random: true,
                print: PrintArgs::default(),
            }),
        );
        assert!(result.unwrap_err().to_string().contains("no words"));
    }

    #[test]
    fn random_picks_from_list() {
        let vocab = MemoryVocab::with(&["alpha", "beta", "gamma"]);
        let dict = MapDefiner::with(&["alpha", "beta", "gamma"]);

        let (result, out) = run(&vocab, &dict, Command::Random(PrintArgs { output: OutputFormat::Text, limit: 1 }));
        result.unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(["alpha", "beta", "gamma"].contains(&lines[0]));
        assert_eq!(lines[1], "[verb] to foo");
    }

    #[test]
    fn random_same_seed_same_word() {
        let vocab = MemoryVocab::with(&["alpha", "beta", "gamma", "delta", "epsilon"]);
        let dict = MapDefiner::with(&["alpha", "beta", "gamma", "delta", "epsilon"]);

        let (_, first) = run(&vocab, &dict, Command::Random(PrintArgs::default()));
        let (_, second) = run(&vocab, &dict, Command::Random(PrintArgs::default()));
        assert_eq!(first, second);
    }

    #[test]
    fn random_on_empty_list_prints_message() {
        let dict = MapDefiner::default();
        let (result, out) = run(&MemoryVocab::default(), &dict, Command::Random(PrintArgs::default()));
        result.unwrap();
        assert_eq!(out, "no words in vocab list\n");
        assert_eq!(dict.calls.load(Ordering::SeqCst), 0);
    }
}
