use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use super::error::{DataError, Result};
use super::loader::load_file;
use super::model::ResultsTable;

// ---------------------------------------------------------------------------
// Table generation
// ---------------------------------------------------------------------------

/// Produces `directory/<dataset>.csv` from raw trial logs.
pub trait TableGenerator {
    /// Run to completion. Whether the table now exists is checked by the
    /// caller when it loads the table.
    fn generate(&self, directory: &Path, trials: u32, dataset: &str) -> Result<()>;
}

/// Runs an external program as `<program> [args…] <directory> <trials> <dataset>`.
///
/// The child is waited for without a timeout, so a hanging program hangs the
/// caller. A program that cannot be started or exits non-zero is only logged;
/// the missing table is reported when it is loaded.
#[derive(Debug, Clone)]
pub struct CommandGenerator {
    program: PathBuf,
    args: Vec<OsString>,
}

impl CommandGenerator {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        CommandGenerator {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Add a leading argument, e.g. the script when `program` is a shell.
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }
}

impl TableGenerator for CommandGenerator {
    fn generate(&self, directory: &Path, trials: u32, dataset: &str) -> Result<()> {
        log::info!(
            "generating results table for {dataset} in {} ({trials} trials)",
            directory.display()
        );
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(directory)
            .arg(trials.to_string())
            .arg(dataset)
            .status();
        match status {
            Ok(status) if !status.success() => log::warn!(
                "table generator {} exited with {status} for {dataset}",
                self.program.display()
            ),
            Ok(_) => {}
            Err(e) => log::error!(
                "failed to run table generator {} for {dataset}: {e}",
                self.program.display()
            ),
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// TableStore
// ---------------------------------------------------------------------------

/// Location of a dataset's results table, as returned by [`TableStore::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TablePath {
    pub dataset: String,
    pub path: PathBuf,
}

/// Maps `(directory, dataset)` to a loaded table, generating the file first if
/// it is not on disk yet. Nothing is cached in memory; every [`load`] re-reads
/// the file.
///
/// [`load`]: TableStore::load
pub struct TableStore {
    generator: Box<dyn TableGenerator>,
}

impl TableStore {
    pub fn new(generator: impl TableGenerator + 'static) -> Self {
        TableStore {
            generator: Box::new(generator),
        }
    }

    /// Conventional location of a dataset's table inside `directory`.
    pub fn table_path(directory: &Path, dataset: &str) -> PathBuf {
        directory.join(format!("{dataset}.csv"))
    }

    /// Make sure the table for `dataset` exists, running the generator once if
    /// it does not. The returned path is not re-checked; if generation failed
    /// to produce it, [`load`](Self::load) reports the missing artifact.
    pub fn resolve(&self, directory: &Path, dataset: &str, trials: u32) -> Result<TablePath> {
        let path = Self::table_path(directory, dataset);
        if !path.exists() {
            self.generator.generate(directory, trials, dataset)?;
        }
        Ok(TablePath {
            dataset: dataset.to_string(),
            path,
        })
    }

    /// Parse the table at `table.path`.
    pub fn load(&self, table: &TablePath) -> Result<ResultsTable> {
        if !table.path.exists() {
            return Err(DataError::MissingArtifact {
                dataset: table.dataset.clone(),
                path: table.path.clone(),
            });
        }
        load_file(&table.path)
    }

    /// [`resolve`](Self::resolve) followed by [`load`](Self::load).
    pub fn open(&self, directory: &Path, dataset: &str, trials: u32) -> Result<ResultsTable> {
        let table = self.resolve(directory, dataset, trials)?;
        self.load(&table)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell as Counter;
    use std::rc::Rc;

    use tempfile::TempDir;

    use super::*;

    /// Records calls and optionally writes a small table.
    struct FakeGenerator {
        calls: Rc<Counter<usize>>,
        writes: bool,
    }

    impl TableGenerator for FakeGenerator {
        fn generate(&self, directory: &Path, trials: u32, dataset: &str) -> Result<()> {
            self.calls.set(self.calls.get() + 1);
            if self.writes {
                let body = format!("list,trials\n{dataset}-rlu,{trials}\n");
                std::fs::write(TableStore::table_path(directory, dataset), body).unwrap();
            }
            Ok(())
        }
    }

    fn store(writes: bool) -> (TableStore, Rc<Counter<usize>>) {
        let calls = Rc::new(Counter::new(0));
        let store = TableStore::new(FakeGenerator {
            calls: calls.clone(),
            writes,
        });
        (store, calls)
    }

    #[test]
    fn generates_on_miss_only() {
        let dir = TempDir::new().unwrap();
        let (store, calls) = store(true);

        let table = store.open(dir.path(), "citrus", 5).unwrap();
        assert_eq!(calls.get(), 1);
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0][1], crate::data::model::Cell::Integer(5));

        store.open(dir.path(), "citrus", 5).unwrap();
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn reloading_yields_identical_rows() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("lazylist.csv"), "list,thr\nlazylist-rlu,1.5\n").unwrap();
        let (store, calls) = store(false);

        let first = store.open(dir.path(), "lazylist", 3).unwrap();
        let second = store.open(dir.path(), "lazylist", 3).unwrap();
        assert_eq!(first.rows(), second.rows());
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn generator_that_writes_nothing_leaves_artifact_missing() {
        let dir = TempDir::new().unwrap();
        let (store, calls) = store(false);

        let resolved = store.resolve(dir.path(), "skiplistlock", 3).unwrap();
        assert_eq!(calls.get(), 1);
        assert_eq!(resolved.path, dir.path().join("skiplistlock.csv"));

        match store.load(&resolved).unwrap_err() {
            DataError::MissingArtifact { dataset, path } => {
                assert_eq!(dataset, "skiplistlock");
                assert_eq!(path, resolved.path);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unstartable_command_surfaces_as_missing_artifact() {
        let dir = TempDir::new().unwrap();
        let store = TableStore::new(CommandGenerator::new(dir.path().join("make_csv.sh")));

        let resolved = store.resolve(dir.path(), "citrus", 3).unwrap();
        assert_eq!(resolved.path, dir.path().join("citrus.csv"));

        match store.open(dir.path(), "citrus", 3).unwrap_err() {
            DataError::MissingArtifact { dataset, path } => {
                assert_eq!(dataset, "citrus");
                assert_eq!(path, dir.path().join("citrus.csv"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn command_receives_directory_trials_and_dataset() {
        let dir = TempDir::new().unwrap();
        let script = dir.path().join("make_csv.sh");
        std::fs::write(
            &script,
            "printf 'list,trials\\n%s-rlu,%s\\n' \"$3\" \"$2\" > \"$1/$3.csv\"\n",
        )
        .unwrap();

        let store = TableStore::new(CommandGenerator::new("sh").arg(&script));
        let table = store.open(dir.path(), "citrus", 7).unwrap();
        assert_eq!(table.rows()[0][0], crate::data::model::Cell::from("citrus-rlu"));
        assert_eq!(table.rows()[0][1], crate::data::model::Cell::Integer(7));
    }

    #[cfg(unix)]
    #[test]
    fn failing_command_surfaces_as_missing_artifact() {
        let dir = TempDir::new().unwrap();
        let script = dir.path().join("fail.sh");
        std::fs::write(&script, "exit 3\n").unwrap();

        let store = TableStore::new(CommandGenerator::new("sh").arg(&script));
        let err = store.open(dir.path(), "citrus", 1).unwrap_err();
        assert!(matches!(err, DataError::MissingArtifact { .. }), "{err}");
        assert!(err.to_string().contains("citrus.csv"));
    }
}
