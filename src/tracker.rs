use crate::analyzer::RankAnalyzer;
use crate::history::SnapshotStore;
use crate::models::{Snapshot, Source};
use crate::report::{compare, render_source};
use crate::source::SourceError;
use anyhow::Result;
use std::io::Write;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub processed: usize,
    pub failed: usize,
    /// `None` when there was nothing to save.
    pub saved: Option<bool>,
}

pub struct RankTracker<'a, S: SnapshotStore> {
    analyzer: RankAnalyzer<'a>,
    store: &'a S,
}

impl<'a, S: SnapshotStore> RankTracker<'a, S> {
    pub fn new(target_id: &'a str, store: &'a S) -> Self {
        Self {
            analyzer: RankAnalyzer::new(target_id),
            store,
        }
    }

    /// Reports every source against the stored snapshot, then replaces the
    /// snapshot with this run's facts.
    pub fn run<I, W>(&self, sources: I, out: &mut W) -> Result<RunSummary>
    where
        I: IntoIterator<Item = Result<Source, SourceError>>,
        W: Write,
    {
        let previous = self.store.load();
        let mut next = Snapshot::new();
        let mut summary = RunSummary {
            processed: 0,
            failed: 0,
            saved: None,
        };

        for source in sources {
            let source = match source {
                Ok(source) => source,
                Err(e) => {
                    warn!(source = e.name(), "{}", e);
                    writeln!(out, "❌ Error processing {}: {}", e.name(), e)?;
                    summary.failed += 1;
                    continue;
                }
            };

            for column in source.missing_columns() {
                warn!(source = %source.name, column, "recognized column not found; ranks will be degraded");
            }

            let facts = self.analyzer.compute(&source);
            let delta = compare(&facts, previous.get(&source.name));
            write!(out, "{}", render_source(&source.name, &facts, &delta))?;

            next.insert(source.name, facts);
            summary.processed += 1;
        }

        if summary.processed == 0 && summary.failed == 0 {
            writeln!(out, "❌ No admission lists found")?;
            return Ok(summary);
        }
        if summary.processed == 0 {
            writeln!(out, "⚠️  No list could be read; history left untouched")?;
            return Ok(summary);
        }

        let saved = self.store.save(&next);
        if saved {
            info!(entries = next.len(), "history saved");
        } else {
            writeln!(out, "⚠️  Could not save history; changes will not be tracked for this run")?;
        }
        summary.saved = Some(saved);
        Ok(summary)
    }
}
