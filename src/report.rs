use crate::models::RankingFacts;
use std::fmt;

/// Movement of one rank field between two runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankDelta {
    /// No snapshot entry for this source yet, or absent in both runs.
    Silent,
    Entered,
    Left,
    Improved(u32),
    Dropped(u32),
    Unchanged,
}

impl RankDelta {
    pub fn between(previous: Option<u32>, current: Option<u32>) -> Self {
        match (previous, current) {
            (None, None) => RankDelta::Silent,
            (None, Some(_)) => RankDelta::Entered,
            (Some(_), None) => RankDelta::Left,
            (Some(prev), Some(cur)) if prev > cur => RankDelta::Improved(prev - cur),
            (Some(prev), Some(cur)) if prev < cur => RankDelta::Dropped(cur - prev),
            (Some(_), Some(_)) => RankDelta::Unchanged,
        }
    }

    pub fn is_silent(&self) -> bool {
        matches!(self, RankDelta::Silent)
    }
}

fn positions(n: u32) -> &'static str {
    if n == 1 {
        "position"
    } else {
        "positions"
    }
}

impl fmt::Display for RankDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RankDelta::Silent => Ok(()),
            RankDelta::Entered => f.write_str("entered the list"),
            RankDelta::Left => f.write_str("left the list"),
            RankDelta::Improved(n) => write!(f, "improved by {} {}", n, positions(*n)),
            RankDelta::Dropped(n) => write!(f, "dropped by {} {}", n, positions(*n)),
            RankDelta::Unchanged => f.write_str("unchanged"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FactsDelta {
    pub absolute: RankDelta,
    pub filtered: RankDelta,
}

pub fn compare(current: &RankingFacts, previous: Option<&RankingFacts>) -> FactsDelta {
    match previous {
        None => FactsDelta {
            absolute: RankDelta::Silent,
            filtered: RankDelta::Silent,
        },
        Some(prev) => FactsDelta {
            absolute: RankDelta::between(prev.absolute_rank, current.absolute_rank),
            filtered: RankDelta::between(prev.filtered_rank, current.filtered_rank),
        },
    }
}

/// Human-readable block for one source.
pub fn render_source(name: &str, facts: &RankingFacts, delta: &FactsDelta) -> String {
    let mut content = String::new();
    content.push_str(&format!("📄 {}\n", name));

    let consent_rank = match facts.filtered_rank {
        Some(rank) => format!("{} of {}", rank, facts.filtered_count),
        None => "not among consent filers".to_string(),
    };
    content.push_str(&format!(
        "   ✅ Rank among consent filers: {}{}\n",
        consent_rank,
        annotation(&delta.filtered)
    ));
    content.push_str(&format!(
        "   📝 Consent filers in list: {}\n",
        facts.filtered_count
    ));

    let overall_rank = match facts.absolute_rank {
        Some(rank) => rank.to_string(),
        None => "not found".to_string(),
    };
    content.push_str(&format!(
        "   📊 Overall rank: {}{}\n",
        overall_rank,
        annotation(&delta.absolute)
    ));
    content
}

fn annotation(delta: &RankDelta) -> String {
    if delta.is_silent() {
        String::new()
    } else {
        format!(" ({})", delta)
    }
}
