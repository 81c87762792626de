use crate::models::{RankingFacts, Row, Source, CONSENT_COLUMN, ID_COLUMN, NO_CONSENT_MARKER};

pub struct RankAnalyzer<'a> {
    pub target_id: &'a str,
}

impl<'a> RankAnalyzer<'a> {
    pub fn new(target_id: &'a str) -> Self {
        Self { target_id }
    }

    /// Single pass over the rows in file order.
    ///
    /// The first row whose ID matches the target latches the absolute rank and,
    /// if that row has filed consent, its position among consent filers. The
    /// consent count keeps running to the end of the list.
    pub fn compute(&self, source: &Source) -> RankingFacts {
        let target = self.target_id.trim();
        let mut absolute_rank = None;
        let mut filtered_rank = None;
        let mut consent_count: u32 = 0;

        for (position, row) in (1u32..).zip(source.rows.iter()) {
            let consented = has_consent(row);

            if absolute_rank.is_none() && matches_id(row, target) {
                absolute_rank = Some(position);
                if consented {
                    filtered_rank = Some(consent_count + 1);
                }
            }

            if consented {
                consent_count += 1;
            }
        }

        RankingFacts {
            absolute_rank,
            filtered_rank,
            filtered_count: consent_count,
        }
    }
}

fn matches_id(row: &Row, target: &str) -> bool {
    row.get(ID_COLUMN)
        .map(|value| value.trim() == target)
        .unwrap_or(false)
}

/// A row lacking either recognized column never counts as a filer.
fn has_consent(row: &Row) -> bool {
    if !row.contains_key(ID_COLUMN) {
        return false;
    }
    row.get(CONSENT_COLUMN)
        .map(|value| value.trim() != NO_CONSENT_MARKER)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compute(source: &Source, identifier: &str) -> RankingFacts {
        RankAnalyzer::new(identifier).compute(source)
    }

    fn row(id: &str, consent: &str) -> Row {
        let mut row = Row::new();
        row.insert(ID_COLUMN.to_string(), id.to_string());
        row.insert(CONSENT_COLUMN.to_string(), consent.to_string());
        row
    }

    fn sample_source() -> Source {
        Source::new(
            "Лечебное дело",
            vec![
                row("100001", "—"),
                row("100002", "yes"),
                row("100003", "yes"),
            ],
        )
    }

    #[test]
    fn finds_target_among_consent_filers() {
        let facts = compute(&sample_source(), "100003");
        assert_eq!(
            facts,
            RankingFacts {
                absolute_rank: Some(3),
                filtered_rank: Some(2),
                filtered_count: 2,
            }
        );
    }

    #[test]
    fn absent_target_still_counts_filers() {
        let facts = compute(&sample_source(), "999999");
        assert_eq!(facts.absolute_rank, None);
        assert_eq!(facts.filtered_rank, None);
        assert_eq!(facts.filtered_count, 2);
    }

    #[test]
    fn target_without_consent_has_no_filtered_rank() {
        let facts = compute(&sample_source(), "100001");
        assert_eq!(facts.absolute_rank, Some(1));
        assert_eq!(facts.filtered_rank, None);
        assert_eq!(facts.filtered_count, 2);
    }

    #[test]
    fn matching_trims_both_sides() {
        let source = Source::new("list", vec![row(" 100002 ", " yes ")]);
        let facts = compute(&source, "100002\n");
        assert_eq!(facts.absolute_rank, Some(1));
        assert_eq!(facts.filtered_rank, Some(1));
    }

    #[test]
    fn marker_with_padding_is_still_no_consent() {
        let source = Source::new("list", vec![row("100001", "  —  "), row("100002", "x")]);
        let facts = compute(&source, "100002");
        assert_eq!(facts.filtered_rank, Some(1));
        assert_eq!(facts.filtered_count, 1);
    }

    #[test]
    fn no_numeric_coercion() {
        let source = Source::new("list", vec![row("0100002", "yes")]);
        assert_eq!(compute(&source, "100002").absolute_rank, None);
    }

    #[test]
    fn first_match_wins() {
        let source = Source::new(
            "list",
            vec![row("100002", "—"), row("100001", "yes"), row("100002", "yes")],
        );
        let facts = compute(&source, "100002");
        assert_eq!(facts.absolute_rank, Some(1));
        assert_eq!(facts.filtered_rank, None);
        assert_eq!(facts.filtered_count, 2);
    }

    #[test]
    fn missing_consent_column_fails_open() {
        let mut only_id = Row::new();
        only_id.insert(ID_COLUMN.to_string(), "100001".to_string());
        let source = Source::new("list", vec![only_id]);
        let facts = compute(&source, "100001");
        assert_eq!(facts.absolute_rank, Some(1));
        assert_eq!(facts.filtered_rank, None);
        assert_eq!(facts.filtered_count, 0);
    }

    #[test]
    fn missing_id_column_never_matches() {
        let mut only_consent = Row::new();
        only_consent.insert(CONSENT_COLUMN.to_string(), "yes".to_string());
        only_consent.insert("ID".to_string(), "100001".to_string());
        let source = Source::new("list", vec![only_consent]);
        let facts = compute(&source, "100001");
        assert_eq!(facts.absolute_rank, None);
        assert_eq!(facts.filtered_count, 0);
    }

    #[test]
    fn short_row_is_skipped_for_filtering_only() {
        let data = format!("№;{};{}\n1;yes\n2;yes;100002\n", CONSENT_COLUMN, ID_COLUMN);
        let source = crate::source::parse_rows("list", data.as_bytes()).unwrap();
        let facts = compute(&source, "100002");
        assert_eq!(
            facts,
            RankingFacts {
                absolute_rank: Some(2),
                filtered_rank: Some(1),
                filtered_count: 1,
            }
        );
    }

    #[test]
    fn filtered_rank_never_exceeds_count_or_absolute_rank() {
        let rows: Vec<Row> = (0..40)
            .map(|i| {
                let consent = if i % 3 == 0 { "—" } else { "yes" };
                row(&format!("{}", 200000 + i), consent)
            })
            .collect();
        let source = Source::new("list", rows);

        for i in 0..40 {
            let facts = compute(&source, &format!("{}", 200000 + i));
            let absolute = facts.absolute_rank.unwrap();
            if let Some(filtered) = facts.filtered_rank {
                assert!(filtered <= facts.filtered_count);
                assert!(filtered <= absolute);
            }
        }
    }

    #[test]
    fn extraction_is_deterministic() {
        let source = sample_source();
        assert_eq!(compute(&source, "100002"), compute(&source, "100002"));
    }
}
