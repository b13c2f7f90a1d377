// Change Analyzer: walks company timelines to emit address-change events,
// employee-change summaries and dataset-wide statistics, and exposes the
// query surface the display layer consumes.

use crate::timeline::{Company, CompanyRegistry, TimelineEntry};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

// ============================================================================
// PERCENT DELTA
// ============================================================================

/// A percentage change rounded to one decimal, or the `N/A` sentinel when
/// the prior count was zero (division guard, not an error).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PercentDelta {
    Value(f64),
    NotAvailable,
}

impl PercentDelta {
    /// Percent change from `before` to `after`, one-decimal rounded.
    pub fn compute(before: u32, after: u32) -> Self {
        if before == 0 {
            PercentDelta::NotAvailable
        } else {
            let pct = (after as f64 - before as f64) / before as f64 * 100.0;
            PercentDelta::Value((pct * 10.0).round() / 10.0)
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            PercentDelta::Value(v) => Some(*v),
            PercentDelta::NotAvailable => None,
        }
    }

    pub fn abs(&self) -> Option<f64> {
        self.value().map(f64::abs)
    }

    pub fn is_available(&self) -> bool {
        matches!(self, PercentDelta::Value(_))
    }
}

impl fmt::Display for PercentDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PercentDelta::Value(v) => write!(f, "{:.1}", v),
            PercentDelta::NotAvailable => write!(f, "N/A"),
        }
    }
}

impl Serialize for PercentDelta {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

// ============================================================================
// DERIVED EVENTS
// ============================================================================

/// A detected difference between two chronologically adjacent observations'
/// location fields. Immutable once created.
#[derive(Debug, Clone, Serialize)]
pub struct AddressChangeEvent {
    pub orgnr: String,
    pub name: String,
    /// Year of the later observation, i.e. the year the move was first seen.
    pub year: i32,
    pub old_address: String,
    pub new_address: String,
    pub old_postal_code: String,
    pub new_postal_code: String,
    pub old_postal_place: String,
    pub new_postal_place: String,
    pub employees_before: u32,
    pub employees_after: u32,
    pub employee_change: i64,
    pub employee_change_percent: PercentDelta,
}

impl AddressChangeEvent {
    /// Data-quality signal: implausibly large swings are flagged for the
    /// consumer but never filtered out.
    pub fn is_extreme(&self) -> bool {
        if let Some(pct) = self.employee_change_percent.value() {
            if pct > 200.0 || pct < -50.0 {
                return true;
            }
        }
        self.employee_change.abs() > 100 && self.employees_before > 0
    }
}

/// First-to-last employee development for a company observed in at least
/// two distinct years.
#[derive(Debug, Clone, Serialize)]
pub struct EmployeeChangeSummary {
    pub orgnr: String,
    pub name: String,
    pub first_year: i32,
    pub last_year: i32,
    pub employees_start: u32,
    pub employees_end: u32,
    pub total_change: i64,
    pub total_change_percent: PercentDelta,
    /// Full timeline for drill-down display.
    pub timeline: Vec<TimelineEntry>,
}

/// An address-change event annotated with its distance from the reference
/// year, enriched with post-move development when a later observation
/// exists.
///
/// The two variants each carry a complete field set; consumers use the
/// accessor methods instead of coalescing optional fields.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind")]
pub enum MoverEvent {
    /// No observation after the move year: only at-move numbers exist.
    AtMove {
        event: AddressChangeEvent,
        years_since_move: i32,
    },
    /// A later observation exists: development since the move is known.
    SinceMove {
        event: AddressChangeEvent,
        years_since_move: i32,
        employees_at_move: u32,
        employees_now: u32,
        change_since_move: i64,
        percent_since_move: PercentDelta,
    },
}

impl MoverEvent {
    pub fn event(&self) -> &AddressChangeEvent {
        match self {
            MoverEvent::AtMove { event, .. } | MoverEvent::SinceMove { event, .. } => event,
        }
    }

    pub fn orgnr(&self) -> &str {
        &self.event().orgnr
    }

    pub fn name(&self) -> &str {
        &self.event().name
    }

    pub fn years_since_move(&self) -> i32 {
        match self {
            MoverEvent::AtMove {
                years_since_move, ..
            }
            | MoverEvent::SinceMove {
                years_since_move, ..
            } => *years_since_move,
        }
    }

    /// Employee delta: since the move when known, otherwise at the move.
    pub fn employee_change(&self) -> i64 {
        match self {
            MoverEvent::AtMove { event, .. } => event.employee_change,
            MoverEvent::SinceMove {
                change_since_move, ..
            } => *change_since_move,
        }
    }

    /// Percent delta: since the move when known, otherwise at the move.
    pub fn change_percent(&self) -> PercentDelta {
        match self {
            MoverEvent::AtMove { event, .. } => event.employee_change_percent,
            MoverEvent::SinceMove {
                percent_since_move, ..
            } => *percent_since_move,
        }
    }

    /// Latest known employee count.
    pub fn employees_now(&self) -> u32 {
        match self {
            MoverEvent::AtMove { event, .. } => event.employees_after,
            MoverEvent::SinceMove { employees_now, .. } => *employees_now,
        }
    }
}

/// Direction filter for change queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeDirection {
    All,
    Growth,
    Decline,
}

impl ChangeDirection {
    fn matches(&self, change: i64) -> bool {
        match self {
            ChangeDirection::All => true,
            ChangeDirection::Growth => change > 0,
            ChangeDirection::Decline => change < 0,
        }
    }
}

// ============================================================================
// STATISTICS
// ============================================================================

/// Dataset-wide aggregates for the overview display.
#[derive(Debug, Clone, Serialize)]
pub struct DatasetStatistics {
    pub total_companies: usize,
    pub total_address_changes: usize,
    /// Companies whose total change across the observed span is positive.
    pub companies_with_growth: usize,
    pub companies_with_reduction: usize,
    /// Sum of all positive total changes.
    pub total_employee_increase: i64,
    /// Absolute sum of all negative total changes.
    pub total_employee_decrease: i64,
    pub movers_8_years_ago: usize,
    pub movers_3_years_ago: usize,
    pub target_year_8_years_ago: Option<i32>,
    pub target_year_3_years_ago: Option<i32>,
    /// Count of change events flagged by [`AddressChangeEvent::is_extreme`].
    pub extreme_changes: usize,
    pub reference_year: Option<i32>,
    pub earliest_year: Option<i32>,
    /// (min, max) ingested year.
    pub year_range: Option<(i32, i32)>,
}

// ============================================================================
// ANALYSIS
// ============================================================================

/// The analyzed dataset: registry plus everything derived from it.
///
/// Rebuilt from scratch on every ingest; holds no incremental state.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    registry: CompanyRegistry,
    address_changes: Vec<AddressChangeEvent>,
    employee_changes: Vec<EmployeeChangeSummary>,
}

/// Derive all change events and summaries from a freshly built registry.
pub fn analyze(registry: CompanyRegistry) -> Analysis {
    let mut address_changes = Vec::new();
    let mut employee_changes = Vec::new();

    for company in registry.companies() {
        detect_address_changes(company, &mut address_changes);
        if let Some(summary) = summarize_employee_change(company) {
            employee_changes.push(summary);
        }
    }

    Analysis {
        registry,
        address_changes,
        employee_changes,
    }
}

fn detect_address_changes(company: &Company, out: &mut Vec<AddressChangeEvent>) {
    // One data point observes no change
    if company.timeline.len() < 2 {
        return;
    }

    for pair in company.timeline.windows(2) {
        let (prev, curr) = (&pair[0], &pair[1]);
        // Two empty locations never differ, so the "at least one non-empty
        // side" rule is implied by the key comparison.
        if location_key(prev) == location_key(curr) {
            continue;
        }

        let change = curr.employees as i64 - prev.employees as i64;
        out.push(AddressChangeEvent {
            orgnr: company.orgnr.clone(),
            name: company.name.clone(),
            year: curr.year,
            old_address: prev.address.clone(),
            new_address: curr.address.clone(),
            old_postal_code: prev.postal_code.clone(),
            new_postal_code: curr.postal_code.clone(),
            old_postal_place: prev.postal_place.clone(),
            new_postal_place: curr.postal_place.clone(),
            employees_before: prev.employees,
            employees_after: curr.employees,
            employee_change: change,
            employee_change_percent: PercentDelta::compute(prev.employees, curr.employees),
        });
    }
}

fn summarize_employee_change(company: &Company) -> Option<EmployeeChangeSummary> {
    let first = company.first_entry()?;
    let last = company.last_entry()?;
    if first.year == last.year {
        return None;
    }

    Some(EmployeeChangeSummary {
        orgnr: company.orgnr.clone(),
        name: company.name.clone(),
        first_year: first.year,
        last_year: last.year,
        employees_start: first.employees,
        employees_end: last.employees,
        total_change: last.employees as i64 - first.employees as i64,
        total_change_percent: PercentDelta::compute(first.employees, last.employees),
        timeline: company.timeline.clone(),
    })
}

/// Normalized location key: lower-cased, whitespace-collapsed components
/// joined. Any difference, postal fields included, counts as a move.
pub fn location_key(entry: &TimelineEntry) -> String {
    format!(
        "{}|{}|{}",
        collapse(&entry.address),
        collapse(&entry.postal_code),
        collapse(&entry.postal_place)
    )
}

fn collapse(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

impl Analysis {
    pub fn registry(&self) -> &CompanyRegistry {
        &self.registry
    }

    pub fn reference_year(&self) -> Option<i32> {
        self.registry.reference_year()
    }

    pub fn address_changes(&self) -> &[AddressChangeEvent] {
        &self.address_changes
    }

    pub fn employee_changes(&self) -> &[EmployeeChangeSummary] {
        &self.employee_changes
    }

    /// One company's full timeline, by registry key.
    pub fn company(&self, orgnr: &str) -> Option<&Company> {
        self.registry.company(orgnr)
    }

    /// Address-change events whose move year is exactly `years_ago` before
    /// the reference year, enriched with post-move development.
    pub fn movers_by_year(&self, years_ago: u32) -> Vec<MoverEvent> {
        let Some(target) = self.registry.target_year(years_ago) else {
            return Vec::new();
        };

        self.address_changes
            .iter()
            .filter(|e| e.year == target)
            .map(|e| self.enrich_mover(e))
            .collect()
    }

    /// Movers for a window, filtered by direction of the preferred delta and
    /// sorted by its magnitude, largest first.
    pub fn top_movers_by_year(
        &self,
        years_ago: u32,
        direction: ChangeDirection,
        limit: Option<usize>,
    ) -> Vec<MoverEvent> {
        let mut movers: Vec<MoverEvent> = self
            .movers_by_year(years_ago)
            .into_iter()
            .filter(|m| direction.matches(m.employee_change()))
            .collect();
        movers.sort_by_key(|m| std::cmp::Reverse(m.employee_change().abs()));
        if let Some(limit) = limit {
            movers.truncate(limit);
        }
        movers
    }

    /// Employee-change summaries filtered by direction and sorted by
    /// absolute total change, largest first.
    pub fn top_employee_changes(
        &self,
        direction: ChangeDirection,
        limit: Option<usize>,
    ) -> Vec<&EmployeeChangeSummary> {
        let mut changes: Vec<&EmployeeChangeSummary> = self
            .employee_changes
            .iter()
            .filter(|c| direction.matches(c.total_change))
            .collect();
        changes.sort_by_key(|c| std::cmp::Reverse(c.total_change.abs()));
        if let Some(limit) = limit {
            changes.truncate(limit);
        }
        changes
    }

    /// Address-change events grouped by move year, ascending.
    pub fn changes_by_year(&self) -> BTreeMap<i32, Vec<&AddressChangeEvent>> {
        let mut by_year: BTreeMap<i32, Vec<&AddressChangeEvent>> = BTreeMap::new();
        for event in &self.address_changes {
            by_year.entry(event.year).or_default().push(event);
        }
        by_year
    }

    /// Dataset-wide aggregates.
    pub fn statistics(&self) -> DatasetStatistics {
        let growth: Vec<&EmployeeChangeSummary> = self
            .employee_changes
            .iter()
            .filter(|c| c.total_change > 0)
            .collect();
        let decline: Vec<&EmployeeChangeSummary> = self
            .employee_changes
            .iter()
            .filter(|c| c.total_change < 0)
            .collect();

        let range = match (self.registry.earliest_year(), self.registry.reference_year()) {
            (Some(min), Some(max)) => Some((min, max)),
            _ => None,
        };

        DatasetStatistics {
            total_companies: self.registry.len(),
            total_address_changes: self.address_changes.len(),
            companies_with_growth: growth.len(),
            companies_with_reduction: decline.len(),
            total_employee_increase: growth.iter().map(|c| c.total_change).sum(),
            total_employee_decrease: decline.iter().map(|c| c.total_change).sum::<i64>().abs(),
            movers_8_years_ago: self.movers_by_year(8).len(),
            movers_3_years_ago: self.movers_by_year(3).len(),
            target_year_8_years_ago: self.registry.target_year(8),
            target_year_3_years_ago: self.registry.target_year(3),
            extreme_changes: self
                .address_changes
                .iter()
                .filter(|e| e.is_extreme())
                .count(),
            reference_year: self.registry.reference_year(),
            earliest_year: self.registry.earliest_year(),
            year_range: range,
        }
    }

    fn enrich_mover(&self, event: &AddressChangeEvent) -> MoverEvent {
        let reference = self
            .registry
            .reference_year()
            .unwrap_or(event.year);
        let years_since_move = reference - event.year;

        // Post-move development requires an observation after the move year
        let later = self
            .registry
            .company(&event.orgnr)
            .and_then(|c| c.last_entry())
            .filter(|last| last.year > event.year);

        match later {
            Some(last) => MoverEvent::SinceMove {
                years_since_move,
                employees_at_move: event.employees_after,
                employees_now: last.employees,
                change_since_move: last.employees as i64 - event.employees_after as i64,
                percent_since_move: PercentDelta::compute(event.employees_after, last.employees),
                event: event.clone(),
            },
            None => MoverEvent::AtMove {
                years_since_move,
                event: event.clone(),
            },
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_extract;
    use crate::timeline::build_timelines;

    fn analysis_from(files: Vec<(&str, String)>) -> Analysis {
        let parsed = files
            .into_iter()
            .map(|(name, body)| {
                let text = format!(
                    "Orgnr;Navn;Forretningsadresse;Fadr postnr;Fadr poststed;Antall ansatte\n-;-;-;-;-;-\n{}",
                    body
                );
                parse_extract(&text, name)
            })
            .collect();
        analyze(build_timelines(parsed))
    }

    fn two_year_move() -> Analysis {
        analysis_from(vec![
            (
                "enheter_2015.csv",
                "900000000;Fjellheim AS;Storgata 1;0155;Oslo;10\n".to_string(),
            ),
            (
                "enheter_2023.csv",
                "900000000;Fjellheim AS;Storgata 2;0155;Oslo;25\n".to_string(),
            ),
        ])
    }

    #[test]
    fn test_single_move_detected() {
        let analysis = two_year_move();
        let changes = analysis.address_changes();
        assert_eq!(changes.len(), 1);

        let event = &changes[0];
        assert_eq!(event.year, 2023);
        assert_eq!(event.old_address, "Storgata 1");
        assert_eq!(event.new_address, "Storgata 2");
        assert_eq!(event.employee_change, 15);
        assert_eq!(event.employee_change_percent.to_string(), "150.0");
    }

    #[test]
    fn test_single_entry_contributes_nothing() {
        let analysis = analysis_from(vec![(
            "enheter_2023.csv",
            "1;Alene AS;Gata 1;0155;Oslo;5\n".to_string(),
        )]);
        assert!(analysis.address_changes().is_empty());
        assert!(analysis.employee_changes().is_empty());
    }

    #[test]
    fn test_postal_change_alone_is_a_move() {
        let analysis = analysis_from(vec![
            ("2019.csv", "1;Alpha;Gata 1;0155;Oslo;5\n".to_string()),
            ("2020.csv", "1;Alpha;Gata 1;5003;Bergen;5\n".to_string()),
        ]);
        assert_eq!(analysis.address_changes().len(), 1);
    }

    #[test]
    fn test_whitespace_and_case_do_not_count_as_moves() {
        let analysis = analysis_from(vec![
            ("2019.csv", "1;Alpha;Storgata  1;0155;Oslo;5\n".to_string()),
            ("2020.csv", "1;Alpha;STORGATA 1;0155;OSLO;5\n".to_string()),
        ]);
        assert!(analysis.address_changes().is_empty());
    }

    #[test]
    fn test_empty_locations_are_not_a_change() {
        let analysis = analysis_from(vec![
            ("2019.csv", "1;Alpha;;;;5\n".to_string()),
            ("2020.csv", "1;Alpha;;;;9\n".to_string()),
        ]);
        assert!(analysis.address_changes().is_empty());
        // but an address appearing where none was is a change
        let analysis = analysis_from(vec![
            ("2019.csv", "1;Alpha;;;;5\n".to_string()),
            ("2020.csv", "1;Alpha;Gata 1;0155;Oslo;9\n".to_string()),
        ]);
        assert_eq!(analysis.address_changes().len(), 1);
    }

    #[test]
    fn test_percent_sentinel_on_zero_before() {
        let analysis = analysis_from(vec![
            ("2019.csv", "1;Alpha;Gata 1;0155;Oslo;0\n".to_string()),
            ("2020.csv", "1;Alpha;Gata 2;0155;Oslo;5\n".to_string()),
        ]);
        let event = &analysis.address_changes()[0];
        assert_eq!(event.employee_change_percent, PercentDelta::NotAvailable);
        assert_eq!(event.employee_change_percent.to_string(), "N/A");
        // Delta of 5 does not trip the absolute-delta extreme rule, and the
        // percent rule needs a positive prior count
        assert!(!event.is_extreme());
    }

    #[test]
    fn test_extreme_change_rules() {
        let base = AddressChangeEvent {
            orgnr: "1".into(),
            name: "Alpha".into(),
            year: 2020,
            old_address: "A".into(),
            new_address: "B".into(),
            old_postal_code: String::new(),
            new_postal_code: String::new(),
            old_postal_place: String::new(),
            new_postal_place: String::new(),
            employees_before: 10,
            employees_after: 40,
            employee_change: 30,
            employee_change_percent: PercentDelta::compute(10, 40),
        };
        assert!(!base.is_extreme());

        let spike = AddressChangeEvent {
            employees_after: 35,
            employee_change: 25,
            employee_change_percent: PercentDelta::compute(10, 35),
            ..base.clone()
        };
        assert!(spike.is_extreme()); // +250% > 200%

        let collapse = AddressChangeEvent {
            employees_before: 100,
            employees_after: 40,
            employee_change: -60,
            employee_change_percent: PercentDelta::compute(100, 40),
            ..base.clone()
        };
        assert!(collapse.is_extreme()); // -60% < -50%

        let bulk = AddressChangeEvent {
            employees_before: 200,
            employees_after: 350,
            employee_change: 150,
            employee_change_percent: PercentDelta::compute(200, 350),
            ..base
        };
        assert!(bulk.is_extreme()); // |150| > 100 with positive prior count
    }

    #[test]
    fn test_summary_spans_whole_timeline() {
        let analysis = analysis_from(vec![
            ("2015.csv", "1;Alpha;Gata 1;0155;Oslo;10\n".to_string()),
            ("2019.csv", "1;Alpha;Gata 2;0155;Oslo;4\n".to_string()),
            ("2023.csv", "1;Alpha;Gata 3;0155;Oslo;30\n".to_string()),
        ]);
        let summaries = analysis.employee_changes();
        assert_eq!(summaries.len(), 1);
        let summary = &summaries[0];
        assert_eq!(summary.first_year, 2015);
        assert_eq!(summary.last_year, 2023);
        assert_eq!(summary.total_change, 20);
        assert_eq!(summary.total_change_percent.to_string(), "200.0");
        assert_eq!(summary.timeline.len(), 3);
        // two moves, one summary
        assert_eq!(analysis.address_changes().len(), 2);
    }

    #[test]
    fn test_movers_enriched_with_since_move_development() {
        let analysis = analysis_from(vec![
            ("2015.csv", "1;Alpha;Gata 1;0155;Oslo;10\n".to_string()),
            ("2018.csv", "1;Alpha;Gata 2;0155;Oslo;12\n".to_string()),
            ("2023.csv", "1;Alpha;Gata 2;0155;Oslo;40\n".to_string()),
        ]);
        // reference year 2023; move in 2018 is 5 years ago
        let movers = analysis.movers_by_year(5);
        assert_eq!(movers.len(), 1);
        match &movers[0] {
            MoverEvent::SinceMove {
                years_since_move,
                employees_at_move,
                employees_now,
                change_since_move,
                percent_since_move,
                ..
            } => {
                assert_eq!(*years_since_move, 5);
                assert_eq!(*employees_at_move, 12);
                assert_eq!(*employees_now, 40);
                assert_eq!(*change_since_move, 28);
                assert_eq!(percent_since_move.to_string(), "233.3");
            }
            other => panic!("expected SinceMove, got {:?}", other),
        }
    }

    #[test]
    fn test_mover_without_later_observation_is_at_move() {
        let analysis = two_year_move();
        // move seen in 2023 == reference year, nothing after it
        let movers = analysis.movers_by_year(0);
        assert_eq!(movers.len(), 1);
        match &movers[0] {
            MoverEvent::AtMove {
                years_since_move, ..
            } => {
                assert_eq!(*years_since_move, 0);
                assert_eq!(movers[0].employee_change(), 15);
                assert_eq!(movers[0].employees_now(), 25);
            }
            other => panic!("expected AtMove, got {:?}", other),
        }
    }

    #[test]
    fn test_statistics_aggregation() {
        let analysis = analysis_from(vec![
            (
                "2015.csv",
                "1;Vokser AS;Gata 1;0155;Oslo;10\n2;Krymper AS;Vei 1;5003;Bergen;50\n".to_string(),
            ),
            (
                "2023.csv",
                "1;Vokser AS;Gata 2;0155;Oslo;25\n2;Krymper AS;Vei 1;5003;Bergen;30\n".to_string(),
            ),
        ]);
        let stats = analysis.statistics();

        assert_eq!(stats.total_companies, 2);
        assert_eq!(stats.total_address_changes, 1);
        assert_eq!(stats.companies_with_growth, 1);
        assert_eq!(stats.companies_with_reduction, 1);
        assert_eq!(stats.total_employee_increase, 15);
        assert_eq!(stats.total_employee_decrease, 20);
        assert_eq!(stats.reference_year, Some(2023));
        assert_eq!(stats.earliest_year, Some(2015));
        assert_eq!(stats.year_range, Some((2015, 2023)));
        assert_eq!(stats.target_year_8_years_ago, Some(2015));
        // the single move happened in 2023, not 2015 or 2020
        assert_eq!(stats.movers_8_years_ago, 0);
        assert_eq!(stats.movers_3_years_ago, 0);
        assert_eq!(stats.extreme_changes, 0);
    }

    #[test]
    fn test_changes_grouped_by_year() {
        let analysis = analysis_from(vec![
            ("2015.csv", "1;Alpha;Gata 1;0155;Oslo;5\n2;Beta;Vei 1;5003;Bergen;7\n".to_string()),
            ("2019.csv", "1;Alpha;Gata 2;0155;Oslo;5\n2;Beta;Vei 1;5003;Bergen;7\n".to_string()),
            ("2023.csv", "1;Alpha;Gata 2;0155;Oslo;5\n2;Beta;Vei 2;5003;Bergen;7\n".to_string()),
        ]);
        let by_year = analysis.changes_by_year();
        assert_eq!(by_year.len(), 2);
        assert_eq!(by_year[&2019].len(), 1);
        assert_eq!(by_year[&2023].len(), 1);
    }

    #[test]
    fn test_top_employee_changes_ordering_and_direction() {
        let analysis = analysis_from(vec![
            (
                "2015.csv",
                "1;Alpha;Gata 1;0155;Oslo;10\n2;Beta;Vei 1;5003;Bergen;100\n3;Gamma;Sti 1;7010;Trondheim;20\n"
                    .to_string(),
            ),
            (
                "2023.csv",
                "1;Alpha;Gata 1;0155;Oslo;15\n2;Beta;Vei 1;5003;Bergen;40\n3;Gamma;Sti 1;7010;Trondheim;20\n"
                    .to_string(),
            ),
        ]);

        let all = analysis.top_employee_changes(ChangeDirection::All, None);
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].orgnr, "2"); // |-60| biggest

        let growth = analysis.top_employee_changes(ChangeDirection::Growth, None);
        assert_eq!(growth.len(), 1);
        assert_eq!(growth[0].orgnr, "1");

        let capped = analysis.top_employee_changes(ChangeDirection::All, Some(1));
        assert_eq!(capped.len(), 1);
    }

    #[test]
    fn test_idempotent_rebuild() {
        let a = two_year_move().statistics();
        let b = two_year_move().statistics();
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }
}
