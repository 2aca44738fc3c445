use aero_core::catalog::{CabinClass, ScheduleDetail};
use aero_core::repository::{AirlineRepository, ScheduleRepository};
use aero_core::search::ScheduleSearch;
use aero_core::{CoreError, CoreResult, DataSource, Sources};
use aero_shared::validate::normalize_code;
use aero_shared::{Page, PageRequest};
use chrono::NaiveDate;
use futures_util::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::policy::AccessPolicy;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SearchSettings {
    /// Per-airline queries in flight at once
    pub max_concurrency: usize,
    /// Page size used to fetch every match for one airline
    pub per_airline_limit: u32,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            max_concurrency: 4,
            per_airline_limit: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlightSearchQuery {
    pub origin: String,
    pub destination: String,
    pub departure_date: NaiveDate,
    pub cabin_class: CabinClass,
    /// Empty means every active airline
    pub airline_ids: Vec<String>,
    pub page: PageRequest,
}

/// One schedule in a search result, tagged with where it was read from.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SearchHit {
    #[serde(flatten)]
    pub schedule: ScheduleDetail,
    pub cabin_class: CabinClass,
    pub price: f64,
    pub data_source: DataSource,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SearchOutcome {
    #[serde(flatten)]
    pub page: Page<SearchHit>,
    /// Airlines whose query failed and are missing from `page`
    pub failed_airlines: Vec<String>,
}

struct AirlineResult {
    airline_id: String,
    source: DataSource,
    schedules: CoreResult<Vec<ScheduleDetail>>,
}

/// Fans a route search out per airline across the staging and production
/// catalogs and merges the results.
pub struct FlightSearch {
    schedules: Sources<dyn ScheduleRepository>,
    airlines: Arc<dyn AirlineRepository>,
    settings: SearchSettings,
}

impl FlightSearch {
    /// `airlines` is the catalog used to enumerate active airlines when the
    /// query carries no filter.
    pub fn new(
        schedules: Sources<dyn ScheduleRepository>,
        airlines: Arc<dyn AirlineRepository>,
        settings: SearchSettings,
    ) -> Self {
        Self {
            schedules,
            airlines,
            settings,
        }
    }

    pub async fn search(&self, query: &FlightSearchQuery, policy: &AccessPolicy) -> CoreResult<SearchOutcome> {
        let origin = normalize_code(&query.origin);
        let destination = normalize_code(&query.destination);
        if origin.is_empty() || destination.is_empty() {
            return Err(CoreError::ValidationError(
                "origin and destination are required".to_string(),
            ));
        }

        let candidates = self.candidate_airlines(&query.airline_ids).await?;
        debug!(
            %origin,
            %destination,
            date = %query.departure_date,
            candidates = candidates.len(),
            "flight search fan-out"
        );

        let limit = PageRequest::new(1, self.settings.per_airline_limit);
        let lookups = candidates.into_iter().map(|airline_id| {
            let source = policy.source_for_airline(&airline_id);
            let filter = ScheduleSearch::route(&origin, &destination)
                .on_date(query.departure_date)
                .for_airline(&airline_id)
                .with_page(limit);
            let repo = Arc::clone(self.schedules.get(source));
            async move {
                let schedules = repo.search(&filter).await.map(|(found, _)| found);
                AirlineResult {
                    airline_id,
                    source,
                    schedules,
                }
            }
        });

        // `buffered` yields in input order.
        let results: Vec<AirlineResult> = stream::iter(lookups)
            .buffered(self.settings.max_concurrency.max(1))
            .collect()
            .await;

        let (hits, failed_airlines) = merge(results, query.cabin_class);
        if !failed_airlines.is_empty() {
            info!(failed = ?failed_airlines, "flight search returned partial results");
        }

        Ok(SearchOutcome {
            page: Page::slice(hits, query.page),
            failed_airlines,
        })
    }

    async fn candidate_airlines(&self, filter: &[String]) -> CoreResult<Vec<String>> {
        let mut ids: Vec<String> = Vec::new();
        for id in filter.iter().map(|id| id.trim()).filter(|id| !id.is_empty()) {
            if !ids.iter().any(|seen| seen == id) {
                ids.push(id.to_string());
            }
        }
        if !ids.is_empty() {
            return Ok(ids);
        }

        Ok(self
            .airlines
            .list_active()
            .await?
            .into_iter()
            .map(|airline| airline.id)
            .collect())
    }
}

fn merge(results: Vec<AirlineResult>, cabin_class: CabinClass) -> (Vec<SearchHit>, Vec<String>) {
    let mut hits = Vec::new();
    let mut failed = Vec::new();

    for result in results {
        match result.schedules {
            Ok(schedules) => hits.extend(schedules.into_iter().map(|schedule| SearchHit {
                price: schedule.schedule.price_for(cabin_class),
                schedule,
                cabin_class,
                data_source: result.source,
            })),
            Err(err) => {
                warn!(
                    airline_id = %result.airline_id,
                    source = %result.source,
                    error = %err,
                    "airline schedule query failed"
                );
                failed.push(result.airline_id);
            }
        }
    }

    // Stable: equal departure times keep airline order.
    hits.sort_by(|a, b| a.schedule.schedule.departure_time.cmp(&b.schedule.schedule.departure_time));
    (hits, failed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aero_core::catalog::{Airline, AirlineRef, AirportRef, Schedule};
    use aero_core::repository::{MockAirlineRepository, MockScheduleRepository};
    use aero_core::DaysOfWeek;
    use chrono::Utc;
    use mockall::predicate::function;

    fn detail(airline_id: &str, flight_number: &str, departure_time: &str) -> ScheduleDetail {
        let today = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        ScheduleDetail {
            schedule: Schedule {
                id: format!("{}-{}", airline_id, flight_number),
                airline_id: airline_id.into(),
                flight_number: flight_number.into(),
                departure_airport_id: "cgk".into(),
                departure_terminal: "3".into(),
                departure_time: departure_time.into(),
                arrival_airport_id: "dps".into(),
                arrival_terminal: "D".into(),
                arrival_time: "23:59".into(),
                duration_minutes: 110,
                aircraft: "A320".into(),
                days_of_week: DaysOfWeek::every_day(),
                economy_price: 1000.0,
                business_price: 3000.0,
                first_class_price: 6000.0,
                economy_seats: 150,
                business_seats: 30,
                first_class_seats: 10,
                is_active: true,
                valid_from: today,
                valid_until: today,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            airline: AirlineRef {
                id: airline_id.into(),
                code: airline_id.to_uppercase(),
                name: airline_id.into(),
                logo: None,
            },
            departure_airport: AirportRef {
                id: "cgk".into(),
                code: "CGK".into(),
                city: "Jakarta".into(),
                name: "Soekarno-Hatta".into(),
            },
            arrival_airport: AirportRef {
                id: "dps".into(),
                code: "DPS".into(),
                city: "Denpasar".into(),
                name: "Ngurah Rai".into(),
            },
        }
    }

    fn for_airline(id: &'static str) -> impl Fn(&ScheduleSearch) -> bool {
        move |filter: &ScheduleSearch| filter.airline_ids == vec![id.to_string()]
    }

    /// A catalog that answers every airline with one schedule per airline,
    /// flight numbers prefixed with the catalog name.
    fn catalog(name: &'static str, airlines: &[&'static str]) -> MockScheduleRepository {
        let mut repo = MockScheduleRepository::new();
        for &airline in airlines {
            repo.expect_search()
                .with(function(for_airline(airline)))
                .returning(move |_| Ok((vec![detail(airline, &format!("{}-{}", name, airline), "08:00")], 1)));
        }
        repo
    }

    fn engine(staging: MockScheduleRepository, production: MockScheduleRepository, airlines: MockAirlineRepository) -> FlightSearch {
        FlightSearch::new(
            Sources::<dyn ScheduleRepository>::new(Arc::new(staging), Arc::new(production)),
            Arc::new(airlines),
            SearchSettings::default(),
        )
    }

    fn query(airline_ids: &[&str], page: PageRequest) -> FlightSearchQuery {
        FlightSearchQuery {
            origin: "cgk".into(),
            destination: "dps".into(),
            departure_date: NaiveDate::from_ymd_opt(2030, 6, 3).unwrap(),
            cabin_class: CabinClass::Economy,
            airline_ids: airline_ids.iter().map(|s| s.to_string()).collect(),
            page,
        }
    }

    #[tokio::test]
    async fn test_sources_split_by_enabled_airlines() {
        let airlines = ["ga", "jt", "qg"];
        let engine = engine(
            catalog("stg", &airlines),
            catalog("prd", &airlines),
            MockAirlineRepository::new(),
        );
        let policy = AccessPolicy::new("a@b.com", vec!["ga".to_string(), "qg".to_string()]);

        let outcome = engine
            .search(&query(&airlines, PageRequest::new(1, 50)), &policy)
            .await
            .unwrap();

        let mut got: Vec<(String, DataSource)> = outcome
            .page
            .data
            .iter()
            .map(|hit| (hit.schedule.schedule.flight_number.clone(), hit.data_source))
            .collect();
        got.sort();
        assert_eq!(
            got,
            vec![
                ("prd-ga".to_string(), DataSource::Production),
                ("prd-qg".to_string(), DataSource::Production),
                ("stg-jt".to_string(), DataSource::Staging),
            ]
        );
        assert!(outcome.failed_airlines.is_empty());
        assert_eq!(outcome.page.total_items, 3);
    }

    #[tokio::test]
    async fn test_anonymous_search_reads_staging() {
        let mut production = MockScheduleRepository::new();
        production.expect_search().never();
        let engine = engine(catalog("stg", &["ga"]), production, MockAirlineRepository::new());

        let outcome = engine
            .search(&query(&["ga"], PageRequest::default()), &AccessPolicy::anonymous())
            .await
            .unwrap();
        assert_eq!(outcome.page.data.len(), 1);
        assert_eq!(outcome.page.data[0].data_source, DataSource::Staging);
    }

    #[tokio::test]
    async fn test_failed_airline_is_reported() {
        let mut staging = catalog("stg", &["ga"]);
        staging
            .expect_search()
            .with(function(for_airline("jt")))
            .returning(|_| Err(CoreError::InternalError("relation missing".into())));
        let engine = engine(staging, MockScheduleRepository::new(), MockAirlineRepository::new());

        let outcome = engine
            .search(&query(&["ga", "jt"], PageRequest::default()), &AccessPolicy::anonymous())
            .await
            .unwrap();
        assert_eq!(outcome.page.total_items, 1);
        assert_eq!(outcome.failed_airlines, vec!["jt".to_string()]);
    }

    #[tokio::test]
    async fn test_merged_results_sorted_by_departure() {
        let mut staging = MockScheduleRepository::new();
        staging
            .expect_search()
            .with(function(for_airline("ga")))
            .returning(|_| Ok((vec![detail("ga", "GA-1", "09:00"), detail("ga", "GA-2", "18:00")], 2)));
        staging
            .expect_search()
            .with(function(for_airline("jt")))
            .returning(|_| Ok((vec![detail("jt", "JT-1", "06:30"), detail("jt", "JT-2", "09:00")], 2)));
        let engine = engine(staging, MockScheduleRepository::new(), MockAirlineRepository::new());

        let outcome = engine
            .search(&query(&["ga", "jt"], PageRequest::default()), &AccessPolicy::anonymous())
            .await
            .unwrap();
        let order: Vec<&str> = outcome
            .page
            .data
            .iter()
            .map(|hit| hit.schedule.schedule.flight_number.as_str())
            .collect();
        assert_eq!(order, vec!["JT-1", "GA-1", "JT-2", "GA-2"]);
    }

    #[tokio::test]
    async fn test_pagination_slices_merged_list() {
        let mut staging = MockScheduleRepository::new();
        staging.expect_search().returning(|_| {
            let found: Vec<ScheduleDetail> = (0..5)
                .map(|i| detail("ga", &format!("GA-{}", i), &format!("0{}:00", i)))
                .collect();
            Ok((found, 5))
        });
        let engine = engine(staging, MockScheduleRepository::new(), MockAirlineRepository::new());
        let policy = AccessPolicy::anonymous();

        let second = engine.search(&query(&["ga"], PageRequest::new(2, 2)), &policy).await.unwrap();
        assert_eq!(second.page.data.len(), 2);
        assert_eq!(second.page.data[0].schedule.schedule.flight_number, "GA-2");
        assert_eq!(second.page.total_items, 5);
        assert_eq!(second.page.total_pages, 3);

        let last = engine.search(&query(&["ga"], PageRequest::new(3, 2)), &policy).await.unwrap();
        assert_eq!(last.page.data.len(), 1);

        let past_end = engine.search(&query(&["ga"], PageRequest::new(4, 2)), &policy).await.unwrap();
        assert!(past_end.page.data.is_empty());
        assert_eq!(past_end.page.total_items, 5);
    }

    #[tokio::test]
    async fn test_no_filter_uses_active_airlines() {
        let mut airlines = MockAirlineRepository::new();
        airlines.expect_list_active().times(1).returning(|| {
            let mut ga = Airline::new("GA".into(), "Garuda".into(), None);
            ga.id = "ga".into();
            Ok(vec![ga])
        });
        let engine = engine(catalog("stg", &["ga"]), MockScheduleRepository::new(), airlines);

        let outcome = engine
            .search(&query(&[], PageRequest::default()), &AccessPolicy::anonymous())
            .await
            .unwrap();
        assert_eq!(outcome.page.total_items, 1);
    }

    #[tokio::test]
    async fn test_cabin_selects_hit_price() {
        let engine = engine(catalog("stg", &["ga"]), MockScheduleRepository::new(), MockAirlineRepository::new());
        let mut q = query(&["ga"], PageRequest::default());
        q.cabin_class = CabinClass::Business;

        let outcome = engine.search(&q, &AccessPolicy::anonymous()).await.unwrap();
        assert_eq!(outcome.page.data[0].price, 3000.0);
    }
}
