//! Unit tests for the analytics engine
//!
//! Fixture data lives under tests/fixtures/ and mirrors the production data
//! shapes: a Mongo log export with deliberately malformed entries and one
//! query benchmark dataset.

#[cfg(test)]
mod tests {
    use crate::models::{LogRecord, MongoDate, QueryResult, RecordMetadata};
    use crate::services::analyzer::*;
    use chrono::{DateTime, TimeZone, Utc};
    use std::fs;
    use std::path::PathBuf;

    /// Get the path to test fixtures
    fn fixture_path(filename: &str) -> PathBuf {
        let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        path.push("tests/fixtures");
        path.push(filename);
        path
    }

    fn load_json(filename: &str) -> serde_json::Value {
        let path = fixture_path(filename);
        let text = fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("Failed to load fixture {}: {}", path.display(), e));
        serde_json::from_str(&text).expect("fixture is valid JSON")
    }

    fn fixture_records() -> Vec<LogRecord> {
        let (records, _) = normalize(&load_json("logs_sample.json"));
        records
    }

    /// Minimal record builder for targeted cases
    fn record(user: &str, created: DateTime<Utc>, params: &[(&str, &str)]) -> LogRecord {
        LogRecord {
            id: format!("test-{}", user),
            metadata: RecordMetadata {
                created: MongoDate::from(created),
                modified: MongoDate::from(created),
            },
            status: Some("OK".to_owned()),
            request_body: None,
            request_body_dictionary: params
                .iter()
                .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
                .collect(),
            response_body: None,
            path: "/api/test".to_owned(),
            query: None,
            user: user.to_owned(),
        }
    }

    fn jan(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, hour, 0, 0).unwrap()
    }

    // ========================================================================
    // Normalizer
    // ========================================================================

    mod normalizer_tests {
        use super::*;

        #[test]
        fn test_fixture_counts_and_order() {
            let (records, error_count) = normalize(&load_json("logs_sample.json"));

            // 7 elements total, one null and one string are rejected
            assert_eq!(error_count, 2);
            assert_eq!(records.len(), 5);

            let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
            assert_eq!(ids, vec!["65f1a0001", "65f1a0002", "65f1a0003", "65f1a0004", "65f1a0005"]);
        }

        #[test]
        fn test_non_array_payload_yields_empty() {
            let (records, error_count) = normalize(&serde_json::json!({"not": "an array"}));
            assert!(records.is_empty());
            assert_eq!(error_count, 0);
        }

        #[test]
        fn test_valid_timestamps_are_kept() {
            let records = fixture_records();
            assert_eq!(
                records[0].created_at(),
                Utc.with_ymd_and_hms(2024, 1, 4, 8, 15, 0).unwrap()
            );
        }

        #[test]
        fn test_unparseable_timestamp_defaults_to_now() {
            let before = Utc::now();
            let records = fixture_records();
            let after = Utc::now();

            // 65f1a0004 carries "not a date" and no Modified section at all
            let patched = records.iter().find(|r| r.id == "65f1a0004").unwrap();
            assert!(patched.created_at() >= before && patched.created_at() <= after);
            assert!(
                patched.metadata.modified.date >= before && patched.metadata.modified.date <= after
            );
        }

        #[test]
        fn test_malformed_entry_does_not_abort_batch() {
            let payload = serde_json::json!([
                null,
                {"_id": "ok", "Path": "/p", "User": "u"},
                42
            ]);
            let (records, error_count) = normalize(&payload);
            assert_eq!(records.len(), 1);
            assert_eq!(error_count, 2);
            assert_eq!(records[0].id, "ok");
        }
    }

    // ========================================================================
    // Timer extraction
    // ========================================================================

    mod timer_tests {
        use super::*;

        #[test]
        fn test_extracts_matching_keys_case_insensitive() {
            let r = record("alice", jan(4, 8), &[("sw1", "100"), ("SW2", "250")]);
            let timers = extract_timers(&r);
            assert_eq!(timers.get("sw1"), Some(&100));
            assert_eq!(timers.get("SW2"), Some(&250));
        }

        #[test]
        fn test_non_matching_keys_never_appear() {
            let r = record(
                "alice",
                jan(4, 8),
                &[("swx1", "777"), ("sw", "1"), ("1sw2", "2"), ("sw3extra", "3"), ("VehicleId", "9")],
            );
            assert!(extract_timers(&r).is_empty());
        }

        #[test]
        fn test_non_numeric_value_silently_dropped() {
            let r = record("alice", jan(4, 8), &[("sw1", "not-a-number"), ("sw2", "42")]);
            let timers = extract_timers(&r);
            assert_eq!(timers.len(), 1);
            assert_eq!(timers.get("sw2"), Some(&42));
        }

        #[test]
        fn test_empty_parameter_map() {
            let r = record("alice", jan(4, 8), &[]);
            assert!(extract_timers(&r).is_empty());
        }

        #[test]
        fn test_timer_index_orders_numerically() {
            assert!(timers::timer_index("sw7") < timers::timer_index("sw12"));
            assert!(timers::timer_index("sw2") < timers::timer_index("sw10"));
            // Names without digits sort last
            assert_eq!(timers::timer_index("swfoo"), u64::MAX);
        }

        #[test]
        fn test_display_name_catalog_and_fallback() {
            assert_eq!(timers::display_name("sw7"), "SW7: Order Get with api");
            assert_eq!(timers::display_name("SW7"), "SW7: Order Get with api");
            assert_eq!(timers::display_name("sw99"), "SW99");
            assert_eq!(timers::timer_description("sw99"), "");
        }
    }

    // ========================================================================
    // Statistics aggregation
    // ========================================================================

    mod stats_tests {
        use super::*;

        #[test]
        fn test_two_record_scenario() {
            let records = vec![
                record("alice", jan(4, 8), &[("sw1", "15000")]),
                record("bob", jan(5, 9), &[("sw1", "5000")]),
            ];

            let analytics = stats::aggregate(&records);
            assert_eq!(analytics.total_entries, 2);
            assert_eq!(analytics.unique_users, 2);

            assert_eq!(analytics.timer_stats.len(), 1);
            let sw1 = &analytics.timer_stats[0];
            assert_eq!(sw1.timer, "sw1");
            assert_eq!(sw1.count, 2);
            assert_eq!(sw1.total, 20000);
            assert_eq!(sw1.average, 10000.0);
            assert_eq!(sw1.min, 5000);
            assert_eq!(sw1.max, 15000);
            // 15000 > 10000, 5000 is not
            assert_eq!(sw1.over_10s, 1);
            assert_eq!(sw1.over_20s, 0);

            // Same via the caller-supplied threshold path (seconds x 1000)
            let counts = stats::threshold_counts(&records, 10);
            assert_eq!(counts.get("sw1"), Some(&1));
        }

        #[test]
        fn test_invariants_on_fixture_data() {
            let analytics = stats::aggregate(&fixture_records());
            assert!(!analytics.timer_stats.is_empty());

            for stat in &analytics.timer_stats {
                assert!(stat.count > 0, "no zero-filled entries");
                assert!(stat.min as f64 <= stat.average && stat.average <= stat.max as f64);
                let reconstructed = stat.average * stat.count as f64;
                assert!((reconstructed - stat.total as f64).abs() < 1e-6);
            }
        }

        #[test]
        fn test_threshold_monotonicity() {
            let records = fixture_records();
            let low = stats::threshold_counts(&records, 10);
            let high = stats::threshold_counts(&records, 20);

            assert_eq!(
                low.keys().collect::<std::collections::BTreeSet<_>>(),
                high.keys().collect::<std::collections::BTreeSet<_>>()
            );
            for (timer, count) in &low {
                assert!(count >= high.get(timer).unwrap(), "t=10 must dominate t=20 for {}", timer);
            }
        }

        #[test]
        fn test_strictly_greater_comparison() {
            // A value exactly at the cutoff does not count
            let records = vec![record("alice", jan(4, 8), &[("sw1", "10000")])];
            let counts = stats::threshold_counts(&records, 10);
            assert_eq!(counts.get("sw1"), Some(&0));
        }

        #[test]
        fn test_sorted_by_numeric_suffix() {
            let records = fixture_records();
            let analytics = stats::aggregate(&records);
            let names: Vec<&str> =
                analytics.timer_stats.iter().map(|s| s.timer.as_str()).collect();
            // Lexical order would put sw12 before sw2/sw7
            assert_eq!(names, vec!["sw1", "SW2", "sw2", "sw7", "sw12", "sw30"]);
        }

        #[test]
        fn test_unique_users_ignores_empty_user() {
            let analytics = stats::aggregate(&fixture_records());
            // alice, bob, carol; the "" user is not counted
            assert_eq!(analytics.unique_users, 3);
        }

        #[test]
        fn test_date_range_over_fixture() {
            let records: Vec<LogRecord> =
                fixture_records().into_iter().filter(|r| r.id != "65f1a0004").collect();
            let analytics = stats::aggregate(&records);
            assert_eq!(analytics.date_range.earliest.date_naive().to_string(), "2024-01-04");
            assert_eq!(analytics.date_range.latest.date_naive().to_string(), "2024-01-06");
        }

        #[test]
        fn test_empty_collection_defaults_range_to_now() {
            let before = Utc::now();
            let analytics = stats::aggregate(&[]);
            let after = Utc::now();

            assert_eq!(analytics.total_entries, 0);
            assert!(analytics.timer_stats.is_empty());
            assert!(analytics.date_range.earliest >= before && analytics.date_range.latest <= after);
        }
    }

    // ========================================================================
    // Record filter
    // ========================================================================

    mod filter_tests {
        use super::*;

        fn spec(
            user: Option<&str>,
            from: Option<&str>,
            to: Option<&str>,
            search: Option<&str>,
        ) -> FilterSpec {
            FilterSpec {
                user: user.map(str::to_owned),
                date_from: from.map(|d| d.parse().unwrap()),
                date_to: to.map(|d| d.parse().unwrap()),
                search: search.map(str::to_owned),
            }
        }

        fn ids(records: &[LogRecord]) -> Vec<&str> {
            records.iter().map(|r| r.id.as_str()).collect()
        }

        #[test]
        fn test_empty_spec_matches_everything() {
            let records = fixture_records();
            let filtered = filter_records(&records, &FilterSpec::default());
            assert_eq!(filtered.len(), records.len());
        }

        #[test]
        fn test_user_match_is_exact_and_case_sensitive() {
            let records = fixture_records();
            let filtered = filter_records(&records, &spec(Some("alice"), None, None, None));
            assert_eq!(ids(&filtered), vec!["65f1a0001", "65f1a0003"]);

            assert!(filter_records(&records, &spec(Some("Alice"), None, None, None)).is_empty());
        }

        #[test]
        fn test_single_day_range_matches_whole_day() {
            let records = fixture_records();
            let filtered =
                filter_records(&records, &spec(None, Some("2024-01-05"), Some("2024-01-05"), None));
            // 02:10 and 23:59 both fall on Jan 5
            assert_eq!(ids(&filtered), vec!["65f1a0002", "65f1a0003"]);
        }

        #[test]
        fn test_open_ended_ranges() {
            let records = fixture_records();

            let from_only: Vec<LogRecord> = filter_records(
                &records.iter().filter(|r| r.id != "65f1a0004").cloned().collect::<Vec<_>>(),
                &spec(None, Some("2024-01-06"), None, None),
            );
            assert_eq!(ids(&from_only), vec!["65f1a0005"]);

            let to_only = filter_records(&records, &spec(None, None, Some("2024-01-04"), None));
            assert_eq!(ids(&to_only), vec!["65f1a0001"]);
        }

        #[test]
        fn test_search_covers_path_user_and_vehicle_id() {
            let records = fixture_records();

            // Path, case-insensitive
            let by_path = filter_records(&records, &spec(None, None, None, Some("IMPORT")));
            assert_eq!(ids(&by_path), vec!["65f1a0001", "65f1a0005"]);

            // User substring
            let by_user = filter_records(&records, &spec(None, None, None, Some("caro")));
            assert_eq!(ids(&by_user), vec!["65f1a0005"]);

            // Vehicle id parameter
            let by_vehicle = filter_records(&records, &spec(None, None, None, Some("vh-2002")));
            assert_eq!(ids(&by_vehicle), vec!["65f1a0002", "65f1a0003"]);

            // No match anywhere excludes the record
            let none = filter_records(&records, &spec(None, None, None, Some("zzz-nothing")));
            assert!(none.is_empty());
        }

        #[test]
        fn test_criteria_combine_with_and() {
            let records = fixture_records();
            let filtered = filter_records(
                &records,
                &spec(Some("alice"), Some("2024-01-05"), Some("2024-01-05"), Some("orders")),
            );
            assert_eq!(ids(&filtered), vec!["65f1a0003"]);
        }

        #[test]
        fn test_filter_is_idempotent() {
            let records = fixture_records();
            let spec = spec(Some("alice"), Some("2024-01-01"), Some("2024-01-31"), None);

            let once = filter_records(&records, &spec);
            let twice = filter_records(&once, &spec);
            assert_eq!(ids(&once), ids(&twice));
        }

        #[test]
        fn test_filter_does_not_mutate_input() {
            let records = fixture_records();
            let before = records.len();
            let _ = filter_records(&records, &spec(Some("alice"), None, None, None));
            assert_eq!(records.len(), before);
        }
    }

    // ========================================================================
    // Query aggregation
    // ========================================================================

    mod query_tests {
        use super::*;

        fn fixture_queries() -> Vec<QueryResult> {
            let value = load_json("query_results_default.json");
            serde_json::from_value::<crate::models::QueryDataset>(value).unwrap().results
        }

        #[test]
        fn test_summary_over_fixture() {
            let results = fixture_queries();
            let summary = queries::summarize(&results).unwrap();

            assert_eq!(summary.total_queries, 4);
            // (42.5 + 18.0 + 95.25 + 7.0) / 4
            assert_eq!(summary.avg_mongo_time, 40.69);
            // (120.0 + 55.5 + 12.0 + 3.5) / 4
            assert_eq!(summary.avg_code_time, 47.75);
            assert_eq!(summary.total_avg_time, 88.44);
            assert_eq!(summary.slowest_mongo, 95.25);
            assert_eq!(summary.slowest_code, 120.0);
            // idx_status, idx_buyer, idx_seller
            assert_eq!(summary.unique_indexes, 3);
        }

        #[test]
        fn test_empty_input_is_a_caller_error() {
            assert!(queries::summarize(&[]).is_none());
        }

        #[test]
        fn test_index_usage_sorted_descending() {
            let usage = queries::index_usage(&fixture_queries());
            assert_eq!(usage[0].index, "idx_status");
            assert_eq!(usage[0].count, 3);
            assert_eq!(usage[1].index, "idx_buyer");
            assert_eq!(usage[1].count, 2);
            for pair in usage.windows(2) {
                assert!(pair[0].count >= pair[1].count);
            }
        }

        #[test]
        fn test_category_split_on_first_separator() {
            let results = fixture_queries();

            let sold = results.iter().find(|r| r.query_name == "buyer_sold_filter").unwrap();
            assert_eq!(sold.category(), Some("buyer"));

            let default = results.iter().find(|r| r.query_name == "default").unwrap();
            assert_eq!(default.category(), None);

            assert_eq!(queries::categories(&results), vec!["buyer", "seller"]);
        }

        #[test]
        fn test_category_filter_uses_prefix() {
            let results = fixture_queries();
            let buyer = queries::filter_category(&results, "buyer");
            assert_eq!(buyer.len(), 2);
            assert!(buyer.iter().all(|r| r.query_name.starts_with("buyer_")));

            // "default" has no category: it appears in the full set only
            assert!(queries::filter_category(&results, "default").is_empty());
        }

        #[test]
        fn test_top_slowest_per_dimension() {
            let results = fixture_queries();

            let mongo = queries::top_slowest(&results, 2, Dimension::Mongo);
            assert_eq!(mongo[0].query_name, "seller_inventory");
            assert_eq!(mongo[1].query_name, "buyer_sold_filter");

            let code = queries::top_slowest(&results, 1, Dimension::Code);
            assert_eq!(code[0].query_name, "buyer_sold_filter");
        }

        #[test]
        fn test_per_query_average_matches_observations() {
            for result in fixture_queries() {
                let mean: f64 = result.execution_times_mongo.iter().sum::<f64>()
                    / result.execution_times_mongo.len() as f64;
                assert!((mean - result.avg_execution_time_mongo).abs() < 1e-9);
            }
        }
    }
}
