//! Integration Tests for Feature Assembly
//!
//! Exercises the assembler end to end against the reference deployment's
//! 36-channel vocabulary.

#[cfg(test)]
mod integration_tests {
    use chrono::{NaiveDate, NaiveDateTime};

    use crate::logic::clock::FixedClock;
    use crate::logic::config::ChannelConfig;
    use crate::logic::features::{
        layout::canonical_feature_names,
        readings::ChannelIssue,
        vector::{assemble_with_fallback, FeatureAssembler, Reconciliation},
        assemble, FeatureSchema, SensorReadings,
    };

    const REF: f64 = 25.0;

    // Block offsets for 36 channels
    const DEV_START: usize = 36;
    const AGG_START: usize = 108;
    const CAL_START: usize = 113;
    const FULL_LEN: usize = 118;

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn channels() -> Vec<String> {
        ChannelConfig::default().channel_keys()
    }

    fn full_schema() -> FeatureSchema {
        FeatureSchema::new(canonical_feature_names(&channels())).unwrap()
    }

    fn schema_of_len(len: usize) -> FeatureSchema {
        FeatureSchema::new((0..len).map(|i| format!("f{}", i)).collect()).unwrap()
    }

    fn wednesday_noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 9, 10).unwrap().and_hms_opt(12, 30, 0).unwrap()
    }

    /// Every channel present, value = 20 + 0.1 * position
    fn complete_readings() -> SensorReadings {
        channels()
            .into_iter()
            .enumerate()
            .map(|(i, key)| (key, 20.0 + i as f64 * 0.1))
            .collect()
    }

    #[test]
    fn test_raw_block_matches_input_order() {
        init_logging();
        let keys = channels();
        let readings = complete_readings();
        let vector = assemble(&readings, &wednesday_noon(), &keys, &full_schema(), REF);

        assert_eq!(vector.len(), FULL_LEN);
        assert_eq!(vector.reconciliation, Reconciliation::Exact);
        assert!(vector.fallback_channels.is_empty());
        for (i, key) in keys.iter().enumerate() {
            assert_eq!(vector.values[i], readings.lookup(key).unwrap());
        }
    }

    #[test]
    fn test_missing_channels_use_fallback() {
        init_logging();
        let keys = channels();
        let readings = SensorReadings::new()
            .with("SNE22-1_VAV1-2-1_Temp", 20.0)
            .with("SNE22-1_VAV1-2-2_Temp", 22.0)
            .with("SNE22-1_VAV1-2-3_Temp", "bad")
            .with("SNE22-1_VAV1-2-4_Temp", 26.0);

        let vector = assemble(&readings, &wednesday_noon(), &keys, &full_schema(), REF);

        assert_eq!(vector.len(), FULL_LEN);
        assert_eq!(&vector.values[..4], &[20.0, 22.0, REF, 26.0]);
        for i in 4..36 {
            assert_eq!(vector.values[i], REF, "channel {} should fall back", keys[i]);
        }

        // Sensor 3 deviation pair is zero, sensor 4 is +1
        assert_eq!(vector.values[DEV_START + 4], 0.0);
        assert_eq!(vector.values[DEV_START + 5], 0.0);
        assert_eq!(vector.values[DEV_START + 6], 1.0);
        assert_eq!(vector.values[DEV_START + 7], 1.0);

        assert_eq!(vector.fallback_channels.len(), 33);
        assert_eq!(vector.fallback_channels[0].key, "SNE22-1_VAV1-2-3_Temp");
        assert_eq!(vector.fallback_channels[0].issue, ChannelIssue::NotNumeric);
        assert_eq!(vector.fallback_channels[1].issue, ChannelIssue::Missing);
    }

    #[test]
    fn test_custom_fallback_value() {
        let keys = channels();
        let vector = assemble_with_fallback(
            &SensorReadings::new(),
            &wednesday_noon(),
            &keys,
            &full_schema(),
            REF,
            20.0,
        );

        assert_eq!(vector.values[0], 20.0);
        assert_eq!(vector.values[DEV_START], -5.0);
        assert_eq!(vector.values[DEV_START + 1], 5.0);
    }

    #[test]
    fn test_idempotent_with_explicit_timestamp() {
        let keys = channels();
        let readings = complete_readings();
        let schema = full_schema();

        let a = assemble(&readings, &wednesday_noon(), &keys, &schema, REF);
        let b = assemble(&readings, &wednesday_noon(), &keys, &schema, REF);

        let bits_a: Vec<u64> = a.values.iter().map(|v| v.to_bits()).collect();
        let bits_b: Vec<u64> = b.values.iter().map(|v| v.to_bits()).collect();
        assert_eq!(bits_a, bits_b);
    }

    #[test]
    fn test_reconciliation_law() {
        init_logging();
        let keys = channels();
        let readings = complete_readings();

        for len in [1, 5, 36, 117, 118, 119, 200] {
            let vector = assemble(&readings, &wednesday_noon(), &keys, &schema_of_len(len), REF);
            assert_eq!(vector.len(), len);

            let expected = match len.cmp(&FULL_LEN) {
                std::cmp::Ordering::Less => Reconciliation::Truncated { dropped: FULL_LEN - len },
                std::cmp::Ordering::Equal => Reconciliation::Exact,
                std::cmp::Ordering::Greater => Reconciliation::Padded { added: len - FULL_LEN },
            };
            assert_eq!(vector.reconciliation, expected);
        }

        let padded = assemble(&readings, &wednesday_noon(), &keys, &schema_of_len(200), REF);
        assert!(padded.values[FULL_LEN..].iter().all(|&v| v == 0.0));
        assert!(padded.is_reconciled());
    }

    #[test]
    fn test_deviation_law() {
        let keys = channels();
        let readings = complete_readings();
        let reference = 23.7;
        let schema = full_schema();
        let vector = assemble(&readings, &wednesday_noon(), &keys, &schema, reference);

        for i in 0..keys.len() {
            let v = vector.values[i];
            let dev = vector.values[DEV_START + 2 * i];
            let abs_dev = vector.values[DEV_START + 2 * i + 1];
            assert_eq!(dev, v - reference);
            assert_eq!(abs_dev, dev.abs());
        }

        let name = format!("{}_AbsDevFromRef", keys[0]);
        assert_eq!(vector.get_by_name(&schema, &name), Some((20.0f64 - reference).abs()));
    }

    #[test]
    fn test_aggregate_law() {
        let keys = channels();
        let vector = assemble(&complete_readings(), &wednesday_noon(), &keys, &full_schema(), REF);

        let max = vector.values[AGG_START + 3];
        let min = vector.values[AGG_START + 2];
        assert_eq!(max - min, vector.values[AGG_START + 4]);
        assert_eq!(min, 20.0);
        assert!(vector.values[AGG_START + 1] > 0.0);
    }

    #[test]
    fn test_non_finite_reading_falls_back() {
        init_logging();
        let keys = channels();
        let readings = SensorReadings::new()
            .with("SNE22-1_VAV1-2-1_Temp", "nan")
            .with("SNE22-1_VAV1-2-2_Temp", 20.0)
            .with("SNE22-1_VAV1-2-3_Temp", 30.0)
            .with("SNE22-1_VAV1-2-4_Temp", "inf");

        let vector = assemble(&readings, &wednesday_noon(), &keys, &full_schema(), REF);

        assert_eq!(&vector.values[..4], &[REF, 20.0, 30.0, REF]);
        assert_eq!(vector.fallback_channels[0].key, "SNE22-1_VAV1-2-1_Temp");
        assert_eq!(vector.fallback_channels[0].issue, ChannelIssue::NotNumeric);
        assert_eq!(vector.fallback_channels[1].key, "SNE22-1_VAV1-2-4_Temp");
        assert_eq!(vector.fallback_channels[1].issue, ChannelIssue::NotNumeric);

        let aggregates = &vector.values[AGG_START..CAL_START];
        assert!(aggregates.iter().all(|v| v.is_finite()));
        assert_eq!(aggregates[2], 20.0);
        assert_eq!(aggregates[3], 30.0);
        assert_eq!(aggregates[4], aggregates[3] - aggregates[2]);
        assert!(vector.values.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_scenario_uniform_reference() {
        let keys = channels();
        let readings = SensorReadings::new()
            .with("SNE22-1_VAV1-2-1_Temp", 25.0)
            .with("SNE22-1_VAV1-2-2_Temp", 25.0)
            .with("SNE22-1_VAV1-2-3_Temp", 25.0)
            .with("SNE22-1_VAV1-2-4_Temp", 25.0);

        let vector = assemble(&readings, &wednesday_noon(), &keys, &full_schema(), 25.0);

        assert!(vector.values[DEV_START..AGG_START].iter().all(|&v| v == 0.0));
        assert_eq!(vector.values[AGG_START], 25.0);
        assert_eq!(vector.values[AGG_START + 1], 0.0);
        assert_eq!(vector.values[AGG_START + 4], 0.0);
    }

    #[test]
    fn test_scenario_empty_readings_short_schema() {
        init_logging();
        let keys = channels();
        let assembler = FeatureAssembler::new(keys, schema_of_len(36), REF, REF);
        let vector = assembler.assemble(&SensorReadings::new(), &wednesday_noon());

        assert_eq!(vector.len(), 36);
        assert!(vector.values.iter().all(|&v| v == 25.0));
        assert_eq!(vector.reconciliation, Reconciliation::Truncated { dropped: 82 });
        assert_eq!(vector.fallback_channels.len(), 36);
    }

    #[test]
    fn test_empty_readings_calendar_from_clock() {
        let assembler = FeatureAssembler::new(channels(), full_schema(), REF, REF);
        let clock = FixedClock(wednesday_noon());
        let vector = assembler.assemble_at(&SensorReadings::new(), None, &clock);

        assert!(vector.values[DEV_START..AGG_START].iter().all(|&v| v == 0.0));
        assert_eq!(&vector.values[CAL_START..], &[12.0, 2.0, 9.0, 0.0, 1.0]);
    }

    #[test]
    fn test_scenario_saturday_morning() {
        let saturday = NaiveDate::from_ymd_opt(2025, 9, 13).unwrap().and_hms_opt(10, 0, 0).unwrap();
        let assembler = FeatureAssembler::new(channels(), full_schema(), REF, REF);
        let clock = FixedClock(wednesday_noon());

        // Explicit timestamp wins over the clock
        let vector = assembler.assemble_at(&complete_readings(), Some(saturday), &clock);

        assert_eq!(vector.values[CAL_START], 10.0);
        assert_eq!(vector.values[CAL_START + 1], 5.0);
        assert_eq!(vector.values[CAL_START + 3], 1.0);
        assert_eq!(vector.values[CAL_START + 4], 1.0);
    }

    #[test]
    fn test_vector_tagged_with_schema_fingerprint() {
        let schema = full_schema();
        let vector = assemble(&complete_readings(), &wednesday_noon(), &channels(), &schema, REF);
        assert_eq!(vector.schema_fingerprint, schema.fingerprint());
    }
}
