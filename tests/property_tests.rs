/// Property-based tests using proptest
/// Tests invariants that must hold for every lead submission shape: the row
/// formatter is total and always emits the fixed column count.
use lead_sheets_api::models::LeadSubmission;
use lead_sheets_api::row::{format_row, COLUMN_COUNT};
use proptest::prelude::*;
use serde_json::{json, Value};

/// Arbitrary JSON values, nested a few levels deep - covers every shape a
/// client could put under `vehicleData`.
fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        "[a-zA-Z0-9 .-]{0,16}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::hash_map("[a-zA-Z]{1,12}", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

fn submission(
    vehicle_data: Value,
    name: Option<String>,
    mobile_number: Option<String>,
) -> LeadSubmission {
    LeadSubmission {
        vehicle_data,
        name,
        mobile_number,
        email: None,
        part_name: None,
        lookup_type: None,
    }
}

proptest! {
    // Property: the formatter never panics and always emits the fixed width,
    // whatever vehicleData carries and however many contact fields are absent.
    #[test]
    fn formatter_is_total_and_fixed_width(
        vehicle_data in arb_json(),
        name in proptest::option::of("[a-zA-Z ]{0,20}"),
        mobile in proptest::option::of("[0-9 ()+-]{0,15}"),
    ) {
        let row = format_row(&submission(vehicle_data, name, mobile.clone()));
        prop_assert_eq!(row.len(), COLUMN_COUNT);
        // The phone cell mirrors the input, empty when absent
        prop_assert_eq!(&row[COLUMN_COUNT - 1], &mobile.unwrap_or_default());
    }

    // Property: no cell ever renders a JSON array/object - absent or
    // unrepresentable values become the empty string, uniformly.
    #[test]
    fn cells_never_leak_structural_json(vehicle_data in arb_json()) {
        let row = format_row(&submission(vehicle_data, None, None));
        for cell in &row {
            prop_assert!(!cell.starts_with('{'), "cell must not start with a brace");
            prop_assert!(!cell.starts_with('['));
        }
    }

    // Property: the decoded-vehicle record always wins over the plate record
    // for the shared fields.
    #[test]
    fn decoded_vehicle_preferred_over_plate(
        decoded_make in "[A-Za-z]{1,10}",
        plate_make in "[A-Za-z]{1,10}",
        decoded_year in 1980i64..2030,
        plate_year in 1980i64..2030,
    ) {
        let row = format_row(&submission(
            json!({
                "vehicle": {"make": decoded_make, "year": decoded_year},
                "plate": {"make": plate_make, "year": plate_year},
            }),
            None,
            Some("555-0100".to_string()),
        ));
        prop_assert_eq!(&row[4], &decoded_make);
        prop_assert_eq!(&row[6], &decoded_year.to_string());
    }

    // Property: plate fields fill in only when the decoded record lacks them.
    #[test]
    fn plate_fills_gaps_left_by_decoded_record(vin in "[A-HJ-NPR-Z0-9]{11,17}") {
        let row = format_row(&submission(
            json!({
                "vehicle": {"make": "Honda"},
                "plate": {"vin": vin},
            }),
            None,
            None,
        ));
        prop_assert_eq!(&row[3], &vin);
        prop_assert_eq!(&row[4], "Honda");
    }

    // Property: numeric history fields are stringified verbatim.
    #[test]
    fn history_counts_stringify(reported in 0i64..1000, odometer in 0i64..1_000_000) {
        let row = format_row(&submission(
            json!({
                "vehicle": {},
                "history": {
                    "accidents": {"reported": reported},
                    "odometer": {"lastReading": odometer},
                },
            }),
            None,
            None,
        ));
        prop_assert_eq!(&row[16], &reported.to_string());
        prop_assert_eq!(&row[18], &odometer.to_string());
    }
}
