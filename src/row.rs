//! Maps a lead submission onto the fixed spreadsheet column layout.

use crate::models::LeadSubmission;
use serde_json::Value;

/// Number of columns in the target sheet. The order below must match the
/// sheet's header row exactly.
pub const COLUMN_COUNT: usize = 22;

/// Spreadsheet header layout, in column order.
pub const COLUMNS: [&str; COLUMN_COUNT] = [
    "name",
    "partName",
    "lookupType",
    "vin",
    "make",
    "model",
    "year",
    "bodyClass",
    "vehicleType",
    "manufacturer",
    "fuelType",
    "engineCylinders",
    "displacement",
    "engine",
    "transmission",
    "driveType",
    "accidents",
    "ownership",
    "odometer",
    "serviceRecords",
    "recalls",
    "mobileNumber",
];

/// Builds the row cells for a lead submission.
///
/// Total over any `vehicle_data` shape: fields that are absent or not
/// representable as a cell render as the empty string, numbers are
/// stringified. Where a field exists on both the decoded-vehicle record and
/// the plate record (vin/make/model/year), the decoded record wins.
pub fn format_row(lead: &LeadSubmission) -> Vec<String> {
    let data = &lead.vehicle_data;

    // The decoded record may sit under "vehicle", under "vehicleInfo", or be
    // the payload itself.
    let vehicle = [data.get("vehicle"), data.get("vehicleInfo")]
        .into_iter()
        .flatten()
        .find(|v| v.is_object())
        .or_else(|| if data.is_object() { Some(data) } else { None });
    let plate = data.get("plate").filter(|v| v.is_object());
    let history = data.get("history").filter(|v| v.is_object());

    let prefer = |key: &str| -> String {
        field(vehicle, key)
            .or_else(|| field(plate, key))
            .unwrap_or_default()
    };
    let vehicle_only = |key: &str| field(vehicle, key).unwrap_or_default();
    let history_at = |path: [&str; 2]| {
        history
            .and_then(|h| h.get(path[0]))
            .and_then(|v| v.get(path[1]))
            .and_then(cell)
            .unwrap_or_default()
    };

    vec![
        lead.name.clone().unwrap_or_default(),
        lead.part_name.clone().unwrap_or_default(),
        lead.lookup_type.clone().unwrap_or_default(),
        prefer("vin"),
        prefer("make"),
        prefer("model"),
        prefer("year"),
        vehicle_only("bodyClass"),
        vehicle_only("vehicleType"),
        vehicle_only("manufacturer"),
        vehicle_only("fuelType"),
        vehicle_only("engineCylinders"),
        vehicle_only("displacement"),
        vehicle_only("engine"),
        vehicle_only("transmission"),
        vehicle_only("driveType"),
        history_at(["accidents", "reported"]),
        history_at(["ownershipHistory", "owners"]),
        history_at(["odometer", "lastReading"]),
        history_at(["serviceRecords", "count"]),
        history_at(["recalls", "open"]),
        lead.mobile_number.clone().unwrap_or_default(),
    ]
}

fn field(record: Option<&Value>, key: &str) -> Option<String> {
    record.and_then(|r| r.get(key)).and_then(cell)
}

/// Renders a scalar JSON value as a cell. Objects, arrays, and null have no
/// cell representation and fall back to the empty string upstream.
fn cell(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn lead(vehicle_data: serde_json::Value) -> LeadSubmission {
        LeadSubmission {
            vehicle_data,
            name: Some("Jane Doe".to_string()),
            mobile_number: Some("555-0100".to_string()),
            email: None,
            part_name: Some("Brake Pads".to_string()),
            lookup_type: Some("vin".to_string()),
        }
    }

    #[test]
    fn row_has_fixed_width_and_order() {
        let row = format_row(&lead(json!({
            "vehicle": {"vin": "1HGCM82633A004352", "make": "Honda", "model": "Civic", "year": "2020"}
        })));

        assert_eq!(row.len(), COLUMN_COUNT);
        assert_eq!(row[0], "Jane Doe");
        assert_eq!(row[1], "Brake Pads");
        assert_eq!(row[2], "vin");
        assert_eq!(row[3], "1HGCM82633A004352");
        assert_eq!(row[4], "Honda");
        assert_eq!(row[5], "Civic");
        assert_eq!(row[6], "2020");
        assert_eq!(row[21], "555-0100");
    }

    #[test]
    fn decoded_vehicle_wins_over_plate() {
        let row = format_row(&lead(json!({
            "vehicle": {"make": "Honda", "model": "Civic"},
            "plate": {"make": "Toyota", "model": "Corolla", "year": "2018", "vin": "PLATEVIN"}
        })));

        assert_eq!(row[3], "PLATEVIN"); // only the plate record has it
        assert_eq!(row[4], "Honda");
        assert_eq!(row[5], "Civic");
        assert_eq!(row[6], "2018"); // plate fallback
    }

    #[test]
    fn vehicle_info_record_is_accepted() {
        let row = format_row(&lead(json!({
            "vehicleInfo": {"make": "Ford", "model": "F-150"}
        })));
        assert_eq!(row[4], "Ford");
        assert_eq!(row[5], "F-150");
    }

    #[test]
    fn bare_vehicle_payload_is_accepted() {
        // Some lookups put the vehicle fields at the top level of vehicleData.
        let row = format_row(&lead(json!({"make": "Mazda", "year": 2019})));
        assert_eq!(row[4], "Mazda");
        assert_eq!(row[6], "2019");
    }

    #[test]
    fn history_counts_are_stringified() {
        let row = format_row(&lead(json!({
            "vehicle": {"make": "Honda"},
            "history": {
                "accidents": {"reported": 1},
                "ownershipHistory": {"owners": 2},
                "odometer": {"lastReading": 30000},
                "serviceRecords": {"count": 2},
                "recalls": {"open": 0}
            }
        })));

        assert_eq!(row[16], "1");
        assert_eq!(row[17], "2");
        assert_eq!(row[18], "30000");
        assert_eq!(row[19], "2");
        assert_eq!(row[20], "0");
    }

    #[test]
    fn missing_fields_render_as_empty_string() {
        let row = format_row(&LeadSubmission {
            vehicle_data: json!({}),
            name: None,
            mobile_number: None,
            email: None,
            part_name: None,
            lookup_type: None,
        });

        assert_eq!(row.len(), COLUMN_COUNT);
        assert!(row.iter().all(|cell| cell.is_empty()));
    }

    #[test]
    fn non_object_vehicle_data_yields_empty_vehicle_cells() {
        for data in [json!(null), json!("junk"), json!(42), json!([1, 2, 3])] {
            let row = format_row(&lead(data));
            assert_eq!(row.len(), COLUMN_COUNT);
            assert_eq!(row[4], "");
            assert_eq!(row[21], "555-0100");
        }
    }
}
