use dmr_schema::Device;

/// United States DMR ids start with the MCC-derived prefix `31`.
const US_ID_PREFIX: &str = "31";

pub fn filter_us(devices: Vec<Device>) -> Vec<Device> {
    devices
        .into_iter()
        .filter(|d| d.id.to_string().starts_with(US_ID_PREFIX))
        .collect()
}

/// Keeps devices whose city mentions at least one of `terms`, case-insensitively.
///
/// Devices without a city never match. Terms are expected lowercased and non-empty,
/// see [`parse_location_terms`].
pub fn filter_by_location(devices: Vec<Device>, terms: &[String]) -> Vec<Device> {
    devices
        .into_iter()
        .filter(|d| {
            let Some(city) = d.city.as_deref().filter(|c| !c.is_empty()) else {
                return false;
            };
            let city = city.to_lowercase();
            terms.iter().any(|t| city.contains(t.as_str()))
        })
        .collect()
}

/// Splits a comma-separated query into lowercased, trimmed, non-empty terms.
pub fn parse_location_terms(query: &str) -> Vec<String> {
    query
        .split(',')
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(id: i64, city: Option<&str>) -> Device {
        Device {
            city: city.map(str::to_string),
            ..Device::with_id(id)
        }
    }

    fn ids(devices: &[Device]) -> Vec<i64> {
        devices.iter().map(|d| d.id).collect()
    }

    #[test]
    fn us_filter_matches_id_prefix_only() {
        let devices = vec![
            device(310_123, None),
            device(3_117_001, None),
            device(2_341_234, None),
            device(131, None),
        ];

        assert_eq!(ids(&filter_us(devices)), vec![310_123, 3_117_001]);
    }

    #[test]
    fn location_filter_is_case_insensitive_and_skips_missing_city() {
        let devices = vec![
            device(1, Some("Springfield, IL")),
            device(2, Some("Chicago, IL")),
            device(3, None),
            device(4, Some("")),
            device(5, Some("Peoria")),
        ];
        let terms = parse_location_terms("SPRINGFIELD, peoria");

        assert_eq!(ids(&filter_by_location(devices, &terms)), vec![1, 5]);
    }

    #[test]
    fn empty_terms_match_nothing() {
        let devices = vec![device(1, Some("Springfield, IL"))];
        let terms = parse_location_terms(" , ,");

        assert!(terms.is_empty());
        assert!(filter_by_location(devices, &terms).is_empty());
    }
}
