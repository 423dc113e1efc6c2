use chrono::{DateTime, Utc};

use super::types::OrbitalElementRecord;

/// Parse a flat sequence of name / line 1 / line 2 groups.
///
/// Groups whose element lines do not carry the `1 ` and `2 ` markers are
/// skipped, as is any trailing partial group.
pub fn parse_elements(content: &str, fetched_at: DateTime<Utc>) -> Vec<OrbitalElementRecord> {
    let lines: Vec<&str> = content
        .lines()
        .map(|l| l.trim_end())
        .filter(|l| !l.trim().is_empty())
        .collect();

    let mut records = Vec::with_capacity(lines.len() / 3);
    for group in lines.chunks_exact(3) {
        let (name, line1, line2) = (group[0].trim(), group[1].trim(), group[2].trim());

        if !line1.starts_with("1 ") || !line2.starts_with("2 ") {
            log::debug!("Skipping malformed element group for {:?}", name);
            continue;
        }

        records.push(OrbitalElementRecord {
            name: name.to_string(),
            line1: line1.to_string(),
            line2: line2.to_string(),
            norad_id: catalog_number(line1),
            fetched_at,
        });
    }

    records
}

/// Catalog number, columns 3-7 of line 1.
fn catalog_number(line1: &str) -> Option<u32> {
    line1.get(2..7).and_then(|s| s.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ISS: &str = "ISS (ZARYA)
1 25544U 98067A   20194.88612269 -.00002218  00000-0 -31515-4 0  9992
2 25544  51.6461 221.2784 0001413  89.1723 280.4612 15.49507896236008
";

    #[test]
    fn parses_one_record_per_group() {
        let content = format!(
            "{ISS}NOAA 19\n\
             1 33591U 09005A   24001.50000000  .00000100  00000-0  70000-4 0  9990\n\
             2 33591  99.1000  10.0000 0014000 100.0000 260.0000 14.12500000    01\n"
        );
        let records = parse_elements(&content, Utc::now());

        assert_eq!(records.len(), content.lines().count() / 3);
        assert_eq!(records[0].name, "ISS (ZARYA)");
        assert_eq!(records[0].norad_id, Some(25544));
        assert_eq!(records[1].name, "NOAA 19");
        assert_eq!(records[1].norad_id, Some(33591));
    }

    #[test]
    fn ignores_trailing_partial_group() {
        let content = format!("{ISS}STARLINK-1007\n1 44713U 19074A   24001.0");
        let records = parse_elements(&content, Utc::now());
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn skips_group_with_wrong_markers() {
        let content = format!("BROKEN\n3 00000\n4 00000\n{ISS}");
        let records = parse_elements(&content, Utc::now());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "ISS (ZARYA)");
    }

    #[test]
    fn unparsable_catalog_number_is_absent() {
        let content = "ODD\n1 ABCDEU 98067A\n2 ABCDE  51.6461\n";
        let records = parse_elements(content, Utc::now());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].norad_id, None);
    }

    #[test]
    fn handles_crlf_and_padded_names() {
        let content = ISS.replace('\n', "\r\n").replace("ISS (ZARYA)", "ISS (ZARYA)      ");
        let records = parse_elements(&content, Utc::now());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "ISS (ZARYA)");
        assert!(records[0].line2.ends_with("236008"));
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(parse_elements("", Utc::now()).is_empty());
    }
}
