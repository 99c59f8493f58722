use chrono::{DateTime, Utc};

/// Get the current Unix timestamp in milliseconds (UTC).
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Render a millisecond Unix timestamp as an RFC 3339 string (UTC).
pub fn millis_to_rfc3339(millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .unwrap_or_else(|| DateTime::<Utc>::from_timestamp_millis(0).unwrap_or_default())
        .to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_millis_to_rfc3339() {
        // given:
        let millis = 1_672_498_800_000;

        // when:
        let rendered = millis_to_rfc3339(millis);

        // then:
        assert_eq!(rendered, "2022-12-31T15:00:00+00:00");
    }
}
