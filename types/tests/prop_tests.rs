use proptest::prelude::*;

use rewards_types::{format_units, parse_ether, parse_units, Timestamp, DECIMALS, UNIT};

proptest! {
    /// Timestamp ordering: new(a) <= new(b) iff a <= b.
    #[test]
    fn timestamp_ordering(a in 0u64..u64::MAX, b in 0u64..u64::MAX) {
        let ta = Timestamp::new(a);
        let tb = Timestamp::new(b);
        prop_assert_eq!(ta <= tb, a <= b);
        prop_assert_eq!(ta.min(tb).as_secs(), a.min(b));
    }

    /// Timestamp elapsed_since: elapsed_since(now) = now - self (saturating).
    #[test]
    fn timestamp_elapsed_since(base in 0u64..1_000_000, offset in 0u64..1_000_000) {
        let t = Timestamp::new(base);
        let now = Timestamp::new(base + offset);
        prop_assert_eq!(t.elapsed_since(now), offset);
        prop_assert_eq!(now.elapsed_since(t), 0);
    }

    /// has_expired agrees with checked_add_secs.
    #[test]
    fn timestamp_has_expired_matches_end(
        start in 0u64..500_000,
        duration in 1u64..500_000,
        offset in 0u64..1_000_000,
    ) {
        let t = Timestamp::new(start);
        let end = t.checked_add_secs(duration).unwrap();
        let now = Timestamp::new(start + offset);
        prop_assert_eq!(t.has_expired(duration, now), now >= end);
    }

    /// Formatting then parsing gives back the raw amount.
    #[test]
    fn format_then_parse_is_identity(raw in 0u128..u128::MAX / 2) {
        let rendered = format_units(raw, DECIMALS);
        prop_assert_eq!(parse_units(&rendered, DECIMALS).unwrap(), raw);
    }

    /// Whole-token strings scale by UNIT.
    #[test]
    fn whole_tokens_scale_by_unit(units in 0u128..1_000_000_000_000) {
        prop_assert_eq!(parse_ether(&units.to_string()).unwrap(), units * UNIT);
    }
}
