use path_mapper::{map, MappingError, MatchError, PathRecord};
use proptest::collection::vec;
use proptest::prelude::*;

#[derive(PathRecord, Debug, Clone, Default, PartialEq)]
struct Target {
    number: i64,
    owner: Option<String>,
    name: String,
}

fn seeded() -> Target {
    Target {
        number: 7,
        owner: Some("seed".to_string()),
        name: "seed".to_string(),
    }
}

fn literal() -> impl Strategy<Value = String> {
    "[ab]{0,2}"
}

fn any_segment() -> impl Strategy<Value = String> {
    prop_oneof!["[a-z]{0,3}", "\\{[a-z]{0,3}\\}"]
}

proptest! {
    #[test]
    fn literal_patterns_match_exactly(
        pairs in vec((literal(), literal()), 1..6)
    ) {
        let pattern = pairs.iter().map(|(p, _)| p.as_str()).collect::<Vec<_>>().join("/");
        let path = pairs.iter().map(|(_, v)| v.as_str()).collect::<Vec<_>>().join("/");
        let all_equal = pairs.iter().all(|(p, v)| p == v);

        let mut target = seeded();
        let result = map(&pattern, &path, &mut target);

        if all_equal {
            prop_assert!(result.is_ok());
        } else {
            let is_segment_mismatch = matches!(
                result,
                Err(MappingError::Match(MatchError::SegmentMismatch { .. }))
            );
            prop_assert!(is_segment_mismatch);
        }
        prop_assert_eq!(target, seeded());
    }

    #[test]
    fn differing_lengths_always_fail(
        pattern in vec(any_segment(), 1..6),
        path in vec(any_segment(), 1..6),
    ) {
        prop_assume!(pattern.len() != path.len());

        let mut target = seeded();
        let result = map(&pattern.join("/"), &path.join("/"), &mut target);
        let is_length_mismatch = matches!(
            result,
            Err(MappingError::Match(MatchError::LengthMismatch { .. }))
        );
        prop_assert!(is_length_mismatch);
        prop_assert_eq!(target, seeded());
    }

    #[test]
    fn numbers_round_trip(number in any::<i64>()) {
        let mut target = Target::default();
        map("/{number}", &format!("/{}", number), &mut target).unwrap();
        prop_assert_eq!(target.number, number);
    }

    #[test]
    fn strings_bind_verbatim(owner in "[^/]{0,12}", name in "[^/]{0,12}") {
        let mut target = Target::default();
        map("/{owner}/{name}", &format!("/{}/{}", owner, name), &mut target).unwrap();
        prop_assert_eq!(target.owner.as_deref(), Some(owner.as_str()));
        prop_assert_eq!(target.name, name);
    }
}
