//! Property tests for the row-preserving left join.

use eencijfer_common::{LeftJoin, int_values};
use polars::prelude::{Column, DataFrame, NamedFrom};
use proptest::prelude::*;

fn frame(keys: &[i64], name: &str) -> DataFrame {
    let payload: Vec<i64> = keys.iter().map(|k| k * 10).collect();
    DataFrame::new(vec![
        Column::new("key".into(), keys.to_vec()),
        Column::new(name.into(), payload),
    ])
    .expect("frame")
}

proptest! {
    #[test]
    fn join_against_unique_right_keeps_row_count(
        left in prop::collection::vec(0i64..20, 0..40),
        right in prop::collection::btree_set(0i64..20, 0..20),
    ) {
        let right: Vec<i64> = right.into_iter().collect();
        let joined = LeftJoin::on("prop", &["key"])
            .execute(&frame(&left, "value"), &frame(&right, "payload"))
            .expect("join");
        prop_assert_eq!(joined.height(), left.len());

        let payload = int_values(&joined, "payload").expect("payload");
        for (key, value) in left.iter().zip(payload) {
            if right.contains(key) {
                prop_assert_eq!(value, Some(key * 10));
            } else {
                prop_assert_eq!(value, None);
            }
        }
    }
}
