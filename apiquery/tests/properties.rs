//! Evaluation laws over generated filter trees.

use apiquery::prelude::*;
use proptest::collection::vec;
use proptest::prelude::*;

#[derive(Debug, Clone, Serialize, Deserialize, Filterable)]
#[serde(rename_all = "camelCase")]
struct Item {
    name: String,
    qty: i64,
    in_stock: bool,
    parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Filterable)]
struct Part {
    code: String,
}

fn part() -> impl Strategy<Value = Part> {
    "[a-c]{0,2}".prop_map(|code| Part { code })
}

fn item() -> impl Strategy<Value = Item> {
    ("[a-c]{0,3}", -5i64..5, any::<bool>(), vec(part(), 0..3)).prop_map(
        |(name, qty, in_stock, parts)| Item {
            name,
            qty,
            in_stock,
            parts,
        },
    )
}

fn string_filter() -> impl Strategy<Value = StringFilter> {
    prop_oneof![
        Just(StringFilter::default()),
        "[a-c]{0,2}".prop_map(|s| StringFilter::default().equals(s)),
        "[a-c]{0,2}".prop_map(|s| StringFilter::default().starts_with(s)),
        "[a-c]{0,2}".prop_map(|s| StringFilter::default().not_contains(s)),
        vec("[a-c]{0,2}", 0..3).prop_map(|values| StringFilter::default().is_in(values)),
    ]
}

fn numeric_filter() -> impl Strategy<Value = NumericFilter<i64>> {
    prop_oneof![
        Just(NumericFilter::default()),
        (-5i64..5).prop_map(|v| NumericFilter::default().gt(v)),
        (-5i64..5).prop_map(|v| NumericFilter::default().lte(v)),
        (-5i64..5).prop_map(|v| NumericFilter::default().not_lt(v)),
        (-5i64..5, -5i64..5).prop_map(|(a, b)| NumericFilter::default().gte(a).not_equals(b)),
    ]
}

fn parts_filter() -> impl Strategy<Value = CollectionFilter<PartFilter>> {
    let part_filter = string_filter()
        .prop_map(|code| PartFilter::default().with_code(code))
        .boxed();
    prop_oneof![
        part_filter.clone().prop_map(CollectionFilter::all),
        part_filter.clone().prop_map(CollectionFilter::some),
        part_filter.prop_map(CollectionFilter::none),
        any::<bool>().prop_map(CollectionFilter::any),
    ]
}

fn leaf_filter() -> impl Strategy<Value = ItemFilter> {
    (
        proptest::option::of(string_filter()),
        proptest::option::of(numeric_filter()),
        proptest::option::of(any::<bool>()),
        proptest::option::of(parts_filter()),
    )
        .prop_map(|(name, qty, in_stock, parts)| ItemFilter {
            name,
            qty,
            in_stock: in_stock.map(|flag| BooleanFilter::default().equals(flag)),
            parts,
            ..Default::default()
        })
}

fn item_filter() -> impl Strategy<Value = ItemFilter> {
    leaf_filter().prop_recursive(3, 24, 3, |inner| {
        (inner.clone(), vec(inner.clone(), 0..3), vec(inner, 0..3)).prop_map(
            |(mut base, and, or)| {
                base.and = and;
                base.or = or;
                base
            },
        )
    })
}

proptest! {
    #[test]
    fn evaluation_is_deterministic(filter in item_filter(), subject in item()) {
        let first = filter.evaluate(&subject);
        prop_assert_eq!(first, filter.evaluate(&subject));
        prop_assert_eq!(first, filter.clone().evaluate(&subject));
    }

    #[test]
    fn single_and_member_is_transparent(filter in item_filter(), subject in item()) {
        let wrapped = ItemFilter::default().and(filter.clone());
        prop_assert_eq!(wrapped.evaluate(&subject), filter.evaluate(&subject));
    }

    #[test]
    fn single_or_member_is_transparent(filter in item_filter(), subject in item()) {
        let wrapped = ItemFilter::default().or(filter.clone());
        prop_assert_eq!(wrapped.evaluate(&subject), filter.evaluate(&subject));
    }

    #[test]
    fn and_group_is_conjunction(
        left in item_filter(),
        right in item_filter(),
        subject in item(),
    ) {
        let both = ItemFilter::default().and(left.clone()).and(right.clone());
        prop_assert_eq!(
            both.evaluate(&subject),
            left.evaluate(&subject) && right.evaluate(&subject)
        );
    }

    #[test]
    fn or_group_is_disjunction(
        left in item_filter(),
        right in item_filter(),
        subject in item(),
    ) {
        let either = ItemFilter::default().or(left.clone()).or(right.clone());
        prop_assert_eq!(
            either.evaluate(&subject),
            left.evaluate(&subject) || right.evaluate(&subject)
        );
    }

    #[test]
    fn wire_form_keeps_meaning(filter in item_filter(), subject in item()) {
        let wire = serde_json::to_string(&filter).unwrap();
        let decoded: ItemFilter = serde_json::from_str(&wire).unwrap();
        prop_assert_eq!(decoded.evaluate(&subject), filter.evaluate(&subject));
    }

    #[test]
    fn empty_filters_match_everything(subject in item()) {
        prop_assert!(ItemFilter::default().evaluate(&subject));
        let with_empty_nodes = ItemFilter::default()
            .with_name(StringFilter::default())
            .with_qty(NumericFilter::default());
        prop_assert!(with_empty_nodes.is_empty());
        prop_assert!(with_empty_nodes.evaluate(&subject));
    }
}
